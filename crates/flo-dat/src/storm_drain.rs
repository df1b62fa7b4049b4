//! Storm drain files: SWMMFLO.DAT, SWMMFLORT.DAT, SWMMOUTF.DAT and SWMM.INP.

use std::path::Path;

use flo_core::CodecError;
use flo_model::{
    Inlet, InletData, Outfall, OutfallData, RatingTableData, SdCulvert, SdRatingBlock,
    SdRatingTable, SwmmInp,
};

use crate::{DatResult, DatWriter, Line, Row, RowStream};

pub fn parse_swmmflo(rows: &mut RowStream) -> DatResult<InletData> {
    let mut data = InletData::default();
    while let Some(row) = rows.next_row()? {
        row.require(9)?;
        data.inlets.push(Inlet {
            tag: row.tag().to_string(),
            grid: row.int(1)?,
            name: row.text(2)?.to_string(),
            intype: row.int(3)?,
            length: row.real(4)?,
            width: row.real(5)?,
            height: row.real(6)?,
            coeff: row.real(7)?,
            feature: row.int(8)?,
            curbheight: row.opt_real(9)?.unwrap_or(0.0),
        });
    }
    Ok(data)
}

pub fn emit_swmmflo(data: &InletData) -> DatWriter {
    let mut w = DatWriter::new("SWMMFLO.DAT");
    for i in &data.inlets {
        w.push(
            Line::tag(&i.tag)
                .int(i.grid)
                .text(&i.name)
                .int(i.intype)
                .reals(&[i.length, i.width, i.height, i.coeff])
                .int(i.feature)
                .real(i.curbheight),
        );
    }
    w
}

/// A rating block under construction.
struct OpenBlock {
    header: Row,
    grid: i64,
    name: String,
    cdiameter: f64,
    rows: Vec<[f64; 2]>,
    culvert: Option<SdCulvert>,
}

impl OpenBlock {
    fn close(self, warnings: &mut Vec<String>) -> SdRatingBlock {
        if let Some(culvert) = self.culvert {
            return SdRatingBlock::Culvert(culvert);
        }
        if self.rows.is_empty() {
            warnings.push(format!(
                "SWMMFLORT.DAT line {}: rating table for {} has no rows",
                self.header.line, self.name
            ));
        }
        SdRatingBlock::Table(SdRatingTable {
            grid: self.grid,
            name: self.name,
            rows: self.rows,
        })
    }
}

/// Both `D` and `S` headers are accepted; the block body decides whether it
/// is a rating table or a culvert.
pub fn parse_swmmflort(
    rows: &mut RowStream,
    warnings: &mut Vec<String>,
) -> DatResult<RatingTableData> {
    let mut data = RatingTableData::default();
    let mut open: Option<OpenBlock> = None;
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "D" | "S" => {
                if let Some(block) = open.take() {
                    data.blocks.push(block.close(warnings));
                }
                open = Some(OpenBlock {
                    grid: row.int(1)?,
                    name: row.tokens.get(2).cloned().unwrap_or_default(),
                    cdiameter: row.opt_real(3)?.unwrap_or(0.0),
                    rows: Vec::new(),
                    culvert: None,
                    header: row,
                });
            }
            "F" => {
                let block = open.as_mut().ok_or_else(|| row.unknown_tag())?;
                block.culvert = Some(SdCulvert {
                    grid: block.grid,
                    name: block.name.clone(),
                    cdiameter: block.cdiameter,
                    typec: row.int(1)?,
                    typeen: row.int(2)?,
                    cubase: row.real(3)?,
                    multbarrels: row.int(4)?,
                });
            }
            tag => {
                let block = open.as_mut().ok_or_else(|| row.unknown_tag())?;
                let start = if tag == "N" { 1 } else { 0 };
                if start == 0 && !row.is_numeric_at(0) {
                    return Err(row.unknown_tag().into());
                }
                block.rows.push([row.real(start)?, row.real(start + 1)?]);
            }
        }
    }
    if let Some(block) = open.take() {
        data.blocks.push(block.close(warnings));
    }
    Ok(data)
}

pub fn emit_swmmflort(data: &RatingTableData) -> DatWriter {
    let mut w = DatWriter::new("SWMMFLORT.DAT");
    for block in &data.blocks {
        match block {
            SdRatingBlock::Table(t) => {
                w.push(Line::tag("D").int(t.grid).text(&t.name));
                for r in &t.rows {
                    w.push(Line::tag("N").reals(r));
                }
            }
            SdRatingBlock::Culvert(c) => {
                w.push(Line::tag("S").int(c.grid).text(&c.name).real(c.cdiameter));
                w.push(
                    Line::tag("F")
                        .int(c.typec)
                        .int(c.typeen)
                        .real(c.cubase)
                        .int(c.multbarrels),
                );
            }
        }
    }
    w
}

pub fn parse_swmmoutf(rows: &mut RowStream) -> DatResult<OutfallData> {
    let mut data = OutfallData::default();
    while let Some(row) = rows.next_row()? {
        data.outfalls.push(Outfall {
            name: row.text(0)?.to_string(),
            grid: row.int(1)?,
            outf_flo: row.int(2)?,
        });
    }
    Ok(data)
}

pub fn emit_swmmoutf(data: &OutfallData) -> DatWriter {
    let mut w = DatWriter::new("SWMMOUTF.DAT");
    for o in &data.outfalls {
        w.push(Line::new().text(&o.name).int(o.grid).int(o.outf_flo));
    }
    w
}

/// SWMM.INP is kept as raw sections; its lines are not tokenised.
pub fn read_swmm_inp(path: &Path) -> DatResult<SwmmInp> {
    let text = std::fs::read_to_string(path).map_err(|e| CodecError::io(path, e))?;
    Ok(SwmmInp::from_text(&text))
}

pub fn emit_swmm_inp(inp: &SwmmInp) -> DatWriter {
    let mut w = DatWriter::new("SWMM.INP");
    for line in inp.to_text().lines() {
        w.push_raw(line);
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inlets_round_trip() {
        let text = "D 120 I1 1 5 0.5 0.3 3 0 0.15\nD 121 I2 4 0 0 0 0 1 0\n";
        let data = parse_swmmflo(&mut RowStream::from_text("SWMMFLO.DAT", text)).unwrap();
        assert_eq!(data.inlets[1].intype, 4);
        assert_eq!(emit_swmmflo(&data).text(), text);
    }

    #[test]
    fn rating_tables_and_culverts_share_a_file() {
        let text = "D 121 I2\nN 0 0\nN 1 2.5\nS 130 I3 0.9\nF 1 2 0.5 1\n";
        let mut warnings = Vec::new();
        let data = parse_swmmflort(&mut RowStream::from_text("SWMMFLORT.DAT", text), &mut warnings)
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(data.blocks.len(), 2);
        assert!(matches!(&data.blocks[1], SdRatingBlock::Culvert(c) if c.cdiameter == 0.9));
        assert_eq!(emit_swmmflort(&data).text(), text);
    }

    #[test]
    fn untagged_rows_and_empty_blocks_are_accepted() {
        let text = "S 121 I2\n0 0\n1 2\nD 122 I4\n";
        let mut warnings = Vec::new();
        let data = parse_swmmflort(&mut RowStream::from_text("SWMMFLORT.DAT", text), &mut warnings)
            .unwrap();
        assert_eq!(warnings.len(), 1);
        match &data.blocks[0] {
            SdRatingBlock::Table(t) => assert_eq!(t.rows, vec![[0.0, 0.0], [1.0, 2.0]]),
            other => panic!("expected table, got {other:?}"),
        }
        assert_eq!(data.blocks[1].name(), "I4");
    }

    #[test]
    fn outfalls_round_trip() {
        let text = "O1 200 1\nO2 201 0\n";
        let data = parse_swmmoutf(&mut RowStream::from_text("SWMMOUTF.DAT", text)).unwrap();
        assert_eq!(data.outfalls[0].grid, 200);
        assert_eq!(emit_swmmoutf(&data).text(), text);
    }
}
