//! Floodplain cross sections, gutters, water surface files and the
//! `grid value...` cell arrays.

use flo_model::{
    CellArrayData, CellArrayKind, CellValue, CellValues, FpXsec, FpXsecData, GutterCell, GutterData,
    GutterGlobal, WstimeCell, WstimeData, WsurfData,
};

use crate::{DatResult, DatWriter, Line, RowStream};

pub fn parse_fpxsec(rows: &mut RowStream, warnings: &mut Vec<String>) -> DatResult<FpXsecData> {
    let mut data = FpXsecData::default();
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "P" => data.nxprt = row.int(1)?,
            "X" => {
                let iflo = row.int(1)?;
                let declared = row.int(2)?;
                let cells = (3..row.len())
                    .map(|i| row.int(i))
                    .collect::<Result<Vec<_>, _>>()?;
                if declared != cells.len() as i64 {
                    warnings.push(format!(
                        "FPXSEC.DAT line {}: declares {} cells but lists {}",
                        row.line,
                        declared,
                        cells.len()
                    ));
                }
                data.sections.push(FpXsec {
                    iflo,
                    nnxsec: declared,
                    cells,
                });
            }
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

pub fn emit_fpxsec(data: &FpXsecData) -> DatWriter {
    let mut w = DatWriter::new("FPXSEC.DAT");
    w.push(Line::tag("P").int(data.nxprt));
    for s in &data.sections {
        let mut line = Line::tag("X").int(s.iflo).int(s.nnxsec);
        for g in &s.cells {
            line = line.int(*g);
        }
        w.push(line);
    }
    w
}

pub fn parse_gutter(rows: &mut RowStream) -> DatResult<GutterData> {
    let mut data = GutterData::default();
    let mut first = true;
    while let Some(row) = rows.next_row()? {
        if first && row.len() == 3 {
            data.global = Some(GutterGlobal {
                width: row.real(0)?,
                height: row.real(1)?,
                n_value: row.real(2)?,
            });
        } else {
            data.cells.push(GutterCell {
                grid: row.int(0)?,
                width: row.real(1)?,
                height: row.real(2)?,
                n_value: row.real(3)?,
                direction: row.int(4)?,
            });
        }
        first = false;
    }
    Ok(data)
}

pub fn emit_gutter(data: &GutterData) -> DatWriter {
    let mut w = DatWriter::new("GUTTER.DAT");
    if let Some(g) = &data.global {
        w.push(Line::new().reals(&[g.width, g.height, g.n_value]));
    }
    for c in &data.cells {
        w.push(
            Line::new()
                .int(c.grid)
                .reals(&[c.width, c.height, c.n_value])
                .int(c.direction),
        );
    }
    w
}

fn check_count(file: &str, declared: i64, found: usize, warnings: &mut Vec<String>) {
    if declared != found as i64 {
        warnings.push(format!(
            "{}: header declares {} rows but {} follow",
            file, declared, found
        ));
    }
}

pub fn parse_wsurf(rows: &mut RowStream, warnings: &mut Vec<String>) -> DatResult<WsurfData> {
    let declared = rows.expect_row(1)?.int(0)?;
    let mut data = WsurfData::default();
    while let Some(row) = rows.next_row()? {
        data.cells.push(CellValue::new(row.int(0)?, row.real(1)?));
    }
    check_count("WSURF.DAT", declared, data.cells.len(), warnings);
    Ok(data)
}

pub fn emit_wsurf(data: &WsurfData) -> DatWriter {
    let mut w = DatWriter::new("WSURF.DAT");
    w.push(Line::new().int(data.cells.len() as i64));
    for c in &data.cells {
        w.push(Line::new().int(c.grid).real(c.value));
    }
    w
}

pub fn parse_wstime(rows: &mut RowStream, warnings: &mut Vec<String>) -> DatResult<WstimeData> {
    let declared = rows.expect_row(1)?.int(0)?;
    let mut data = WstimeData::default();
    while let Some(row) = rows.next_row()? {
        data.cells.push(WstimeCell {
            grid: row.int(0)?,
            wselev: row.real(1)?,
            time: row.opt_real(2)?.unwrap_or(0.0),
        });
    }
    check_count("WSTIME.DAT", declared, data.cells.len(), warnings);
    Ok(data)
}

pub fn emit_wstime(data: &WstimeData) -> DatWriter {
    let mut w = DatWriter::new("WSTIME.DAT");
    w.push(Line::new().int(data.cells.len() as i64));
    for c in &data.cells {
        w.push(Line::new().int(c.grid).real(c.wselev).real(c.time));
    }
    w
}

pub fn parse_cell_array(rows: &mut RowStream, kind: CellArrayKind) -> DatResult<CellArrayData> {
    let mut data = CellArrayData::new(kind);
    while let Some(row) = rows.next_row()? {
        row.require(2)?;
        data.rows.push(CellValues {
            grid: row.int(0)?,
            values: row.rest_reals(1)?,
        });
    }
    Ok(data)
}

pub fn emit_cell_array(data: &CellArrayData) -> DatWriter {
    let mut w = DatWriter::new(data.kind.spec().file);
    for r in &data.rows {
        w.push(Line::new().int(r.grid).reals(&r.values));
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fpxsec_count_mismatch_warns_but_keeps_cells() {
        let mut warnings = Vec::new();
        let text = "P 2\nX 1 3 10 11 12\nX 3 3 20 21\n";
        let mut rows = RowStream::from_text("FPXSEC.DAT", text);
        let data = parse_fpxsec(&mut rows, &mut warnings).unwrap();
        assert_eq!(data.nxprt, 2);
        assert_eq!(data.sections[1].cells, vec![20, 21]);
        assert_eq!(data.sections[1].nnxsec, 3);
        assert_eq!(warnings.len(), 1);
        assert_eq!(emit_fpxsec(&data).text(), text);
    }

    #[test]
    fn gutter_global_line_is_optional() {
        let text = "1.5 0.5 0.015\n4 1.5 0.5 0.015 2\n";
        let data = parse_gutter(&mut RowStream::from_text("GUTTER.DAT", text)).unwrap();
        assert!(data.global.is_some());
        assert_eq!(emit_gutter(&data).text(), text);

        let mut rows = RowStream::from_text("GUTTER.DAT", "4 1.5 0.5 0.015 2\n");
        let data = parse_gutter(&mut rows).unwrap();
        assert!(data.global.is_none());
        assert_eq!(data.cells[0].direction, 2);
    }

    #[test]
    fn water_surface_count_is_rewritten() {
        let mut warnings = Vec::new();
        let data = parse_wsurf(
            &mut RowStream::from_text("WSURF.DAT", "3\n1 100.5\n2 101\n"),
            &mut warnings,
        )
        .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(emit_wsurf(&data).text(), "2\n1 100.5\n2 101\n");
    }

    #[test]
    fn stack_depth_rows_carry_two_values() {
        let text = "5 2.5 0.45\n6 3 0.5\n";
        let data = parse_cell_array(
            &mut RowStream::from_text("TAILINGS_STACK_DEPTH.DAT", text),
            CellArrayKind::TailingsStackDepth,
        )
        .unwrap();
        assert_eq!(data.rows[0].values, vec![2.5, 0.45]);
        let out = emit_cell_array(&data);
        assert_eq!(out.name(), "TAILINGS_STACK_DEPTH.DAT");
        assert_eq!(out.text(), text);
    }
}
