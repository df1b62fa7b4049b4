//! HYSTRUC.DAT and BRIDGE_XSEC.DAT.

use flo_model::{
    BridgeXsPoint, CulvertEquation, RatingCurve, RatingTableRow, Structure, StructureData,
};

use crate::{DatResult, DatWriter, Line, Row, RowStream};

fn rating_curve(row: &Row) -> DatResult<RatingCurve> {
    let v = row.fixed::<5>(1)?;
    Ok(RatingCurve {
        depth: v[0],
        qcoef: v[1],
        qexp: v[2],
        acoef: v[3],
        aexp: v[4],
    })
}

pub fn parse_hystruc(rows: &mut RowStream) -> DatResult<StructureData> {
    let mut data = StructureData::default();
    while let Some(row) = rows.next_row()? {
        if row.tag() == "S" {
            row.require(7)?;
            let mut s = Structure::new(row.text(1)?, row.int(4)?, row.int(5)?);
            s.ifporchan = row.int(2)?;
            s.icurvtable = row.int(3)?;
            s.inoutcont = row.int(6)?;
            s.headrefel = row.opt_real(7)?.unwrap_or(0.0);
            s.clength = row.opt_real(8)?.unwrap_or(0.0);
            s.cdiameter = row.opt_real(9)?.unwrap_or(0.0);
            data.structures.push(s);
            continue;
        }
        let s = data.structures.last_mut().ok_or_else(|| row.unknown_tag())?;
        match row.tag() {
            "C" => s.rating_curves.push(rating_curve(&row)?),
            "R" => s.repl_rating_curves.push(rating_curve(&row)?),
            "T" => s.rating_table.push(RatingTableRow {
                hdepth: row.real(1)?,
                qtable: row.real(2)?,
                atable: row.real(3)?,
            }),
            "F" => s.culverts.push(CulvertEquation {
                typec: row.int(1)?,
                typeen: row.int(2)?,
                culvertn: row.real(3)?,
                ke: row.real(4)?,
                cubase: row.real(5)?,
                multbarrels: row.int(6)?,
            }),
            "D" => s.storm_drain_cap = Some(row.real(1)?),
            "B" => s.push_bridge_row(row.rest_reals(1)?),
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

/// Attaches BRIDGE_XSEC.DAT points to the structure whose inlet matches
/// each `X` header. Unmatched blocks are skipped with a warning.
pub fn parse_bridge_xsec(
    rows: &mut RowStream,
    data: &mut StructureData,
    warnings: &mut Vec<String>,
) -> DatResult<()> {
    let mut target: Option<usize> = None;
    let mut seen_header = false;
    while let Some(row) = rows.next_row()? {
        if row.tag() == "X" {
            seen_header = true;
            let inlet = row.int(1)?;
            target = data.structures.iter().position(|s| s.inflonod == inlet);
            if target.is_none() {
                warnings.push(format!(
                    "BRIDGE_XSEC.DAT line {}: no structure has inlet {}",
                    row.line, inlet
                ));
            }
            continue;
        }
        if !seen_header {
            return Err(row.unknown_tag().into());
        }
        if let Some(i) = target {
            data.structures[i].bridge_xs.push(BridgeXsPoint {
                xup: row.real(0)?,
                yup: row.real(1)?,
                yb: row.real(2)?,
            });
        }
    }
    Ok(())
}

fn curve_line(tag: &str, c: &RatingCurve) -> Line {
    Line::tag(tag).reals(&[c.depth, c.qcoef, c.qexp, c.acoef, c.aexp])
}

pub fn emit_hystruc(data: &StructureData) -> Vec<DatWriter> {
    let mut w = DatWriter::new("HYSTRUC.DAT");
    let mut xs = DatWriter::new("BRIDGE_XSEC.DAT");
    for s in &data.structures {
        w.push(
            Line::tag("S")
                .text(&s.name)
                .int(s.ifporchan)
                .int(s.icurvtable)
                .int(s.inflonod)
                .int(s.outflonod)
                .int(s.inoutcont)
                .reals(&[s.headrefel, s.clength, s.cdiameter]),
        );
        for c in &s.rating_curves {
            w.push(curve_line("C", c));
        }
        for c in &s.repl_rating_curves {
            w.push(curve_line("R", c));
        }
        for t in &s.rating_table {
            w.push(Line::tag("T").reals(&[t.hdepth, t.qtable, t.atable]));
        }
        for f in &s.culverts {
            w.push(
                Line::tag("F")
                    .int(f.typec)
                    .int(f.typeen)
                    .reals(&[f.culvertn, f.ke, f.cubase])
                    .int(f.multbarrels),
            );
        }
        if let Some(cap) = s.storm_drain_cap {
            w.push(Line::tag("D").real(cap));
        }
        for b in &s.bridges {
            w.push(Line::tag("B").reals(&b.first));
            if let Some(second) = &b.second {
                w.push(Line::tag("B").reals(second));
            }
        }
        if !s.bridge_xs.is_empty() {
            xs.push(Line::tag("X").int(s.inflonod));
            for p in &s.bridge_xs {
                xs.push(Line::new().reals(&[p.xup, p.yup, p.yb]));
            }
        }
    }
    let mut out = vec![w];
    if !xs.is_empty() {
        out.push(xs);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const HYSTRUC: &str = "\
S CULV1 1 2 40 41 0 100.5 30 1.5
F 1 1 0.012 0.5 0 2
D 3.5
S BR1 0 3 50 51 0 0 0 0
B 1 0.9 0 1 1 1 1 1 1
B 20 30 0.03 5 105 2 30 1 1 1 1.2 0 0 0 0
";

    #[test]
    fn structures_and_bridges_round_trip() {
        let data = parse_hystruc(&mut RowStream::from_text("HYSTRUC.DAT", HYSTRUC)).unwrap();
        assert_eq!(data.structures.len(), 2);
        assert_eq!(data.structures[0].culverts[0].multbarrels, 2);
        assert_eq!(data.structures[0].storm_drain_cap, Some(3.5));
        assert!(data.structures[1].is_bridge());
        assert_eq!(data.structures[1].bridges.len(), 1);
        assert_eq!(emit_hystruc(&data)[0].text(), HYSTRUC);
    }

    #[test]
    fn bridge_sections_bind_by_inlet() {
        let mut data = parse_hystruc(&mut RowStream::from_text("HYSTRUC.DAT", HYSTRUC)).unwrap();
        let mut warnings = Vec::new();
        let text = "X 50\n0 10 9\n5 9.5 8.5\nX 99\n1 1 1\n";
        parse_bridge_xsec(
            &mut RowStream::from_text("BRIDGE_XSEC.DAT", text),
            &mut data,
            &mut warnings,
        )
        .unwrap();
        assert_eq!(data.structures[1].bridge_xs.len(), 2);
        assert_eq!(warnings.len(), 1);
        let files = emit_hystruc(&data);
        assert_eq!(files[1].text(), "X 50\n0 10 9\n5 9.5 8.5\n");
    }

    #[test]
    fn short_structure_header_defaults_trailing_fields() {
        let mut rows = RowStream::from_text("HYSTRUC.DAT", "S A 0 0 1 2 0\n");
        let data = parse_hystruc(&mut rows).unwrap();
        assert_eq!(data.structures[0].headrefel, 0.0);
        assert_eq!(data.structures[0].cdiameter, 0.0);
    }
}
