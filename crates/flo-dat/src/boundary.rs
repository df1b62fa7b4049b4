//! INFLOW.DAT and OUTFLOW.DAT.

use flo_core::SchemaErrorKind;
use flo_model::{
    Control, Inflow, InflowData, InflowKind, OutflowData, QhParam, Reservoir, SeriesRow, TimeValue,
};

use crate::{DatResult, DatWriter, Line, RowStream};

pub fn parse_inflow(rows: &mut RowStream) -> DatResult<InflowData> {
    let mut data = InflowData::default();

    if let Some(first) = rows.peek_row()? {
        if first.len() == 2 && first.is_numeric_at(0) && first.is_numeric_at(1) {
            let header = rows.expect_row(2)?;
            data.ihourdaily = Some(header.int(0)?);
            data.ideplt = Some(header.int(1)?);
        }
    }

    while let Some(row) = rows.next_row()? {
        match row.tag() {
            tag @ ("C" | "F") => {
                let kind = InflowKind::from_tag(tag).ok_or_else(|| row.unknown_tag())?;
                data.inflows.push(Inflow {
                    kind,
                    inoutfc: row.int(1)?,
                    grid: row.int(2)?,
                    series: Vec::new(),
                });
            }
            "H" => {
                let inflow = data.inflows.last_mut().ok_or_else(|| row.unknown_tag())?;
                inflow.series.push(SeriesRow {
                    time: row.real(1)?,
                    value: row.real(2)?,
                    value2: row.opt_real(3)?,
                });
            }
            "R" => {
                let extras = row.rest_reals(3)?;
                data.reservoirs
                    .push(Reservoir::from_row(row.int(1)?, row.real(2)?, &extras));
            }
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

/// `IDEPLT` is 0 without graphics, else the first inflow cell.
pub fn effective_ideplt(data: &InflowData, control: &Control) -> i64 {
    if control.int("LGPLOT").unwrap_or(0) == 0 {
        return 0;
    }
    data.inflows
        .first()
        .map(|i| i.grid)
        .or_else(|| control.int("IDEPLT"))
        .or(data.ideplt)
        .unwrap_or(0)
}

pub fn emit_inflow(data: &InflowData, control: &Control) -> DatWriter {
    let mut w = DatWriter::new("INFLOW.DAT");
    let ihourdaily = control
        .int("IHOURDAILY")
        .or(data.ihourdaily)
        .unwrap_or(0);
    w.push(Line::new().int(ihourdaily).int(effective_ideplt(data, control)));
    for inflow in &data.inflows {
        w.push(
            Line::tag(inflow.kind.tag())
                .int(inflow.inoutfc)
                .int(inflow.grid),
        );
        for s in &inflow.series {
            w.push(Line::tag("H").real(s.time).real(s.value).opt_real(s.value2));
        }
    }
    for res in &data.reservoirs {
        let n = res.use_n_value.then_some(res.n_value);
        let tailings = res.has_tailings().then_some(res.tailings);
        w.push(
            Line::tag("R")
                .int(res.grid)
                .real(res.wsel)
                .opt_real(n)
                .opt_real(tailings),
        );
    }
    w
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Channel(i64),
    Floodplain(i64),
    None,
}

fn hydro_tag(tag: &str) -> Option<i64> {
    let digits = tag.strip_prefix('O')?;
    if digits.is_empty() {
        return Some(0);
    }
    match digits.parse::<i64>() {
        Ok(n) if (0..=9).contains(&n) => Some(n),
        _ => None,
    }
}

pub fn parse_outflow(rows: &mut RowStream) -> DatResult<OutflowData> {
    let mut data = OutflowData::default();
    let mut block = Block::None;

    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "K" => {
                let grid = row.int(1)?;
                let chan_out = row.opt_int(2)?.unwrap_or(1);
                data.cell_mut(grid).chan_out = chan_out;
                block = Block::Channel(grid);
            }
            "N" => {
                let grid = row.int(1)?;
                let fp_out = row.opt_int(2)?.unwrap_or(1);
                data.cell_mut(grid).fp_out = fp_out;
                block = Block::Floodplain(grid);
            }
            "H" | "T" => {
                let Block::Channel(grid) = block else {
                    return Err(row.unknown_tag().into());
                };
                let cell = data.cell_mut(grid);
                if row.tag() == "H" {
                    cell.qh_params.push(QhParam {
                        hmax: row.real(1)?,
                        coef: row.real(2)?,
                        exponent: row.real(3)?,
                    });
                } else {
                    cell.qh_table.push([row.real(1)?, row.real(2)?]);
                }
            }
            "S" => {
                let point = TimeValue::new(row.real(1)?, row.real(2)?);
                match block {
                    Block::Channel(grid) => data.cell_mut(grid).chan_tser.push(point),
                    Block::Floodplain(grid) => data.cell_mut(grid).fp_tser.push(point),
                    Block::None => return Err(row.unknown_tag().into()),
                }
            }
            tag => {
                let Some(hydro) = hydro_tag(tag) else {
                    return Err(row
                        .error(SchemaErrorKind::UnknownTag {
                            tag: tag.to_string(),
                        })
                        .into());
                };
                let grid = row.int(1)?;
                let cell = data.cell_mut(grid);
                if hydro == 0 {
                    cell.fp_out = 1;
                } else {
                    cell.hydro_out = hydro;
                }
                block = Block::None;
            }
        }
    }
    Ok(data)
}

/// K blocks, then N blocks, then `O` lines sorted by `(hydro_out, grid)`.
pub fn emit_outflow(data: &OutflowData) -> DatWriter {
    let mut w = DatWriter::new("OUTFLOW.DAT");
    for cell in data.cells.iter().filter(|c| c.has_channel_block()) {
        let mut head = Line::tag("K").int(cell.grid);
        if cell.chan_out != 1 {
            head = head.int(cell.chan_out);
        }
        w.push(head);
        for p in &cell.qh_params {
            w.push(Line::tag("H").real(p.hmax).real(p.coef).real(p.exponent));
        }
        for [depth, q] in &cell.qh_table {
            w.push(Line::tag("T").real(*depth).real(*q));
        }
        for s in &cell.chan_tser {
            w.push(Line::tag("S").real(s.time).real(s.value));
        }
    }
    for cell in data.cells.iter().filter(|c| c.has_floodplain_block()) {
        w.push(Line::tag("N").int(cell.grid).int(cell.fp_out));
        for s in &cell.fp_tser {
            w.push(Line::tag("S").real(s.time).real(s.value));
        }
    }
    let mut o_lines: Vec<(i64, i64)> = Vec::new();
    for cell in &data.cells {
        if cell.hydro_out > 0 {
            o_lines.push((cell.hydro_out, cell.grid));
        }
        if cell.fp_out == 1 && !cell.has_floodplain_block() {
            o_lines.push((0, cell.grid));
        }
    }
    o_lines.sort();
    for (hydro, grid) in o_lines {
        let tag = if hydro == 0 {
            "O".to_string()
        } else {
            format!("O{}", hydro)
        };
        w.push(Line::tag(&tag).int(grid));
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservoir_rows_disambiguate_by_magnitude() {
        let text = "0 0\nR 100 500.0 2.5\nR 101 500.0 0.03\n";
        let data = parse_inflow(&mut RowStream::from_text("INFLOW.DAT", text)).unwrap();
        let a = &data.reservoirs[0];
        assert_eq!((a.wsel, a.tailings, a.n_value, a.use_n_value), (500.0, 2.5, 0.25, false));
        let b = &data.reservoirs[1];
        assert_eq!((b.wsel, b.n_value, b.use_n_value, b.tailings), (500.0, 0.03, true, -1.0));
    }

    #[test]
    fn inflow_round_trip_and_ideplt_rule() {
        let text = "0 7\nF 0 7\nH 0 0\nH 1 150 0.2\nC 0 12\nH 0 5\nR 3 100.5 0.03 2.5\n";
        let data = parse_inflow(&mut RowStream::from_text("INFLOW.DAT", text)).unwrap();
        assert_eq!(data.inflows.len(), 2);
        assert_eq!(data.inflows[0].series[1].value2, Some(0.2));
        let control = Control::from_pairs([("LGPLOT", "2")]);
        assert_eq!(emit_inflow(&data, &control).finish().text, text);

        let quiet = Control::from_pairs([("LGPLOT", "0")]);
        let out = emit_inflow(&data, &quiet).finish().text;
        assert!(out.starts_with("0 0\n"));
    }

    #[test]
    fn single_k_line_is_channel_outflow() {
        let data = parse_outflow(&mut RowStream::from_text("OUTFLOW.DAT", "K 17\n")).unwrap();
        assert_eq!(data.cells.len(), 1);
        assert_eq!(data.cells[0].chan_out, 1);
        assert_eq!(data.cells[0].outflow_type(), 2);
    }

    #[test]
    fn outflow_canonical_round_trip() {
        let text = "\
K 17
H 10 2.5 1.5
T 0 0
T 1 20
K 18
S 0 100
S 1 101
N 40 1
S 0 50
O 30
O 31
O2 25
";
        let data = parse_outflow(&mut RowStream::from_text("OUTFLOW.DAT", text)).unwrap();
        assert_eq!(data.cells.len(), 6);
        let by_grid = |g: i64| data.cells.iter().find(|c| c.grid == g).unwrap();
        assert_eq!(by_grid(17).qh_table.len(), 2);
        assert_eq!(by_grid(40).outflow_type(), 7);
        assert_eq!(by_grid(25).outflow_type(), 4);
        assert_eq!(emit_outflow(&data).finish().text, text);
    }

    #[test]
    fn floodplain_code_survives_without_stage_series() {
        let text = "N 40 2\nO 41\n";
        let data = parse_outflow(&mut RowStream::from_text("OUTFLOW.DAT", text)).unwrap();
        let by_grid = |g: i64| data.cells.iter().find(|c| c.grid == g).unwrap();
        assert_eq!(by_grid(40).fp_out, 2);
        assert!(by_grid(40).has_floodplain_block());
        assert!(!by_grid(41).has_floodplain_block());
        assert_eq!(emit_outflow(&data).finish().text, text);
    }

    #[test]
    fn unknown_outflow_tag_fails() {
        let err = parse_outflow(&mut RowStream::from_text("OUTFLOW.DAT", "Q 3\n")).unwrap_err();
        assert!(err.to_string().contains("'Q'"));
    }
}
