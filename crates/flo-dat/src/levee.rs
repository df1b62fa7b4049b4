//! LEVEE.DAT and BREACH.DAT.

use flo_model::levee::BREACH_LINE_WIDTHS;
use flo_model::{
    BreachData, BreachFragility, BreachLocal, CellFragility, Fragility, LeveeCell,
    LeveeData, LeveeDirection, LeveeFailureCell, LeveeWall,
};

use crate::{DatResult, DatWriter, Line, Row, RowStream};

pub fn parse_levee(rows: &mut RowStream) -> DatResult<LeveeData> {
    let head = rows.expect_row(2)?;
    let mut data = LeveeData {
        raiselev: head.real(0)?,
        ilevfail: head.int(1)?,
        ..Default::default()
    };
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "L" => data.cells.push(LeveeCell {
                grid: row.int(1)?,
                directions: Vec::new(),
            }),
            "D" => {
                let cell = data.cells.last_mut().ok_or_else(|| row.unknown_tag())?;
                cell.directions.push(LeveeDirection {
                    dir: row.int(1)?,
                    crest: row.real(2)?,
                });
            }
            "F" => data.failures.push(LeveeFailureCell {
                grid: row.int(1)?,
                walls: Vec::new(),
            }),
            "W" => {
                let cell = data.failures.last_mut().ok_or_else(|| row.unknown_tag())?;
                let v = row.fixed::<6>(2)?;
                cell.walls.push(LeveeWall {
                    dir: row.int(1)?,
                    failevel: v[0],
                    failtime: v[1],
                    levbase: v[2],
                    failwidthmax: v[3],
                    failrate: v[4],
                    failwidrate: v[5],
                });
            }
            "C" => {
                data.global_fragility = Some(Fragility {
                    fragchar: row.text(1)?.to_string(),
                    prob: row.real(2)?,
                })
            }
            "P" => data.fragility.push(CellFragility {
                grid: row.int(1)?,
                fragchar: row.text(2)?.to_string(),
                prob: row.real(3)?,
            }),
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

pub fn emit_levee(data: &LeveeData) -> DatWriter {
    let mut w = DatWriter::new("LEVEE.DAT");
    w.push(Line::new().real(data.raiselev).int(data.ilevfail));
    for cell in &data.cells {
        w.push(Line::tag("L").int(cell.grid));
        for d in &cell.directions {
            w.push(Line::tag("D").int(d.dir).real(d.crest));
        }
    }
    for cell in &data.failures {
        w.push(Line::tag("F").int(cell.grid));
        for wall in &cell.walls {
            w.push(Line::tag("W").int(wall.dir).reals(&[
                wall.failevel,
                wall.failtime,
                wall.levbase,
                wall.failwidthmax,
                wall.failrate,
                wall.failwidrate,
            ]));
        }
    }
    if let Some(g) = &data.global_fragility {
        w.push(Line::tag("C").text(&g.fragchar).real(g.prob));
    }
    for p in &data.fragility {
        w.push(Line::tag("P").int(p.grid).text(&p.fragchar).real(p.prob));
    }
    w
}

/// Reads the remaining lines of a four-line breach group. `first` already
/// holds the values of line one.
fn breach_group(first: Vec<f64>, head: &Row, rows: &mut RowStream) -> DatResult<Vec<f64>> {
    let mut values = first;
    for width in &BREACH_LINE_WIDTHS[1..] {
        let row = rows.expect_row(*width + 1)?;
        if row.tag() != head.tag() {
            return Err(row.unknown_tag().into());
        }
        values.extend(row.reals(1, *width)?);
    }
    Ok(values)
}

pub fn parse_breach(rows: &mut RowStream) -> DatResult<BreachData> {
    let mut data = BreachData::default();
    while let Some(row) = rows.next_row()? {
        match row.tag() {
            "G" => {
                let first = row.reals(1, BREACH_LINE_WIDTHS[0])?;
                data.global = Some(breach_group(first, &row, rows)?);
            }
            "D" => {
                let grid = row.int(1)?;
                let first = row.reals(2, BREACH_LINE_WIDTHS[0])?;
                data.locals.push(BreachLocal {
                    grid,
                    params: breach_group(first, &row, rows)?,
                });
            }
            "F" => data.fragility.push(BreachFragility {
                fragchar: row.text(1)?.to_string(),
                prfail: row.real(2)?,
                prdepth: row.real(3)?,
            }),
            _ => return Err(row.unknown_tag().into()),
        }
    }
    Ok(data)
}

fn push_group(w: &mut DatWriter, tag: &str, grid: Option<i64>, params: &[f64]) {
    let mut start = 0;
    for (i, width) in BREACH_LINE_WIDTHS.iter().enumerate() {
        let end = (start + width).min(params.len());
        let line = Line::tag(tag);
        let line = if i == 0 { line.opt_int(grid) } else { line };
        w.push(line.reals(&params[start.min(end)..end]));
        start = end;
    }
}

pub fn emit_breach(data: &BreachData) -> DatWriter {
    let mut w = DatWriter::new("BREACH.DAT");
    if let Some(global) = &data.global {
        push_group(&mut w, "G", None, global);
    }
    for local in &data.locals {
        push_group(&mut w, "D", Some(local.grid), &local.params);
    }
    for f in &data.fragility {
        w.push(Line::tag("F").text(&f.fragchar).real(f.prfail).real(f.prdepth));
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levee_cells_walls_and_fragility_round_trip() {
        let text = "\
0 1
L 10
D 1 102.5
D 5 102.7
F 10
W 1 102 0.5 100 30 0.1 0.2
C FC 0.5
P 10 FC 0.8
";
        let data = parse_levee(&mut RowStream::from_text("LEVEE.DAT", text)).unwrap();
        assert_eq!(data.cells[0].directions.len(), 2);
        assert!(data.failures[0].walls[0].is_meaningful());
        assert_eq!(emit_levee(&data).text(), text);
    }

    #[test]
    fn breach_groups_span_four_lines() {
        let text = "\
G 1 2 3 4 5 6 7 8
G 9 10 11 12 13 14 15
G 16 17 18 19 20 21 22
G 23 24 25 26 27 28
D 77 1 1 1 1 1 1 1 1
D 2 2 2 2 2 2 2
D 3 3 3 3 3 3 3
D 4 4 4 4 4 4
F PF 0.5 2
";
        let data = parse_breach(&mut RowStream::from_text("BREACH.DAT", text)).unwrap();
        let global = data.global.as_ref().unwrap();
        assert_eq!(global.len(), 28);
        assert_eq!(global[27], 28.0);
        assert_eq!(data.locals[0].grid, 77);
        assert_eq!(data.locals[0].params.len(), 28);
        assert_eq!(emit_breach(&data).text(), text);
    }

    #[test]
    fn breach_group_interrupted_by_other_tag_fails() {
        let text = "G 1 2 3 4 5 6 7 8\nD 1 1 1 1 1 1 1 1 1\n";
        assert!(parse_breach(&mut RowStream::from_text("BREACH.DAT", text)).is_err());
    }
}
