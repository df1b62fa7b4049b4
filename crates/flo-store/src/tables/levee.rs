use flo_core::geo::{Direction, compass_segment, line_wkt};
use flo_core::ComponentReport;
use flo_model::{
    BREACH_FIELDS, BreachData, BreachFragility, BreachLocal, CellFragility, Fragility, LeveeCell,
    LeveeData, LeveeDirection, LeveeFailureCell, LeveeWall,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::GridIndex;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real};

pub(super) fn write_levee(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &LeveeData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    let frag = data.global_fragility.as_ref();
    batch.insert(
        "INSERT INTO levee_general (raiselev, ilevfail, gfragchar, gfragprob)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            data.raiselev,
            data.ilevfail,
            frag.map(|f| f.fragchar.as_str()),
            frag.map(|f| f.prob),
        ],
    )?;
    for cell in &data.cells {
        let (x, y) = grid.centroid(cell.grid)?;
        let cell_fid = batch.insert("INSERT INTO levee_cells (grid_fid) VALUES (?1)", [cell.grid])?;
        for d in &cell.directions {
            let geom = match Direction::from_code(d.dir) {
                Some(dir) => Some(line_wkt(&compass_segment(x, y, grid.cell_size(), dir))),
                None => {
                    report.warn(format!(
                        "levee cell {}: direction {} is not 1..8, no segment drawn",
                        cell.grid, d.dir
                    ));
                    None
                }
            };
            batch.insert(
                "INSERT INTO levee_data (cell_fid, ldir, levcrest, geom) VALUES (?1, ?2, ?3, ?4)",
                params![cell_fid, d.dir, d.crest, geom],
            )?;
        }
    }
    let mut empty_walls = 0;
    for failure in &data.failures {
        for w in &failure.walls {
            if !w.is_meaningful() {
                empty_walls += 1;
                continue;
            }
            batch.insert(
                "INSERT INTO levee_failure (grid_fid, lfaildir, failevel, failtime, levbase,
                                            failwidthmax, failrate, failwidrate)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    failure.grid,
                    w.dir,
                    w.failevel,
                    w.failtime,
                    w.levbase,
                    w.failwidthmax,
                    w.failrate,
                    w.failwidrate,
                ],
            )?;
        }
    }
    if empty_walls > 0 {
        report.count("empty_failure_walls", empty_walls);
    }
    for f in &data.fragility {
        batch.insert(
            "INSERT INTO levee_fragility (grid_fid, levfragchar, levfragprob) VALUES (?1, ?2, ?3)",
            params![f.grid, f.fragchar, f.prob],
        )?;
    }
    Ok(())
}

pub(super) fn read_levee(conn: &Connection) -> StoreResult<Option<LeveeData>> {
    let head = conn
        .query_row(
            "SELECT raiselev, ilevfail, gfragchar, gfragprob FROM levee_general
             ORDER BY fid LIMIT 1",
            [],
            |row| {
                let fragility = match row.get::<_, Option<String>>(2)? {
                    Some(fragchar) => Some(Fragility {
                        fragchar,
                        prob: real(row, 3)?,
                    }),
                    None => None,
                };
                Ok((real(row, 0)?, int(row, 1)?, fragility))
            },
        )
        .optional()?;
    let Some((raiselev, ilevfail, global_fragility)) = head else {
        return Ok(None);
    };
    let heads = query(
        conn,
        "SELECT fid, grid_fid FROM levee_cells ORDER BY fid",
        [],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    let mut cells = Vec::with_capacity(heads.len());
    for (cell_fid, grid) in heads {
        let directions = query(
            conn,
            "SELECT ldir, levcrest FROM levee_data WHERE cell_fid = ?1 ORDER BY fid",
            [cell_fid],
            |row| {
                Ok(LeveeDirection {
                    dir: int(row, 0)?,
                    crest: real(row, 1)?,
                })
            },
        )?;
        cells.push(LeveeCell { grid, directions });
    }
    let walls = query(
        conn,
        "SELECT grid_fid, lfaildir, failevel, failtime, levbase, failwidthmax, failrate, failwidrate
         FROM levee_failure ORDER BY fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                LeveeWall {
                    dir: int(row, 1)?,
                    failevel: real(row, 2)?,
                    failtime: real(row, 3)?,
                    levbase: real(row, 4)?,
                    failwidthmax: real(row, 5)?,
                    failrate: real(row, 6)?,
                    failwidrate: real(row, 7)?,
                },
            ))
        },
    )?;
    let mut failures: Vec<LeveeFailureCell> = Vec::new();
    for (grid, wall) in walls {
        match failures.iter_mut().find(|f| f.grid == grid) {
            Some(f) => f.walls.push(wall),
            None => failures.push(LeveeFailureCell {
                grid,
                walls: vec![wall],
            }),
        }
    }
    let fragility = query(
        conn,
        "SELECT grid_fid, levfragchar, levfragprob FROM levee_fragility ORDER BY fid",
        [],
        |row| {
            Ok(CellFragility {
                grid: row.get(0)?,
                fragchar: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                prob: real(row, 2)?,
            })
        },
    )?;
    Ok(Some(LeveeData {
        raiselev,
        ilevfail,
        cells,
        failures,
        global_fragility,
        fragility,
    }))
}

/// Breach parameters padded with NULL to the full field list.
fn breach_values(values: &[f64]) -> impl Iterator<Item = Value> + '_ {
    (0..BREACH_FIELDS.len()).map(move |i| match values.get(i) {
        Some(v) => Value::Real(*v),
        None => Value::Null,
    })
}

fn breach_sql(table: &str, leading: &[&str]) -> String {
    let columns: Vec<&str> = leading.iter().chain(BREACH_FIELDS.iter()).copied().collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Reads the breach columns starting at `offset`, dropping trailing NULLs.
fn breach_params(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Vec<f64>> {
    let mut values: Vec<Option<f64>> = Vec::with_capacity(BREACH_FIELDS.len());
    for i in 0..BREACH_FIELDS.len() {
        values.push(row.get(offset + i)?);
    }
    while values.last().is_some_and(Option::is_none) {
        values.pop();
    }
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

pub(super) fn write_breach(batch: &mut Batch<'_>, data: &BreachData) -> StoreResult<()> {
    if let Some(global) = &data.global {
        batch.insert(
            &breach_sql("breach_global", &[]),
            params_from_iter(breach_values(global)),
        )?;
    }
    let local_sql = breach_sql("breach", &["grid_fid"]);
    for local in &data.locals {
        let values =
            std::iter::once(Value::Integer(local.grid)).chain(breach_values(&local.params));
        batch.insert(&local_sql, params_from_iter(values))?;
    }
    for f in &data.fragility {
        batch.insert(
            "INSERT INTO breach_fragility_curves (fragchar, prfail, prdepth) VALUES (?1, ?2, ?3)",
            params![f.fragchar, f.prfail, f.prdepth],
        )?;
    }
    Ok(())
}

pub(super) fn read_breach(conn: &Connection) -> StoreResult<Option<BreachData>> {
    let fields = BREACH_FIELDS.join(", ");
    let global = conn
        .query_row(
            &format!("SELECT {} FROM breach_global ORDER BY fid LIMIT 1", fields),
            [],
            |row| breach_params(row, 0),
        )
        .optional()?;
    let locals = query(
        conn,
        &format!("SELECT grid_fid, {} FROM breach ORDER BY fid", fields),
        [],
        |row| {
            Ok(BreachLocal {
                grid: row.get(0)?,
                params: breach_params(row, 1)?,
            })
        },
    )?;
    let fragility = query(
        conn,
        "SELECT fragchar, prfail, prdepth FROM breach_fragility_curves ORDER BY fid",
        [],
        |row| {
            Ok(BreachFragility {
                fragchar: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                prfail: real(row, 1)?,
                prdepth: real(row, 2)?,
            })
        },
    )?;
    let data = BreachData {
        global,
        locals,
        fragility,
    };
    if data.global.is_none() && data.locals.is_empty() && data.fragility.is_empty() {
        return Ok(None);
    }
    Ok(Some(data))
}
