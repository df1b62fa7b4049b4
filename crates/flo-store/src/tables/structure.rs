use std::collections::BTreeMap;

use flo_core::geo::{Direction, line_wkt, multiline_wkt, polyline, street_glyph};
use flo_core::ComponentReport;
use flo_model::{
    BridgeVariables, BridgeXsPoint, CulvertEquation, RatingCurve, RatingTableRow, Street,
    StreetData, StreetGlobal, StreetSegment, StreetWing, Structure, StructureData,
};
use rusqlite::{Connection, OptionalExtension, params};

use super::GridIndex;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real};

pub(super) fn write_structures(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &StructureData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    let mut rejected = 0;
    for s in &data.structures {
        if !grid.contains(s.inflonod) || !grid.contains(s.outflonod) {
            report.warn(format!(
                "structure '{}' skipped: inflow {} or outflow {} outside [1..{}]",
                s.name,
                s.inflonod,
                s.outflonod,
                grid.len()
            ));
            rejected += 1;
            continue;
        }
        let geom = line_wkt(&polyline(&[
            grid.centroid(s.inflonod)?,
            grid.centroid(s.outflonod)?,
        ]));
        let fid = batch.insert(
            "INSERT INTO struct (structname, ifporchan, icurvtable, inflonod, outflonod, inoutcont,
                                 headrefel, clength, cdiameter, geom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                s.name,
                s.ifporchan,
                s.icurvtable,
                s.inflonod,
                s.outflonod,
                s.inoutcont,
                s.headrefel,
                s.clength,
                s.cdiameter,
                geom,
            ],
        )?;
        for c in &s.rating_curves {
            batch.insert(
                "INSERT INTO rat_curves (struct_fid, hdepexc, coefq, expq, coefa, expa)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![fid, c.depth, c.qcoef, c.qexp, c.acoef, c.aexp],
            )?;
        }
        for c in &s.repl_rating_curves {
            batch.insert(
                "INSERT INTO repl_rat_curves (struct_fid, repdep, rqcoef, rqexp, racoef, raexp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![fid, c.depth, c.qcoef, c.qexp, c.acoef, c.aexp],
            )?;
        }
        for t in &s.rating_table {
            batch.insert(
                "INSERT INTO rat_table (struct_fid, hdepth, qtable, atable)
                 VALUES (?1, ?2, ?3, ?4)",
                params![fid, t.hdepth, t.qtable, t.atable],
            )?;
        }
        for c in &s.culverts {
            batch.insert(
                "INSERT INTO culvert_equations
                    (struct_fid, typec, typeen, culvertn, ke, cubase, multbarrels)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![fid, c.typec, c.typeen, c.culvertn, c.ke, c.cubase, c.multbarrels],
            )?;
        }
        if let Some(cap) = s.storm_drain_cap {
            batch.insert(
                "INSERT INTO storm_drains (struct_fid, stormdmax) VALUES (?1, ?2)",
                params![fid, cap],
            )?;
        }
        for (record, bridge) in s.bridges.iter().enumerate() {
            let halves = std::iter::once((1, &bridge.first))
                .chain(bridge.second.iter().map(|v| (2, v)));
            for (half, values) in halves {
                for (position, value) in values.iter().enumerate() {
                    batch.insert(
                        "INSERT INTO bridge_variables (struct_fid, record, half, position, value)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![fid, record as i64, half, position as i64, value],
                    )?;
                }
            }
        }
        for p in &s.bridge_xs {
            batch.insert(
                "INSERT INTO bridge_xs (struct_fid, xup, yup, yb) VALUES (?1, ?2, ?3, ?4)",
                params![fid, p.xup, p.yup, p.yb],
            )?;
        }
    }
    report.count("structures", data.structures.len() - rejected);
    if rejected > 0 {
        report.count("rejected", rejected);
    }
    Ok(())
}

fn read_curves(conn: &Connection, sql: &str, fid: i64) -> StoreResult<Vec<RatingCurve>> {
    query(conn, sql, [fid], |row| {
        Ok(RatingCurve {
            depth: real(row, 0)?,
            qcoef: real(row, 1)?,
            qexp: real(row, 2)?,
            acoef: real(row, 3)?,
            aexp: real(row, 4)?,
        })
    })
}

fn read_bridges(conn: &Connection, fid: i64) -> StoreResult<Vec<BridgeVariables>> {
    let rows = query(
        conn,
        "SELECT record, half, value FROM bridge_variables
         WHERE struct_fid = ?1 ORDER BY record, half, position",
        [fid],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, real(row, 2)?)),
    )?;
    let mut records: BTreeMap<i64, BridgeVariables> = BTreeMap::new();
    for (record, half, value) in rows {
        let entry = records.entry(record).or_insert_with(|| BridgeVariables {
            first: Vec::new(),
            second: None,
        });
        if half == 1 {
            entry.first.push(value);
        } else {
            entry.second.get_or_insert_with(Vec::new).push(value);
        }
    }
    Ok(records.into_values().collect())
}

pub(super) fn read_structures(conn: &Connection) -> StoreResult<Option<StructureData>> {
    let heads = query(
        conn,
        "SELECT fid, structname, ifporchan, icurvtable, inflonod, outflonod, inoutcont,
                headrefel, clength, cdiameter
         FROM struct ORDER BY fid",
        [],
        |row| {
            let mut s = Structure::new(
                row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                int(row, 4)?,
                int(row, 5)?,
            );
            s.ifporchan = int(row, 2)?;
            s.icurvtable = int(row, 3)?;
            s.inoutcont = int(row, 6)?;
            s.headrefel = real(row, 7)?;
            s.clength = real(row, 8)?;
            s.cdiameter = real(row, 9)?;
            Ok((row.get::<_, i64>(0)?, s))
        },
    )?;
    if heads.is_empty() {
        return Ok(None);
    }
    let mut data = StructureData::default();
    for (fid, mut s) in heads {
        s.rating_curves = read_curves(
            conn,
            "SELECT hdepexc, coefq, expq, coefa, expa FROM rat_curves WHERE struct_fid = ?1
             ORDER BY fid",
            fid,
        )?;
        s.repl_rating_curves = read_curves(
            conn,
            "SELECT repdep, rqcoef, rqexp, racoef, raexp FROM repl_rat_curves
             WHERE struct_fid = ?1 ORDER BY fid",
            fid,
        )?;
        s.rating_table = query(
            conn,
            "SELECT hdepth, qtable, atable FROM rat_table WHERE struct_fid = ?1 ORDER BY fid",
            [fid],
            |row| {
                Ok(RatingTableRow {
                    hdepth: real(row, 0)?,
                    qtable: real(row, 1)?,
                    atable: real(row, 2)?,
                })
            },
        )?;
        s.culverts = query(
            conn,
            "SELECT typec, typeen, culvertn, ke, cubase, multbarrels
             FROM culvert_equations WHERE struct_fid = ?1 ORDER BY fid",
            [fid],
            |row| {
                Ok(CulvertEquation {
                    typec: int(row, 0)?,
                    typeen: int(row, 1)?,
                    culvertn: real(row, 2)?,
                    ke: real(row, 3)?,
                    cubase: real(row, 4)?,
                    multbarrels: int(row, 5)?,
                })
            },
        )?;
        s.storm_drain_cap = conn
            .query_row(
                "SELECT stormdmax FROM storm_drains WHERE struct_fid = ?1 ORDER BY fid LIMIT 1",
                [fid],
                |row| real(row, 0),
            )
            .optional()?;
        s.bridges = read_bridges(conn, fid)?;
        s.bridge_xs = query(
            conn,
            "SELECT xup, yup, yb FROM bridge_xs WHERE struct_fid = ?1 ORDER BY fid",
            [fid],
            |row| {
                Ok(BridgeXsPoint {
                    xup: real(row, 0)?,
                    yup: real(row, 1)?,
                    yb: real(row, 2)?,
                })
            },
        )?;
        data.structures.push(s);
    }
    Ok(Some(data))
}

pub(super) fn write_streets(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &StreetData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    if let Some(g) = &data.global {
        batch.insert(
            "INSERT INTO street_general (strman, istrflo, strfno, depx, widst)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![g.strman, g.istrflo, g.strfno, g.depx, g.widst],
        )?;
    }
    for street in &data.streets {
        let str_fid = batch.insert("INSERT INTO streets (stname) VALUES (?1)", [&street.name])?;
        for seg in &street.segments {
            let (x, y) = grid.centroid(seg.grid)?;
            let mut dirs = Vec::with_capacity(seg.wings.len());
            for wing in &seg.wings {
                match Direction::from_code(wing.istdir) {
                    Some(dir) => dirs.push(dir),
                    None => report.warn(format!(
                        "street '{}' cell {}: direction {} is not 1..8, no glyph drawn",
                        street.name, seg.grid, wing.istdir
                    )),
                }
            }
            let seg_fid = batch.insert(
                "INSERT INTO street_seg (str_fid, grid_fid, depex, stman, elstr, geom)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    str_fid,
                    seg.grid,
                    seg.depex,
                    seg.stman,
                    seg.elstr,
                    multiline_wkt(&street_glyph(x, y, grid.cell_size(), &dirs)),
                ],
            )?;
            for wing in &seg.wings {
                batch.insert(
                    "INSERT INTO street_elems (seg_fid, istdir, widr) VALUES (?1, ?2, ?3)",
                    params![seg_fid, wing.istdir, wing.widr],
                )?;
            }
        }
    }
    Ok(())
}

pub(super) fn read_streets(conn: &Connection) -> StoreResult<Option<StreetData>> {
    let global = conn
        .query_row(
            "SELECT strman, istrflo, strfno, depx, widst FROM street_general ORDER BY fid LIMIT 1",
            [],
            |row| {
                Ok(StreetGlobal {
                    strman: real(row, 0)?,
                    istrflo: int(row, 1)?,
                    strfno: real(row, 2)?,
                    depx: real(row, 3)?,
                    widst: real(row, 4)?,
                })
            },
        )
        .optional()?;
    let heads = query(conn, "SELECT fid, stname FROM streets ORDER BY fid", [], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?))
    })?;
    let mut data = StreetData {
        global,
        streets: Vec::with_capacity(heads.len()),
    };
    for (str_fid, name) in heads {
        let segs = query(
            conn,
            "SELECT fid, grid_fid, depex, stman, elstr FROM street_seg WHERE str_fid = ?1
             ORDER BY fid",
            [str_fid],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    StreetSegment {
                        grid: row.get(1)?,
                        depex: real(row, 2)?,
                        stman: real(row, 3)?,
                        elstr: real(row, 4)?,
                        wings: Vec::new(),
                    },
                ))
            },
        )?;
        let mut street = Street {
            name: name.unwrap_or_default(),
            segments: Vec::with_capacity(segs.len()),
        };
        for (seg_fid, mut seg) in segs {
            seg.wings = query(
                conn,
                "SELECT istdir, widr FROM street_elems WHERE seg_fid = ?1 ORDER BY fid",
                [seg_fid],
                |row| {
                    Ok(StreetWing {
                        istdir: int(row, 0)?,
                        widr: real(row, 1)?,
                    })
                },
            )?;
            street.segments.push(seg);
        }
        data.streets.push(street);
    }
    if data.global.is_none() && data.streets.is_empty() {
        return Ok(None);
    }
    Ok(Some(data))
}
