use flo_core::ComponentReport;
use flo_model::{
    ArfData, BlockedCell, MudArea, MudGlobal, MultCell, MultData, MultGlobal, PartialBlock,
    SedData, SedGlobal, SedGroup, SedGroupCell, SedSupply, SimpleMult,
};
use rusqlite::{Connection, OptionalExtension, params};

use super::boundary::cont_int;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real, set_cont};

/// An ARF of one means the cell is fully blocked whatever table it came from.
fn is_total(arf: f64) -> bool {
    arf >= 1.0
}

pub(super) fn write_arf(batch: &mut Batch<'_>, data: &ArfData) -> StoreResult<()> {
    if let Some(mode) = data.iarfblockmod {
        set_cont(batch.conn(), "IARFBLOCKMOD", &mode.to_string())?;
    }
    for cell in &data.totally {
        batch.insert(
            "INSERT INTO blocked_cells_tot (grid_fid, collapse) VALUES (?1, ?2)",
            params![cell.grid, cell.collapse],
        )?;
    }
    for cell in &data.partially {
        if is_total(cell.arf) {
            batch.insert(
                "INSERT INTO blocked_cells_tot (grid_fid, collapse) VALUES (?1, ?2)",
                params![cell.grid, cell.collapse],
            )?;
            continue;
        }
        let w = cell.wrf;
        batch.insert(
            "INSERT INTO blocked_cells
                (grid_fid, collapse, arf, wrf1, wrf2, wrf3, wrf4, wrf5, wrf6, wrf7, wrf8)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                cell.grid,
                cell.collapse,
                cell.arf,
                w[0],
                w[1],
                w[2],
                w[3],
                w[4],
                w[5],
                w[6],
                w[7]
            ],
        )?;
    }
    Ok(())
}

pub(super) fn read_arf(conn: &Connection) -> StoreResult<Option<ArfData>> {
    let totally = query(
        conn,
        "SELECT grid_fid, collapse FROM blocked_cells_tot ORDER BY fid",
        [],
        |row| {
            Ok(BlockedCell {
                grid: row.get(0)?,
                collapse: row.get(1)?,
            })
        },
    )?;
    let partially = query(
        conn,
        "SELECT grid_fid, collapse, arf, wrf1, wrf2, wrf3, wrf4, wrf5, wrf6, wrf7, wrf8
         FROM blocked_cells ORDER BY fid",
        [],
        |row| {
            let mut wrf = [0.0; 8];
            for (i, slot) in wrf.iter_mut().enumerate() {
                *slot = real(row, 3 + i)?;
            }
            Ok(PartialBlock {
                grid: row.get(0)?,
                collapse: row.get(1)?,
                arf: real(row, 2)?,
                wrf,
            })
        },
    )?;
    let data = ArfData {
        iarfblockmod: cont_int(conn, "IARFBLOCKMOD")?,
        totally,
        partially,
    };
    if data.totally.is_empty() && data.partially.is_empty() {
        return Ok(None);
    }
    Ok(Some(data))
}

pub(super) fn write_mult(
    batch: &mut Batch<'_>,
    data: &MultData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    if data.global.is_some() || data.simple.is_some() {
        let g = data.global.as_ref();
        batch.insert(
            "INSERT INTO mult (wmc, wdrall, dmall, nodchnsall, xnmultall, sslopemin, sslopemax,
                               avuld50, simple_n)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                g.map(|g| g.wmc),
                g.map(|g| g.wdrall),
                g.map(|g| g.dmall),
                g.map(|g| g.nodchnsall),
                g.map(|g| g.xnmultall),
                g.map(|g| g.sslopemin),
                g.map(|g| g.sslopemax),
                g.map(|g| g.avuld50),
                data.simple.as_ref().map(|s| s.simple_n),
            ],
        )?;
    }
    for c in &data.cells {
        batch.insert(
            "INSERT INTO mult_cells (grid_fid, wdr, dm, nodchns, xnmult)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![c.grid, c.wdr, c.dm, c.nodchns, c.xnmult],
        )?;
    }
    let (kept, dropped) = data.simple_cells_without_repeats();
    for grid in &kept {
        batch.insert("INSERT INTO simple_mult_cells (grid_fid) VALUES (?1)", [grid])?;
    }
    if !dropped.is_empty() {
        report.warn(format!(
            "{} simplified multiple channel cells are also full multiple channel cells \
             and were dropped: {:?}",
            dropped.len(),
            dropped
        ));
        report.count("simple_mult_dropped", dropped.len());
    }
    Ok(())
}

pub(super) fn read_mult(conn: &Connection) -> StoreResult<Option<MultData>> {
    let head = conn
        .query_row(
            "SELECT wmc, wdrall, dmall, nodchnsall, xnmultall, sslopemin, sslopemax, avuld50,
                    simple_n
             FROM mult ORDER BY fid LIMIT 1",
            [],
            |row| {
                let global = match row.get::<_, Option<f64>>(0)? {
                    Some(wmc) => Some(MultGlobal {
                        wmc,
                        wdrall: real(row, 1)?,
                        dmall: real(row, 2)?,
                        nodchnsall: real(row, 3)?,
                        xnmultall: real(row, 4)?,
                        sslopemin: real(row, 5)?,
                        sslopemax: real(row, 6)?,
                        avuld50: real(row, 7)?,
                    }),
                    None => None,
                };
                Ok((global, row.get::<_, Option<f64>>(8)?))
            },
        )
        .optional()?;
    let (global, simple_n) = head.unwrap_or((None, None));
    let cells = query(
        conn,
        "SELECT grid_fid, wdr, dm, nodchns, xnmult FROM mult_cells ORDER BY fid",
        [],
        |row| {
            Ok(MultCell {
                grid: row.get(0)?,
                wdr: real(row, 1)?,
                dm: real(row, 2)?,
                nodchns: real(row, 3)?,
                xnmult: real(row, 4)?,
            })
        },
    )?;
    let simple_cells = query(
        conn,
        "SELECT grid_fid FROM simple_mult_cells ORDER BY fid",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    let simple = match simple_n {
        Some(simple_n) => Some(SimpleMult {
            simple_n,
            cells: simple_cells,
        }),
        None if !simple_cells.is_empty() => Some(SimpleMult {
            simple_n: 0.0,
            cells: simple_cells,
        }),
        None => None,
    };
    let data = MultData {
        global,
        cells,
        simple,
    };
    if data.global.is_none() && data.cells.is_empty() && data.simple.is_none() {
        return Ok(None);
    }
    Ok(Some(data))
}

pub(super) fn write_sed(batch: &mut Batch<'_>, data: &SedData) -> StoreResult<()> {
    if let Some(m) = &data.mud {
        batch.insert(
            "INSERT INTO mud (va, vb, ysa, ysb, sgsm, xkx) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![m.va, m.vb, m.ysa, m.ysb, m.sgsm, m.xkx],
        )?;
    }
    if let Some(s) = &data.sed {
        batch.insert(
            "INSERT INTO sed (isedeqg, isedsizefrac, dfifty, sgrad, sgst, dryspwt, cvfg,
                              isedsupply, isedisplay, scourdep)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                s.isedeqg,
                s.isedsizefrac,
                s.dfifty,
                s.sgrad,
                s.sgst,
                s.dryspwt,
                s.cvfg,
                s.isedsupply,
                s.isedisplay,
                s.scourdep,
            ],
        )?;
    }
    for g in &data.groups {
        let fid = batch.insert(
            "INSERT INTO sed_groups (isedeqi, bedthick, cvfi) VALUES (?1, ?2, ?3)",
            params![g.isedeqi, g.bedthick, g.cvfi],
        )?;
        for [sediam, sedpercent] in &g.fractions {
            batch.insert(
                "INSERT INTO sed_group_frac_data (group_fid, sediam, sedpercent)
                 VALUES (?1, ?2, ?3)",
                params![fid, sediam, sedpercent],
            )?;
        }
    }
    for a in &data.mud_areas {
        batch.insert(
            "INSERT INTO mud_areas (grid_fid, debrisv) VALUES (?1, ?2)",
            params![a.grid, a.debrisv],
        )?;
    }
    for grid in &data.rigid_cells {
        batch.insert("INSERT INTO sed_rigid_cells (grid_fid) VALUES (?1)", [grid])?;
    }
    for s in &data.supply {
        let fid = batch.insert(
            "INSERT INTO sed_supply_areas (grid_fid, isedcfp, ased, bsed) VALUES (?1, ?2, ?3, ?4)",
            params![s.grid, s.isedcfp, s.ased, s.bsed],
        )?;
        for [ssediam, ssedpercent] in &s.fractions {
            batch.insert(
                "INSERT INTO sed_supply_frac_data (supply_fid, ssediam, ssedpercent)
                 VALUES (?1, ?2, ?3)",
                params![fid, ssediam, ssedpercent],
            )?;
        }
    }
    for c in &data.group_cells {
        batch.insert(
            "INSERT INTO sed_group_cells (grid_fid, group_number) VALUES (?1, ?2)",
            params![c.grid, c.group],
        )?;
    }
    Ok(())
}

fn fractions(conn: &Connection, sql: &str, fid: i64) -> StoreResult<Vec<[f64; 2]>> {
    query(conn, sql, [fid], |row| Ok([real(row, 0)?, real(row, 1)?]))
}

pub(super) fn read_sed(conn: &Connection) -> StoreResult<Option<SedData>> {
    let mud = conn
        .query_row(
            "SELECT va, vb, ysa, ysb, sgsm, xkx FROM mud ORDER BY fid LIMIT 1",
            [],
            |row| {
                Ok(MudGlobal {
                    va: real(row, 0)?,
                    vb: real(row, 1)?,
                    ysa: real(row, 2)?,
                    ysb: real(row, 3)?,
                    sgsm: real(row, 4)?,
                    xkx: real(row, 5)?,
                })
            },
        )
        .optional()?;
    let sed = conn
        .query_row(
            "SELECT isedeqg, isedsizefrac, dfifty, sgrad, sgst, dryspwt, cvfg, isedsupply,
                    isedisplay, scourdep
             FROM sed ORDER BY fid LIMIT 1",
            [],
            |row| {
                Ok(SedGlobal {
                    isedeqg: int(row, 0)?,
                    isedsizefrac: int(row, 1)?,
                    dfifty: real(row, 2)?,
                    sgrad: real(row, 3)?,
                    sgst: real(row, 4)?,
                    dryspwt: real(row, 5)?,
                    cvfg: real(row, 6)?,
                    isedsupply: int(row, 7)?,
                    isedisplay: int(row, 8)?,
                    scourdep: real(row, 9)?,
                })
            },
        )
        .optional()?;
    let group_heads = query(
        conn,
        "SELECT fid, isedeqi, bedthick, cvfi FROM sed_groups ORDER BY fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                SedGroup {
                    isedeqi: int(row, 1)?,
                    bedthick: real(row, 2)?,
                    cvfi: real(row, 3)?,
                    fractions: Vec::new(),
                },
            ))
        },
    )?;
    let mut groups = Vec::with_capacity(group_heads.len());
    for (fid, mut group) in group_heads {
        group.fractions = fractions(
            conn,
            "SELECT sediam, sedpercent FROM sed_group_frac_data WHERE group_fid = ?1 ORDER BY fid",
            fid,
        )?;
        groups.push(group);
    }
    let supply_heads = query(
        conn,
        "SELECT fid, grid_fid, isedcfp, ased, bsed FROM sed_supply_areas ORDER BY fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                SedSupply {
                    grid: row.get(1)?,
                    isedcfp: int(row, 2)?,
                    ased: real(row, 3)?,
                    bsed: real(row, 4)?,
                    fractions: Vec::new(),
                },
            ))
        },
    )?;
    let mut supply = Vec::with_capacity(supply_heads.len());
    for (fid, mut s) in supply_heads {
        s.fractions = fractions(
            conn,
            "SELECT ssediam, ssedpercent FROM sed_supply_frac_data WHERE supply_fid = ?1
             ORDER BY fid",
            fid,
        )?;
        supply.push(s);
    }
    let data = SedData {
        mud,
        sed,
        groups,
        mud_areas: query(
            conn,
            "SELECT grid_fid, debrisv FROM mud_areas ORDER BY fid",
            [],
            |row| {
                Ok(MudArea {
                    grid: row.get(0)?,
                    debrisv: row.get(1)?,
                })
            },
        )?,
        rigid_cells: query(
            conn,
            "SELECT grid_fid FROM sed_rigid_cells ORDER BY fid",
            [],
            |row| row.get::<_, i64>(0),
        )?,
        supply,
        group_cells: query(
            conn,
            "SELECT grid_fid, group_number FROM sed_group_cells ORDER BY fid",
            [],
            |row| {
                Ok(SedGroupCell {
                    grid: row.get(0)?,
                    group: int(row, 1)?,
                })
            },
        )?,
    };
    Ok((!data.is_empty()).then_some(data))
}
