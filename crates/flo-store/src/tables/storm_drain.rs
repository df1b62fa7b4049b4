use flo_core::geo::{point, point_wkt};
use flo_core::{CodecError, ComponentReport, SchemaErrorKind};
use flo_model::{
    Inlet, InletData, InpSection, Outfall, OutfallData, RatingTableData, SdCulvert, SdRatingBlock,
    SdRatingTable, SwmmInp,
};
use rusqlite::{Connection, OptionalExtension, params};

use super::GridIndex;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real};

pub(super) fn write_inlets(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &InletData,
) -> StoreResult<()> {
    for inlet in &data.inlets {
        let (x, y) = grid.centroid(inlet.grid)?;
        batch.insert(
            "INSERT INTO swmmflo (swmm_iden, grid_fid, name, intype, swmm_length, swmm_width,
                                  swmm_height, swmm_coeff, swmm_feature, curbheight, geom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                inlet.tag,
                inlet.grid,
                inlet.name,
                inlet.intype,
                inlet.length,
                inlet.width,
                inlet.height,
                inlet.coeff,
                inlet.feature,
                inlet.curbheight,
                point_wkt(&point(x, y)),
            ],
        )?;
    }
    Ok(())
}

pub(super) fn read_inlets(conn: &Connection) -> StoreResult<Option<InletData>> {
    let inlets = query(
        conn,
        "SELECT swmm_iden, grid_fid, name, intype, swmm_length, swmm_width, swmm_height,
                swmm_coeff, swmm_feature, curbheight
         FROM swmmflo ORDER BY fid",
        [],
        |row| {
            Ok(Inlet {
                tag: row
                    .get::<_, Option<String>>(0)?
                    .unwrap_or_else(|| "D".to_string()),
                grid: row.get(1)?,
                name: row.get(2)?,
                intype: int(row, 3)?,
                length: real(row, 4)?,
                width: real(row, 5)?,
                height: real(row, 6)?,
                coeff: real(row, 7)?,
                feature: int(row, 8)?,
                curbheight: real(row, 9)?,
            })
        },
    )?;
    Ok((!inlets.is_empty()).then_some(InletData { inlets }))
}

/// Binds every block to the inlet of the same name; an unbound name is a schema fault.
pub(super) fn write_rating_tables(
    batch: &mut Batch<'_>,
    data: &RatingTableData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    for (order, block) in data.blocks.iter().enumerate() {
        let inlet_fid = batch
            .conn()
            .query_row(
                "SELECT fid FROM swmmflo WHERE name = ?1 ORDER BY fid LIMIT 1",
                [block.name()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or_else(|| {
                CodecError::schema(
                    "SWMMFLORT.DAT",
                    0,
                    SchemaErrorKind::InvalidReference {
                        what: format!("rating table '{}' is not bound to any inlet", block.name()),
                    },
                )
            })?;
        match block {
            SdRatingBlock::Table(t) => {
                if t.rows.is_empty() {
                    report.warn(format!("rating table '{}' has no depth/discharge rows", t.name));
                }
                let fid = batch.insert(
                    "INSERT INTO swmmflort (block_order, grid_fid, name, inlet_fid)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![order as i64, t.grid, t.name, inlet_fid],
                )?;
                for [depth, q] in &t.rows {
                    batch.insert(
                        "INSERT INTO swmmflort_data (swmm_rt_fid, depth, q) VALUES (?1, ?2, ?3)",
                        params![fid, depth, q],
                    )?;
                }
            }
            SdRatingBlock::Culvert(c) => {
                batch.insert(
                    "INSERT INTO swmmflo_culvert (block_order, grid_fid, name, inlet_fid, cdiameter,
                                                  typec, typeen, cubase, multbarrels)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        order as i64,
                        c.grid,
                        c.name,
                        inlet_fid,
                        c.cdiameter,
                        c.typec,
                        c.typeen,
                        c.cubase,
                        c.multbarrels,
                    ],
                )?;
            }
        }
    }
    Ok(())
}

pub(super) fn read_rating_tables(conn: &Connection) -> StoreResult<Option<RatingTableData>> {
    let tables = query(
        conn,
        "SELECT fid, block_order, grid_fid, name FROM swmmflort ORDER BY block_order",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    )?;
    let mut blocks: Vec<(i64, SdRatingBlock)> = Vec::new();
    for (fid, order, grid, name) in tables {
        let rows = query(
            conn,
            "SELECT depth, q FROM swmmflort_data WHERE swmm_rt_fid = ?1 ORDER BY fid",
            [fid],
            |row| Ok([real(row, 0)?, real(row, 1)?]),
        )?;
        blocks.push((order, SdRatingBlock::Table(SdRatingTable { grid, name, rows })));
    }
    let culverts = query(
        conn,
        "SELECT block_order, grid_fid, name, cdiameter, typec, typeen, cubase, multbarrels
         FROM swmmflo_culvert ORDER BY block_order",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                SdRatingBlock::Culvert(SdCulvert {
                    grid: row.get(1)?,
                    name: row.get(2)?,
                    cdiameter: real(row, 3)?,
                    typec: int(row, 4)?,
                    typeen: int(row, 5)?,
                    cubase: real(row, 6)?,
                    multbarrels: int(row, 7)?,
                }),
            ))
        },
    )?;
    blocks.extend(culverts);
    if blocks.is_empty() {
        return Ok(None);
    }
    blocks.sort_by_key(|(order, _)| *order);
    Ok(Some(RatingTableData {
        blocks: blocks.into_iter().map(|(_, b)| b).collect(),
    }))
}

pub(super) fn write_outfalls(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &OutfallData,
) -> StoreResult<()> {
    for o in &data.outfalls {
        let (x, y) = grid.centroid(o.grid)?;
        batch.insert(
            "INSERT INTO swmmoutf (grid_fid, name, outf_flo, geom) VALUES (?1, ?2, ?3, ?4)",
            params![o.grid, o.name, o.outf_flo, point_wkt(&point(x, y))],
        )?;
    }
    Ok(())
}

pub(super) fn read_outfalls(conn: &Connection) -> StoreResult<Option<OutfallData>> {
    let outfalls = query(
        conn,
        "SELECT name, grid_fid, outf_flo FROM swmmoutf ORDER BY fid",
        [],
        |row| {
            Ok(Outfall {
                name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                grid: row.get(1)?,
                outf_flo: int(row, 2)?,
            })
        },
    )?;
    Ok((!outfalls.is_empty()).then_some(OutfallData { outfalls }))
}

pub(super) fn write_swmm_inp(batch: &mut Batch<'_>, data: &SwmmInp) -> StoreResult<()> {
    for section in &data.sections {
        let fid = batch.insert(
            "INSERT INTO swmm_inp_sections (name) VALUES (?1)",
            [&section.name],
        )?;
        for line in &section.lines {
            batch.insert(
                "INSERT INTO swmm_inp_lines (section_fid, line) VALUES (?1, ?2)",
                params![fid, line],
            )?;
        }
    }
    Ok(())
}

pub(super) fn read_swmm_inp(conn: &Connection) -> StoreResult<Option<SwmmInp>> {
    let heads = query(
        conn,
        "SELECT fid, name FROM swmm_inp_sections ORDER BY fid",
        [],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
    )?;
    if heads.is_empty() {
        return Ok(None);
    }
    let mut inp = SwmmInp::default();
    for (fid, name) in heads {
        let lines = query(
            conn,
            "SELECT line FROM swmm_inp_lines WHERE section_fid = ?1 ORDER BY fid",
            [fid],
            |row| row.get::<_, String>(0),
        )?;
        inp.sections.push(InpSection { name, lines });
    }
    Ok(Some(inp))
}
