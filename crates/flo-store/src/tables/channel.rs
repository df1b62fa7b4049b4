use flo_core::geo::{line_wkt, polyline};
use flo_core::{CodecError, ComponentReport};
use flo_model::{
    ChannelData, ChannelElement, ChannelSegment, ChannelShape, ChannelWse, Confluence,
    RectShape, TrapShape, VarShape, XSection,
};
use rusqlite::{Connection, params};

use super::GridIndex;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real};

pub(super) fn write_channels(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &ChannelData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    for seg in &data.segments {
        let vertices = seg
            .elements
            .iter()
            .map(|e| grid.centroid(e.grid))
            .collect::<StoreResult<Vec<_>>>()?;
        let seg_fid = batch.insert(
            "INSERT INTO chan (depinitial, froudc, roughadj, isedn, geom)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                seg.depinitial,
                seg.froudc,
                seg.roughadj,
                seg.isedn,
                line_wkt(&polyline(&vertices)),
            ],
        )?;
        for (idx, el) in seg.elements.iter().enumerate() {
            let elem_fid = batch.insert(
                "INSERT INTO chan_elems (seg_fid, nr_in_seg, grid_fid, rbankgrid, fcn, xlen, type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    seg_fid,
                    idx as i64 + 1,
                    el.grid,
                    el.rbankgrid,
                    el.fcn,
                    el.xlen,
                    el.shape.code(),
                ],
            )?;
            write_shape(batch, elem_fid, &el.shape)?;
        }
        for c in &seg.confluences {
            batch.insert(
                "INSERT INTO chan_confluences (seg_fid, tributary, main) VALUES (?1, ?2, ?3)",
                params![seg_fid, c.tributary, c.main],
            )?;
        }
        for grid_fid in &seg.no_exchange {
            batch.insert(
                "INSERT INTO noexchange_chan_cells (seg_fid, grid_fid) VALUES (?1, ?2)",
                params![seg_fid, grid_fid],
            )?;
        }
        for w in &seg.wse {
            batch.insert(
                "INSERT INTO chan_wsel (seg_fid, istart, wselstart, iend, wselend)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![seg_fid, w.istart, w.wselstart, w.iend, w.wselend],
            )?;
        }
    }
    for xs in &data.xsections {
        let xsec_fid = batch.insert(
            "INSERT INTO user_xsections (nxsecnum, name) VALUES (?1, ?2)",
            params![xs.nxsecnum, xs.name],
        )?;
        for [xi, yi] in &xs.points {
            batch.insert(
                "INSERT INTO xsec_n_data (xsec_fid, xi, yi) VALUES (?1, ?2, ?3)",
                params![xsec_fid, xi, yi],
            )?;
        }
    }
    report.count("elements", data.element_count());
    Ok(())
}

fn write_shape(batch: &mut Batch<'_>, elem_fid: i64, shape: &ChannelShape) -> StoreResult<()> {
    match shape {
        ChannelShape::R(r) => batch.insert(
            "INSERT INTO chan_r (elem_fid, bankell, bankelr, fcw, fcd) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![elem_fid, r.bankell, r.bankelr, r.fcw, r.fcd],
        ),
        ChannelShape::V(v) => {
            let [a1, a2, b1, b2, c1, c2] = v.lower;
            let [a11, a22, b11, b22, c11, c22] = v.upper;
            batch.insert(
                "INSERT INTO chan_v (elem_fid, fcd, a1, a2, b1, b2, c1, c2, excdep,
                                     a11, a22, b11, b22, c11, c22, bankell, bankelr)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                         ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    elem_fid, v.fcd, a1, a2, b1, b2, c1, c2, v.excdep, a11, a22, b11, b22, c11,
                    c22, v.bankell, v.bankelr,
                ],
            )
        }
        ChannelShape::T(t) => batch.insert(
            "INSERT INTO chan_t (elem_fid, bankell, bankelr, fcw, fcd, zl, zr)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![elem_fid, t.bankell, t.bankelr, t.fcw, t.fcd, t.zl, t.zr],
        ),
        ChannelShape::N { nxsecnum } => batch.insert(
            "INSERT INTO chan_n (elem_fid, nxsecnum) VALUES (?1, ?2)",
            params![elem_fid, nxsecnum],
        ),
    }?;
    Ok(())
}

fn read_shape(conn: &Connection, elem_fid: i64, code: &str) -> StoreResult<ChannelShape> {
    let missing =
        || CodecError::domain(format!("channel element {} has no {} row", elem_fid, code));
    let shape = match code {
        "R" => query(
            conn,
            "SELECT bankell, bankelr, fcw, fcd FROM chan_r WHERE elem_fid = ?1",
            [elem_fid],
            |row| {
                Ok(ChannelShape::R(RectShape {
                    bankell: real(row, 0)?,
                    bankelr: real(row, 1)?,
                    fcw: real(row, 2)?,
                    fcd: real(row, 3)?,
                }))
            },
        )?,
        "V" => query(
            conn,
            "SELECT fcd, a1, a2, b1, b2, c1, c2, excdep, a11, a22, b11, b22, c11, c22,
                    bankell, bankelr
             FROM chan_v WHERE elem_fid = ?1",
            [elem_fid],
            |row| {
                let mut v = [0.0; 16];
                for (i, slot) in v.iter_mut().enumerate() {
                    *slot = real(row, i)?;
                }
                Ok(ChannelShape::V(VarShape {
                    fcd: v[0],
                    lower: [v[1], v[2], v[3], v[4], v[5], v[6]],
                    excdep: v[7],
                    upper: [v[8], v[9], v[10], v[11], v[12], v[13]],
                    bankell: v[14],
                    bankelr: v[15],
                }))
            },
        )?,
        "T" => query(
            conn,
            "SELECT bankell, bankelr, fcw, fcd, zl, zr FROM chan_t WHERE elem_fid = ?1",
            [elem_fid],
            |row| {
                Ok(ChannelShape::T(TrapShape {
                    bankell: real(row, 0)?,
                    bankelr: real(row, 1)?,
                    fcw: real(row, 2)?,
                    fcd: real(row, 3)?,
                    zl: real(row, 4)?,
                    zr: real(row, 5)?,
                }))
            },
        )?,
        "N" => query(
            conn,
            "SELECT nxsecnum FROM chan_n WHERE elem_fid = ?1",
            [elem_fid],
            |row| Ok(ChannelShape::N { nxsecnum: int(row, 0)? }),
        )?,
        other => {
            return Err(CodecError::domain(format!(
                "channel element {} has unknown shape '{}'",
                elem_fid, other
            ))
            .into());
        }
    };
    shape.into_iter().next().ok_or_else(|| missing().into())
}

pub(super) fn read_channels(conn: &Connection) -> StoreResult<Option<ChannelData>> {
    let heads = query(
        conn,
        "SELECT fid, depinitial, froudc, roughadj, isedn FROM chan ORDER BY fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                ChannelSegment::new(real(row, 1)?, real(row, 2)?, real(row, 3)?, row.get(4)?),
            ))
        },
    )?;
    let mut data = ChannelData::default();
    for (seg_fid, mut seg) in heads {
        let elems = query(
            conn,
            "SELECT fid, grid_fid, rbankgrid, fcn, xlen, type FROM chan_elems
             WHERE seg_fid = ?1 ORDER BY nr_in_seg",
            [seg_fid],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    int(row, 2)?,
                    real(row, 3)?,
                    real(row, 4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )?;
        for (elem_fid, grid, rbankgrid, fcn, xlen, code) in elems {
            seg.elements.push(ChannelElement {
                grid,
                rbankgrid,
                fcn,
                xlen,
                shape: read_shape(conn, elem_fid, &code)?,
            });
        }
        seg.confluences = query(
            conn,
            "SELECT tributary, main FROM chan_confluences WHERE seg_fid = ?1 ORDER BY fid",
            [seg_fid],
            |row| {
                Ok(Confluence {
                    tributary: int(row, 0)?,
                    main: int(row, 1)?,
                })
            },
        )?;
        seg.no_exchange = query(
            conn,
            "SELECT grid_fid FROM noexchange_chan_cells WHERE seg_fid = ?1 ORDER BY fid",
            [seg_fid],
            |row| int(row, 0),
        )?;
        seg.wse = query(
            conn,
            "SELECT istart, wselstart, iend, wselend FROM chan_wsel WHERE seg_fid = ?1
             ORDER BY fid",
            [seg_fid],
            |row| {
                Ok(ChannelWse {
                    istart: int(row, 0)?,
                    wselstart: real(row, 1)?,
                    iend: int(row, 2)?,
                    wselend: real(row, 3)?,
                })
            },
        )?;
        data.segments.push(seg);
    }
    let sections = query(
        conn,
        "SELECT fid, nxsecnum, name FROM user_xsections ORDER BY nxsecnum, fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        },
    )?;
    for (fid, nxsecnum, name) in sections {
        let points = query(
            conn,
            "SELECT xi, yi FROM xsec_n_data WHERE xsec_fid = ?1 ORDER BY fid",
            [fid],
            |row| Ok([real(row, 0)?, real(row, 1)?]),
        )?;
        data.xsections.push(XSection {
            nxsecnum,
            name: name.unwrap_or_default(),
            points,
        });
    }
    Ok((!data.is_empty()).then_some(data))
}
