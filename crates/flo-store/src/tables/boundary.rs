use flo_core::geo::{buffer_point, polygon_wkt};
use flo_core::CodecError;
use flo_model::{
    Inflow, InflowData, InflowKind, OutflowCell, OutflowData, QhParam, Reservoir, SeriesRow,
    TimeValue,
};
use rusqlite::{Connection, params};

use super::GridIndex;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{cont_value, int, query, real, set_cont};

/// Reservoir squares are shrunk so neighbouring reservoirs stay distinct.
const RESERVOIR_SHRINK: f64 = 0.95;

pub(super) fn write_inflow(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &InflowData,
) -> StoreResult<()> {
    if let Some(v) = data.ihourdaily {
        set_cont(batch.conn(), "IHOURDAILY", &v.to_string())?;
    }
    if let Some(v) = data.ideplt {
        set_cont(batch.conn(), "IDEPLT", &v.to_string())?;
    }
    for inflow in &data.inflows {
        let series_fid = if inflow.series.is_empty() {
            None
        } else {
            let fid = batch.insert("INSERT INTO inflow_time_series (name) VALUES (NULL)", [])?;
            for row in &inflow.series {
                batch.insert(
                    "INSERT INTO inflow_time_series_data (series_fid, time, value, value2)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![fid, row.time, row.value, row.value2],
                )?;
            }
            Some(fid)
        };
        let inflow_fid = batch.insert(
            "INSERT INTO inflow (ident, inoutfc, time_series_fid) VALUES (?1, ?2, ?3)",
            params![inflow.kind.tag(), inflow.inoutfc, series_fid],
        )?;
        batch.insert(
            "INSERT INTO inflow_cells (inflow_fid, grid_fid) VALUES (?1, ?2)",
            params![inflow_fid, inflow.grid],
        )?;
    }
    let radius = grid.cell_size() * RESERVOIR_SHRINK * 0.5;
    for res in &data.reservoirs {
        let (x, y) = grid.centroid(res.grid)?;
        batch.insert(
            "INSERT INTO reservoirs (grid_fid, wsel, n_value, use_n_value, tailings, geom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                res.grid,
                res.wsel,
                res.n_value,
                res.use_n_value,
                res.tailings,
                polygon_wkt(&buffer_point(x, y, radius)),
            ],
        )?;
    }
    Ok(())
}

pub(super) fn read_inflow(conn: &Connection) -> StoreResult<Option<InflowData>> {
    let heads = query(
        conn,
        "SELECT i.ident, i.inoutfc, i.time_series_fid, c.grid_fid
         FROM inflow i JOIN inflow_cells c ON c.inflow_fid = i.fid
         ORDER BY i.fid, c.fid",
        [],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                int(row, 1)?,
                row.get::<_, Option<i64>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        },
    )?;
    let mut inflows = Vec::with_capacity(heads.len());
    for (ident, inoutfc, series_fid, grid) in heads {
        let kind = InflowKind::from_tag(&ident).ok_or_else(|| {
            CodecError::domain(format!("inflow at grid {} has unknown type '{}'", grid, ident))
        })?;
        let series = match series_fid {
            Some(fid) => query(
                conn,
                "SELECT time, value, value2 FROM inflow_time_series_data
                 WHERE series_fid = ?1 ORDER BY fid",
                [fid],
                |row| {
                    Ok(SeriesRow {
                        time: real(row, 0)?,
                        value: real(row, 1)?,
                        value2: row.get(2)?,
                    })
                },
            )?,
            None => Vec::new(),
        };
        inflows.push(Inflow {
            kind,
            inoutfc,
            grid,
            series,
        });
    }
    let reservoirs = query(
        conn,
        "SELECT grid_fid, wsel, n_value, use_n_value, tailings FROM reservoirs ORDER BY fid",
        [],
        |row| {
            Ok(Reservoir {
                grid: row.get(0)?,
                wsel: real(row, 1)?,
                n_value: real(row, 2)?,
                use_n_value: row.get(3)?,
                tailings: real(row, 4)?,
            })
        },
    )?;
    let data = InflowData {
        ihourdaily: cont_int(conn, "IHOURDAILY")?,
        ideplt: cont_int(conn, "IDEPLT")?,
        inflows,
        reservoirs,
    };
    Ok((!data.is_empty()).then_some(data))
}

pub(super) fn cont_int(conn: &Connection, name: &str) -> StoreResult<Option<i64>> {
    Ok(cont_value(conn, name)?.as_deref().and_then(flo_core::parse_int))
}

fn insert_outflow_series(batch: &mut Batch<'_>, rows: &[TimeValue]) -> StoreResult<Option<i64>> {
    if rows.is_empty() {
        return Ok(None);
    }
    let fid = batch.insert("INSERT INTO outflow_time_series (name) VALUES (NULL)", [])?;
    for row in rows {
        batch.insert(
            "INSERT INTO outflow_time_series_data (series_fid, time, value) VALUES (?1, ?2, ?3)",
            params![fid, row.time, row.value],
        )?;
    }
    Ok(Some(fid))
}

pub(super) fn write_outflow(batch: &mut Batch<'_>, data: &OutflowData) -> StoreResult<()> {
    for cell in &data.cells {
        let chan_tser = insert_outflow_series(batch, &cell.chan_tser)?;
        let fp_tser = insert_outflow_series(batch, &cell.fp_tser)?;
        let qhpar = if cell.qh_params.is_empty() {
            None
        } else {
            let fid = batch.insert("INSERT INTO qh_params DEFAULT VALUES", [])?;
            for p in &cell.qh_params {
                batch.insert(
                    "INSERT INTO qh_params_data (params_fid, hmax, coef, exponent)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![fid, p.hmax, p.coef, p.exponent],
                )?;
            }
            Some(fid)
        };
        let qhtab = if cell.qh_table.is_empty() {
            None
        } else {
            let fid = batch.insert("INSERT INTO qh_table DEFAULT VALUES", [])?;
            for [depth, q] in &cell.qh_table {
                batch.insert(
                    "INSERT INTO qh_table_data (table_fid, depth, q) VALUES (?1, ?2, ?3)",
                    params![fid, depth, q],
                )?;
            }
            Some(fid)
        };
        let outflow_fid = batch.insert(
            "INSERT INTO outflow (chan_out, fp_out, hydro_out, chan_tser_fid, chan_qhpar_fid,
                                  chan_qhtab_fid, fp_tser_fid, type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                cell.chan_out,
                cell.fp_out,
                cell.hydro_out,
                chan_tser,
                qhpar,
                qhtab,
                fp_tser,
                cell.outflow_type(),
            ],
        )?;
        batch.insert(
            "INSERT INTO outflow_cells (outflow_fid, grid_fid) VALUES (?1, ?2)",
            params![outflow_fid, cell.grid],
        )?;
    }
    Ok(())
}

fn read_outflow_series(conn: &Connection, fid: Option<i64>) -> StoreResult<Vec<TimeValue>> {
    match fid {
        Some(fid) => query(
            conn,
            "SELECT time, value FROM outflow_time_series_data WHERE series_fid = ?1 ORDER BY fid",
            [fid],
            |row| Ok(TimeValue::new(real(row, 0)?, real(row, 1)?)),
        ),
        None => Ok(Vec::new()),
    }
}

pub(super) fn read_outflow(conn: &Connection) -> StoreResult<Option<OutflowData>> {
    let heads = query(
        conn,
        "SELECT c.grid_fid, o.chan_out, o.fp_out, o.hydro_out, o.chan_tser_fid,
                o.chan_qhpar_fid, o.chan_qhtab_fid, o.fp_tser_fid
         FROM outflow o JOIN outflow_cells c ON c.outflow_fid = o.fid
         ORDER BY o.fid, c.fid",
        [],
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                [int(row, 1)?, int(row, 2)?, int(row, 3)?],
                [
                    row.get::<_, Option<i64>>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                    row.get::<_, Option<i64>>(6)?,
                    row.get::<_, Option<i64>>(7)?,
                ],
            ))
        },
    )?;
    if heads.is_empty() {
        return Ok(None);
    }
    let mut data = OutflowData::default();
    for (grid, [chan_out, fp_out, hydro_out], [chan_tser, qhpar, qhtab, fp_tser]) in heads {
        let mut cell = OutflowCell::new(grid);
        cell.chan_out = chan_out;
        cell.fp_out = fp_out;
        cell.hydro_out = hydro_out;
        cell.chan_tser = read_outflow_series(conn, chan_tser)?;
        cell.fp_tser = read_outflow_series(conn, fp_tser)?;
        if let Some(fid) = qhpar {
            cell.qh_params = query(
                conn,
                "SELECT hmax, coef, exponent FROM qh_params_data WHERE params_fid = ?1
                 ORDER BY fid",
                [fid],
                |row| {
                    Ok(QhParam {
                        hmax: real(row, 0)?,
                        coef: real(row, 1)?,
                        exponent: real(row, 2)?,
                    })
                },
            )?;
        }
        if let Some(fid) = qhtab {
            cell.qh_table = query(
                conn,
                "SELECT depth, q FROM qh_table_data WHERE table_fid = ?1 ORDER BY fid",
                [fid],
                |row| Ok([real(row, 0)?, real(row, 1)?]),
            )?;
        }
        data.cells.push(cell);
    }
    Ok(Some(data))
}
