use flo_core::geo::{Direction, compass_segment, line_wkt, polyline};
use flo_model::{
    CellArrayData, CellArrayKind, CellValue, CellValues, FpXsec, FpXsecData, GutterCell, GutterData,
    GutterGlobal, WstimeCell, WstimeData, WsurfData,
};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::GridIndex;
use super::boundary::cont_int;
use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{int, query, real, set_cont};

pub(super) fn write_fpxsec(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &FpXsecData,
) -> StoreResult<()> {
    set_cont(batch.conn(), "NXPRT", &data.nxprt.to_string())?;
    for section in &data.sections {
        let vertices = section
            .cells
            .iter()
            .map(|g| grid.centroid(*g))
            .collect::<StoreResult<Vec<_>>>()?;
        let fid = batch.insert(
            "INSERT INTO fpxsec (iflo, nnxsec, geom) VALUES (?1, ?2, ?3)",
            params![
                section.iflo,
                section.nnxsec,
                line_wkt(&polyline(&vertices)),
            ],
        )?;
        for g in &section.cells {
            batch.insert(
                "INSERT INTO fpxsec_cells (fpxsec_fid, grid_fid) VALUES (?1, ?2)",
                params![fid, g],
            )?;
        }
    }
    Ok(())
}

pub(super) fn read_fpxsec(conn: &Connection) -> StoreResult<Option<FpXsecData>> {
    let heads = query(
        conn,
        "SELECT fid, iflo, nnxsec FROM fpxsec ORDER BY fid",
        [],
        |row| Ok((row.get::<_, i64>(0)?, int(row, 1)?, row.get::<_, Option<i64>>(2)?)),
    )?;
    if heads.is_empty() {
        return Ok(None);
    }
    let mut data = FpXsecData {
        nxprt: cont_int(conn, "NXPRT")?.unwrap_or(0),
        sections: Vec::with_capacity(heads.len()),
    };
    for (fid, iflo, nnxsec) in heads {
        let cells = query(
            conn,
            "SELECT grid_fid FROM fpxsec_cells WHERE fpxsec_fid = ?1 ORDER BY fid",
            [fid],
            |row| row.get::<_, i64>(0),
        )?;
        data.sections.push(FpXsec {
            iflo,
            nnxsec: nnxsec.unwrap_or(cells.len() as i64),
            cells,
        });
    }
    Ok(Some(data))
}

pub(super) fn write_cell_array(batch: &mut Batch<'_>, data: &CellArrayData) -> StoreResult<()> {
    let spec = data.kind.spec();
    let placeholders: Vec<String> = (1..=spec.columns.len() + 1)
        .map(|i| format!("?{}", i))
        .collect();
    let sql = format!(
        "INSERT INTO {} (grid_fid, {}) VALUES ({})",
        spec.table,
        spec.columns.join(", "),
        placeholders.join(", ")
    );
    for row in &data.rows {
        let values = std::iter::once(Value::Integer(row.grid)).chain(
            (0..spec.columns.len()).map(|i| match row.values.get(i) {
                Some(v) => Value::Real(*v),
                None => Value::Null,
            }),
        );
        batch.insert(&sql, params_from_iter(values))?;
    }
    Ok(())
}

pub(super) fn read_cell_array(
    conn: &Connection,
    kind: CellArrayKind,
) -> StoreResult<Option<CellArrayData>> {
    let spec = kind.spec();
    let sql = format!(
        "SELECT grid_fid, {} FROM {} ORDER BY fid",
        spec.columns.join(", "),
        spec.table
    );
    let rows = query(conn, &sql, [], |row| {
        let mut values: Vec<Option<f64>> = Vec::with_capacity(spec.columns.len());
        for i in 0..spec.columns.len() {
            values.push(row.get(i + 1)?);
        }
        while values.len() > 1 && values.last().is_some_and(Option::is_none) {
            values.pop();
        }
        Ok(CellValues {
            grid: row.get(0)?,
            values: values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect(),
        })
    })?;
    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(CellArrayData { kind, rows }))
}

pub(super) fn write_gutter(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &GutterData,
) -> StoreResult<()> {
    if let Some(g) = &data.global {
        batch.insert(
            "INSERT INTO gutter_globals (width, height, n_value) VALUES (?1, ?2, ?3)",
            params![g.width, g.height, g.n_value],
        )?;
    }
    for c in &data.cells {
        let (x, y) = grid.centroid(c.grid)?;
        let geom = Direction::from_code(c.direction)
            .map(|dir| line_wkt(&compass_segment(x, y, grid.cell_size(), dir)));
        batch.insert(
            "INSERT INTO gutter_cells (grid_fid, width, height, n_value, direction, geom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![c.grid, c.width, c.height, c.n_value, c.direction, geom],
        )?;
    }
    Ok(())
}

pub(super) fn read_gutter(conn: &Connection) -> StoreResult<Option<GutterData>> {
    let global = conn
        .query_row(
            "SELECT width, height, n_value FROM gutter_globals ORDER BY fid LIMIT 1",
            [],
            |row| {
                Ok(GutterGlobal {
                    width: real(row, 0)?,
                    height: real(row, 1)?,
                    n_value: real(row, 2)?,
                })
            },
        )
        .optional()?;
    let cells = query(
        conn,
        "SELECT grid_fid, width, height, n_value, direction FROM gutter_cells ORDER BY fid",
        [],
        |row| {
            Ok(GutterCell {
                grid: row.get(0)?,
                width: real(row, 1)?,
                height: real(row, 2)?,
                n_value: real(row, 3)?,
                direction: int(row, 4)?,
            })
        },
    )?;
    if global.is_none() && cells.is_empty() {
        return Ok(None);
    }
    Ok(Some(GutterData { global, cells }))
}

pub(super) fn write_wsurf(batch: &mut Batch<'_>, data: &WsurfData) -> StoreResult<()> {
    for c in &data.cells {
        batch.insert(
            "INSERT INTO wsurf (grid_fid, wselev) VALUES (?1, ?2)",
            params![c.grid, c.value],
        )?;
    }
    Ok(())
}

pub(super) fn read_wsurf(conn: &Connection) -> StoreResult<Option<WsurfData>> {
    let cells = query(conn, "SELECT grid_fid, wselev FROM wsurf ORDER BY fid", [], |row| {
        Ok(CellValue::new(row.get(0)?, real(row, 1)?))
    })?;
    Ok((!cells.is_empty()).then_some(WsurfData { cells }))
}

pub(super) fn write_wstime(batch: &mut Batch<'_>, data: &WstimeData) -> StoreResult<()> {
    for c in &data.cells {
        batch.insert(
            "INSERT INTO wstime (grid_fid, wselev, time) VALUES (?1, ?2, ?3)",
            params![c.grid, c.wselev, c.time],
        )?;
    }
    Ok(())
}

pub(super) fn read_wstime(conn: &Connection) -> StoreResult<Option<WstimeData>> {
    let cells = query(
        conn,
        "SELECT grid_fid, wselev, time FROM wstime ORDER BY fid",
        [],
        |row| {
            Ok(WstimeCell {
                grid: row.get(0)?,
                wselev: real(row, 1)?,
                time: real(row, 2)?,
            })
        },
    )?;
    Ok((!cells.is_empty()).then_some(WstimeData { cells }))
}
