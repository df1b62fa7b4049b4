use flo_core::geo::{neighbours, polygon_wkt, square};
use flo_core::{CodecError, ComponentReport, DEFAULT_MANNING, fmt_real};
use flo_model::control::{CONT_NAMES, TOLER_NAMES};
use flo_model::{Control, ControlEntry, GridCell, GridData};
use rusqlite::{Connection, params};

use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{cont_value, count, query, real, set_cont};

/// Replaces the CONT/TOLER entries; names owned by other components survive.
pub(super) fn write_control(batch: &mut Batch<'_>, control: &Control) -> StoreResult<()> {
    let conn = batch.conn();
    for name in CONT_NAMES.iter().chain(TOLER_NAMES) {
        conn.execute("DELETE FROM cont WHERE name = ?1", [name])?;
    }
    for (name, entry) in control.iter() {
        batch.insert(
            "INSERT INTO cont (name, value, note) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, note = excluded.note",
            params![name, entry.value, entry.note],
        )?;
    }
    Ok(())
}

pub(crate) fn read_control(conn: &Connection) -> StoreResult<Control> {
    let rows = query(conn, "SELECT name, value, note FROM cont ORDER BY name", [], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    })?;
    let mut control = Control::new();
    for (name, value, note) in rows {
        control.set_entry(
            &name,
            ControlEntry {
                value: value.unwrap_or_default(),
                note,
            },
        );
    }
    Ok(control)
}

pub(super) fn write_grid(
    batch: &mut Batch<'_>,
    grid: &GridData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    for (idx, cell) in grid.cells.iter().enumerate() {
        let expected = idx as i64 + 1;
        if cell.fid != expected {
            return Err(CodecError::domain(format!(
                "grid cell fids must run 1..{} without gaps or repeats; found {} at position {}",
                grid.cells.len(),
                cell.fid,
                expected
            ))
            .into());
        }
    }
    let cs = grid.cell_size;
    for cell in &grid.cells {
        batch.insert(
            "INSERT INTO grid
                (fid, x, y, elevation, n_value, domain_fid, domain_cell, connectivity_fid, geom)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                cell.fid,
                cell.x,
                cell.y,
                cell.elevation,
                cell.n_value,
                cell.domain_fid,
                cell.domain_cell,
                cell.connectivity_fid,
                polygon_wkt(&square(cell.x, cell.y, cs)),
            ],
        )?;
    }

    let centroids: Vec<(i64, f64, f64)> = grid.cells.iter().map(|c| (c.fid, c.x, c.y)).collect();
    for (fid, n) in neighbours(&centroids, cs)? {
        batch.insert(
            "INSERT INTO grid_neighbours (grid_fid, n, e, s, w, ne, se, sw, nw)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![fid, n[0], n[1], n[2], n[3], n[4], n[5], n[6], n[7]],
        )?;
    }

    let conn = batch.conn();
    set_cont(conn, "CELLSIZE", &fmt_real(cs))?;
    if cont_value(conn, "MANNING")?.is_none() {
        set_cont(conn, "MANNING", &fmt_real(DEFAULT_MANNING))?;
    }
    report.count("cells", grid.cells.len());
    Ok(())
}

pub(super) fn read_grid(conn: &Connection) -> StoreResult<Option<GridData>> {
    if count(conn, "grid")? == 0 {
        return Ok(None);
    }
    let cells = query(
        conn,
        "SELECT fid, x, y, elevation, n_value, domain_fid, domain_cell, connectivity_fid
         FROM grid ORDER BY fid",
        [],
        |row| {
            Ok(GridCell {
                fid: row.get(0)?,
                x: row.get(1)?,
                y: row.get(2)?,
                elevation: real(row, 3)?,
                n_value: real(row, 4)?,
                domain_fid: row.get(5)?,
                domain_cell: row.get(6)?,
                connectivity_fid: row.get(7)?,
            })
        },
    )?;
    let stored = cont_value(conn, "CELLSIZE")?
        .as_deref()
        .and_then(flo_core::parse_real);
    let mut grid = match stored {
        Some(cell_size) => GridData {
            cell_size,
            cells,
            neighbours: Vec::new(),
        },
        None => GridData::from_cells(cells, None)?,
    };
    grid.neighbours = query(
        conn,
        "SELECT n, e, s, w, ne, se, sw, nw FROM grid_neighbours ORDER BY grid_fid",
        [],
        |row| {
            let mut n = [0_i64; 8];
            for (i, slot) in n.iter_mut().enumerate() {
                *slot = row.get(i)?;
            }
            Ok(n)
        },
    )?;
    Ok(Some(grid))
}
