//! Small row helpers shared by the table modules.

use rusqlite::{Connection, OptionalExtension, Params, Row};

use crate::StoreResult;

/// Reads a REAL column; NULL (SQLite stores NaN as NULL) reads back as NaN.
pub(crate) fn real(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(f64::NAN))
}

pub(crate) fn int(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
}

/// Runs `sql` and collects every mapped row.
pub(crate) fn query<T, P, F>(conn: &Connection, sql: &str, params: P, f: F) -> StoreResult<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, f)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn count(conn: &Connection, table: &str) -> StoreResult<i64> {
    let n = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })?;
    Ok(n)
}

pub(crate) fn cont_value(conn: &Connection, name: &str) -> StoreResult<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM cont WHERE name = ?1", [name], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()?;
    Ok(value.flatten())
}

/// Upserts one control entry with its built-in note.
pub(crate) fn set_cont(conn: &Connection, name: &str, value: &str) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO cont (name, value, note) VALUES (?1, ?2, ?3)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        rusqlite::params![name, value, flo_model::control::default_note(name)],
    )?;
    Ok(())
}
