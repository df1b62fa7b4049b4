//! Project store API.

use std::path::Path;

use flo_core::{CodecError, ComponentReport, NumberSpellings, SpellingKey};
use flo_model::validate::{check_grid_refs, grid_refs};
use flo_model::{Component, ComponentData, Control};
use rusqlite::{Connection, OpenFlags};

use crate::StoreResult;
use crate::batch::{Batch, WriteOptions};
use crate::schema::{self, DATA_TABLES};
use crate::sql::count;
use crate::tables::{self, GridIndex};

/// A single-file SQLite project store.
pub struct ProjectStore {
    conn: Connection,
}

impl ProjectStore {
    /// Opens `path`, creating the file and schema when missing.
    pub fn create(path: &Path) -> StoreResult<Self> {
        Self::bootstrap(Connection::open(path)?)
    }

    /// Opens an existing store; fails when `path` does not exist.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(conn: Connection) -> StoreResult<Self> {
        schema::apply(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replaces the stored records of `data`'s component.
    ///
    /// The whole component is one transaction: a cancel or an error leaves
    /// the store exactly as it was, and the naming triggers are enabled
    /// again whatever happens.
    pub fn write_component(
        &mut self,
        data: &ComponentData,
        options: &WriteOptions,
    ) -> StoreResult<ComponentReport> {
        let component = data.component();
        let mut report = ComponentReport::new(component.to_string());
        let tx = self.conn.transaction()?;

        let grid = match component {
            Component::Control | Component::Grid | Component::SwmmInp => GridIndex::empty(),
            _ => GridIndex::load(&tx)?,
        };
        if !matches!(component, Component::Control | Component::Grid) {
            if grid.is_empty() && !grid_refs(data).is_empty() {
                return Err(CodecError::state(format!(
                    "{} references grid cells but no grid has been imported",
                    component
                ))
                .into());
            }
            check_grid_refs(data, grid.len())?;
        }

        schema::set_triggers(&tx, false)?;
        if component == Component::Grid && count(&tx, "grid")? > 0 {
            report.warn("grid replaced; every grid-dependent table was cleared");
            schema::clear_tables(&tx, &tables::grid_dependent_tables())?;
        }
        schema::clear_tables(&tx, &tables::owned_tables(component))?;
        clear_spellings(&tx, component)?;

        let mut batch = Batch::begin(&tx, options)?;
        tables::write(&mut batch, &grid, data, &mut report)?;
        let rows = batch.finish()?;

        for sql in tables::name_updates(component) {
            tx.execute(sql, [])?;
        }
        schema::set_triggers(&tx, true)?;
        tx.commit()?;

        report.count("rows", rows);
        tracing::info!(component = %component, rows, "component written");
        Ok(report)
    }

    /// Stored records of `component`, `None` when nothing is stored.
    pub fn read_component(&self, component: Component) -> StoreResult<Option<ComponentData>> {
        let data = tables::read(&self.conn, component)?;
        tracing::debug!(component = %component, present = data.is_some(), "component read");
        Ok(data)
    }

    /// Replaces the recorded number spellings of `component`'s files.
    ///
    /// Entries filed under other files are ignored. Returns the number stored.
    pub fn write_spellings(
        &mut self,
        component: Component,
        spellings: &NumberSpellings,
    ) -> StoreResult<usize> {
        let files = component.files();
        let tx = self.conn.transaction()?;
        clear_spellings(&tx, component)?;
        let mut stored = 0;
        {
            let mut insert = tx.prepare_cached(
                "INSERT OR REPLACE INTO dat_spelling (file, tag, pos, bits, spelling) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (key, text) in spellings.iter().filter(|(k, _)| files.contains(&k.file.as_str())) {
                insert.execute(rusqlite::params![
                    key.file,
                    key.tag,
                    key.pos as i64,
                    key.bits as i64,
                    text
                ])?;
                stored += 1;
            }
        }
        tx.commit()?;
        tracing::debug!(component = %component, stored, "number spellings written");
        Ok(stored)
    }

    /// Every recorded number spelling.
    pub fn read_spellings(&self) -> StoreResult<NumberSpellings> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT file, tag, pos, bits, spelling FROM dat_spelling")?;
        let rows = stmt.query_map([], |row| {
            let key = SpellingKey {
                file: row.get(0)?,
                tag: row.get(1)?,
                pos: row.get::<_, i64>(2)? as usize,
                bits: row.get::<_, i64>(3)? as u64,
            };
            Ok((key, row.get::<_, String>(4)?))
        })?;
        let mut spellings = NumberSpellings::new();
        for row in rows {
            let (key, text) = row?;
            spellings.insert(key, text);
        }
        Ok(spellings)
    }

    pub fn read_control(&self) -> StoreResult<Control> {
        tables::read_control(&self.conn)
    }

    /// Components with stored records, in import order.
    pub fn present_components(&self) -> StoreResult<Vec<Component>> {
        let mut present = Vec::new();
        for component in Component::import_order() {
            let has_rows = match component {
                Component::Control => count(&self.conn, "cont")? > 0,
                _ => {
                    let mut any = false;
                    for table in tables::owned_tables(component) {
                        if count(&self.conn, table)? > 0 {
                            any = true;
                            break;
                        }
                    }
                    any
                }
            };
            if has_rows {
                present.push(component);
            }
        }
        Ok(present)
    }

    pub fn grid_count(&self) -> StoreResult<i64> {
        count(&self.conn, "grid")
    }

    pub fn table_count(&self, table: &str) -> StoreResult<i64> {
        if !DATA_TABLES.contains(&table) {
            return Err(CodecError::domain(format!("unknown table '{}'", table)).into());
        }
        count(&self.conn, table)
    }

    /// Row count of every data table, in schema order.
    pub fn summary(&self) -> StoreResult<Vec<(&'static str, i64)>> {
        let mut out = Vec::with_capacity(DATA_TABLES.len());
        for table in DATA_TABLES {
            out.push((*table, count(&self.conn, table)?));
        }
        Ok(out)
    }

    pub fn triggers_enabled(&self) -> StoreResult<bool> {
        schema::triggers_enabled(&self.conn)
    }
}

fn clear_spellings(conn: &Connection, component: Component) -> StoreResult<()> {
    for file in component.files() {
        conn.execute("DELETE FROM dat_spelling WHERE file = ?1", [file])?;
    }
    Ok(())
}
