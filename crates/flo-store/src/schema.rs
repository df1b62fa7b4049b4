//! Project-store schema bootstrap.

use rusqlite::Connection;

use crate::StoreResult;

const SCHEMA: &str = include_str!("schema.sql");

/// Every data table in creation order; parents precede their children.
pub const DATA_TABLES: &[&str] = &[
    "cont",
    "grid",
    "grid_neighbours",
    "inflow",
    "inflow_cells",
    "inflow_time_series",
    "inflow_time_series_data",
    "reservoirs",
    "outflow",
    "outflow_cells",
    "outflow_time_series",
    "outflow_time_series_data",
    "qh_params",
    "qh_params_data",
    "qh_table",
    "qh_table_data",
    "rain",
    "rain_time_series",
    "rain_time_series_data",
    "rain_arf_cells",
    "infil",
    "infil_chan_seg",
    "infil_cells_green",
    "infil_cells_scs",
    "infil_chan_elems",
    "infil_cells_horton",
    "evapor",
    "evapor_monthly",
    "evapor_hourly",
    "chan",
    "chan_elems",
    "chan_r",
    "chan_v",
    "chan_t",
    "chan_n",
    "chan_confluences",
    "noexchange_chan_cells",
    "chan_wsel",
    "user_xsections",
    "xsec_n_data",
    "struct",
    "rat_curves",
    "repl_rat_curves",
    "rat_table",
    "culvert_equations",
    "storm_drains",
    "bridge_variables",
    "bridge_xs",
    "street_general",
    "streets",
    "street_seg",
    "street_elems",
    "blocked_cells_tot",
    "blocked_cells",
    "mult",
    "mult_cells",
    "simple_mult_cells",
    "mud",
    "sed",
    "sed_groups",
    "sed_group_frac_data",
    "mud_areas",
    "sed_rigid_cells",
    "sed_supply_areas",
    "sed_supply_frac_data",
    "sed_group_cells",
    "levee_general",
    "levee_cells",
    "levee_data",
    "levee_failure",
    "levee_fragility",
    "breach_global",
    "breach",
    "breach_fragility_curves",
    "fpxsec",
    "fpxsec_cells",
    "wsurf",
    "wstime",
    "gutter_globals",
    "gutter_cells",
    "fpfroude_cells",
    "steep_slope_n_cells",
    "lid_volume_cells",
    "spatialshallow_cells",
    "tolspatial_cells",
    "tailing_cells",
    "tailings_cv_cells",
    "tailings_stack_cells",
    "swmmflo_dropbox",
    "swmmflo_clogging",
    "swmmflo",
    "swmmflort",
    "swmmflort_data",
    "swmmflo_culvert",
    "swmmoutf",
    "swmm_inp_sections",
    "swmm_inp_lines",
];

/// Creates missing tables and triggers and seeds `trigger_control`. Idempotent.
pub fn apply(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Switches every naming trigger on or off.
pub fn set_triggers(conn: &Connection, enabled: bool) -> StoreResult<()> {
    conn.execute(
        "UPDATE trigger_control SET enabled = ?1",
        [i64::from(enabled)],
    )?;
    Ok(())
}

pub fn triggers_enabled(conn: &Connection) -> StoreResult<bool> {
    let disabled: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trigger_control WHERE enabled = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(disabled == 0)
}

/// Deletes the given tables, children before parents.
pub fn clear_tables(conn: &Connection, tables: &[&str]) -> StoreResult<()> {
    for table in DATA_TABLES.iter().rev() {
        if tables.contains(table) {
            conn.execute(&format!("DELETE FROM {}", table), [])?;
            tracing::debug!(table, "cleared");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_applies_twice_and_lists_every_table() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        apply(&conn).unwrap();
        for table in DATA_TABLES {
            let n: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
                .unwrap();
            assert_eq!(n, 0, "{table}");
        }
        let listed: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                 AND name != 'trigger_control'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(listed as usize, DATA_TABLES.len());
    }

    #[test]
    fn naming_trigger_respects_trigger_control() {
        let conn = Connection::open_in_memory().unwrap();
        apply(&conn).unwrap();
        conn.execute("INSERT INTO inflow (ident, inoutfc) VALUES ('F', 0)", [])
            .unwrap();
        set_triggers(&conn, false).unwrap();
        assert!(!triggers_enabled(&conn).unwrap());
        conn.execute("INSERT INTO inflow (ident, inoutfc) VALUES ('C', 0)", [])
            .unwrap();
        set_triggers(&conn, true).unwrap();
        let names: Vec<Option<String>> = conn
            .prepare("SELECT name FROM inflow ORDER BY fid")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec![Some("Inflow 1".to_string()), None]);
    }
}
