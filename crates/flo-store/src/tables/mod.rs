//! Component <-> table mapping.
//!
//! Each submodule owns the tables of one component family and exposes
//! `write_*` (records to rows through a [`Batch`]) and `read_*` (rows back
//! to records, `None` when nothing is stored).

mod boundary;
mod channel;
mod control;
mod floodplain;
mod hydrology;
mod levee;
mod reduction;
mod storm_drain;
mod structure;

use std::collections::HashMap;

use flo_core::{CodecError, ComponentReport};
use flo_model::{Component, ComponentData};
use rusqlite::Connection;

use crate::StoreResult;
use crate::batch::Batch;
use crate::sql::{cont_value, query};

pub(crate) use control::read_control;

/// Cell centroids and cell size, used for derived geometry.
pub(crate) struct GridIndex {
    cell_size: f64,
    centroids: HashMap<i64, (f64, f64)>,
}

impl GridIndex {
    pub fn empty() -> Self {
        Self {
            cell_size: 0.0,
            centroids: HashMap::new(),
        }
    }

    pub fn load(conn: &Connection) -> StoreResult<Self> {
        let cells = query(conn, "SELECT fid, x, y FROM grid", [], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
        })?;
        let cell_size = cont_value(conn, "CELLSIZE")?
            .as_deref()
            .and_then(flo_core::parse_real)
            .unwrap_or(0.0);
        Ok(Self {
            cell_size,
            centroids: cells.into_iter().map(|(fid, x, y)| (fid, (x, y))).collect(),
        })
    }

    pub fn len(&self) -> i64 {
        self.centroids.len() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn centroid(&self, grid: i64) -> StoreResult<(f64, f64)> {
        self.centroids
            .get(&grid)
            .copied()
            .ok_or_else(|| CodecError::domain(format!("grid {} does not exist", grid)).into())
    }

    pub fn contains(&self, grid: i64) -> bool {
        self.centroids.contains_key(&grid)
    }
}

/// Tables owned by `component`; a write replaces exactly these.
pub(crate) fn owned_tables(component: Component) -> Vec<&'static str> {
    let tables: &[&'static str] = match component {
        Component::Control => &[],
        Component::Grid => &["grid", "grid_neighbours"],
        Component::Inflow => &[
            "inflow",
            "inflow_cells",
            "inflow_time_series",
            "inflow_time_series_data",
            "reservoirs",
        ],
        Component::Outflow => &[
            "outflow",
            "outflow_cells",
            "outflow_time_series",
            "outflow_time_series_data",
            "qh_params",
            "qh_params_data",
            "qh_table",
            "qh_table_data",
        ],
        Component::Rain => &[
            "rain",
            "rain_time_series",
            "rain_time_series_data",
            "rain_arf_cells",
        ],
        Component::Infiltration => &[
            "infil",
            "infil_chan_seg",
            "infil_cells_green",
            "infil_cells_scs",
            "infil_chan_elems",
            "infil_cells_horton",
        ],
        Component::Evaporation => &["evapor", "evapor_monthly", "evapor_hourly"],
        Component::Channels => &[
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
        ],
        Component::HydraulicStructures => &[
            "struct",
            "rat_curves",
            "repl_rat_curves",
            "rat_table",
            "culvert_equations",
            "storm_drains",
            "bridge_variables",
            "bridge_xs",
        ],
        Component::Streets => &["street_general", "streets", "street_seg", "street_elems"],
        Component::ReductionFactors => &["blocked_cells_tot", "blocked_cells"],
        Component::MultipleChannels => &["mult", "mult_cells", "simple_mult_cells"],
        Component::Sediment => &[
            "mud",
            "sed",
            "sed_groups",
            "sed_group_frac_data",
            "mud_areas",
            "sed_rigid_cells",
            "sed_supply_areas",
            "sed_supply_frac_data",
            "sed_group_cells",
        ],
        Component::Levee => &[
            "levee_general",
            "levee_cells",
            "levee_data",
            "levee_failure",
            "levee_fragility",
        ],
        Component::FloodplainXsec => &["fpxsec", "fpxsec_cells"],
        Component::Breach => &["breach_global", "breach", "breach_fragility_curves"],
        Component::CellArray(kind) => return vec![kind.spec().table],
        Component::Gutter => &["gutter_globals", "gutter_cells"],
        // Rating tables reference inlets, so replacing inlets drops them too.
        Component::StormDrainInlets => &[
            "swmmflo",
            "swmmflort",
            "swmmflort_data",
            "swmmflo_culvert",
        ],
        Component::StormDrainRatingTables => &["swmmflort", "swmmflort_data", "swmmflo_culvert"],
        Component::StormDrainOutfalls => &["swmmoutf"],
        Component::WaterSurface => &["wsurf"],
        Component::WaterSurfaceTime => &["wstime"],
        Component::SwmmInp => &["swmm_inp_sections", "swmm_inp_lines"],
    };
    tables.to_vec()
}

/// Tables cleared when the grid is replaced.
pub(crate) fn grid_dependent_tables() -> Vec<&'static str> {
    Component::import_order()
        .into_iter()
        .filter(|c| {
            !matches!(
                c,
                Component::Control | Component::Grid | Component::Evaporation | Component::SwmmInp
            )
        })
        .flat_map(owned_tables)
        .collect()
}

/// Bulk naming run after inserts while the naming triggers are off.
pub(crate) fn name_updates(component: Component) -> &'static [&'static str] {
    match component {
        Component::Inflow => &[
            "UPDATE inflow SET name = 'Inflow ' || fid WHERE name IS NULL",
            "UPDATE reservoirs SET name = 'Reservoir ' || fid WHERE name IS NULL",
        ],
        Component::Outflow => &["UPDATE outflow SET name = 'Outflow ' || fid WHERE name IS NULL"],
        Component::Channels => &["UPDATE chan SET name = 'Channel ' || fid WHERE name IS NULL"],
        _ => &[],
    }
}

pub(crate) fn write(
    batch: &mut Batch<'_>,
    grid: &GridIndex,
    data: &ComponentData,
    report: &mut ComponentReport,
) -> StoreResult<()> {
    match data {
        ComponentData::Control(c) => control::write_control(batch, c),
        ComponentData::Grid(g) => control::write_grid(batch, g, report),
        ComponentData::Inflow(d) => boundary::write_inflow(batch, grid, d),
        ComponentData::Outflow(d) => boundary::write_outflow(batch, d),
        ComponentData::Rain(d) => hydrology::write_rain(batch, d),
        ComponentData::Infiltration(d) => hydrology::write_infil(batch, d),
        ComponentData::Evaporation(d) => hydrology::write_evap(batch, d),
        ComponentData::Channels(d) => channel::write_channels(batch, grid, d, report),
        ComponentData::HydraulicStructures(d) => {
            structure::write_structures(batch, grid, d, report)
        }
        ComponentData::Streets(d) => structure::write_streets(batch, grid, d, report),
        ComponentData::ReductionFactors(d) => reduction::write_arf(batch, d),
        ComponentData::MultipleChannels(d) => reduction::write_mult(batch, d, report),
        ComponentData::Sediment(d) => reduction::write_sed(batch, d),
        ComponentData::Levee(d) => levee::write_levee(batch, grid, d, report),
        ComponentData::Breach(d) => levee::write_breach(batch, d),
        ComponentData::FloodplainXsec(d) => floodplain::write_fpxsec(batch, grid, d),
        ComponentData::CellArray(d) => floodplain::write_cell_array(batch, d),
        ComponentData::Gutter(d) => floodplain::write_gutter(batch, grid, d),
        ComponentData::WaterSurface(d) => floodplain::write_wsurf(batch, d),
        ComponentData::WaterSurfaceTime(d) => floodplain::write_wstime(batch, d),
        ComponentData::StormDrainInlets(d) => storm_drain::write_inlets(batch, grid, d),
        ComponentData::StormDrainRatingTables(d) => {
            storm_drain::write_rating_tables(batch, d, report)
        }
        ComponentData::StormDrainOutfalls(d) => storm_drain::write_outfalls(batch, grid, d),
        ComponentData::SwmmInp(d) => storm_drain::write_swmm_inp(batch, d),
    }
}

pub(crate) fn read(conn: &Connection, component: Component) -> StoreResult<Option<ComponentData>> {
    let data = match component {
        Component::Control => {
            let control = read_control(conn)?;
            (!control.is_empty()).then_some(ComponentData::Control(control))
        }
        Component::Grid => control::read_grid(conn)?.map(ComponentData::Grid),
        Component::Inflow => boundary::read_inflow(conn)?.map(ComponentData::Inflow),
        Component::Outflow => boundary::read_outflow(conn)?.map(ComponentData::Outflow),
        Component::Rain => hydrology::read_rain(conn)?.map(ComponentData::Rain),
        Component::Infiltration => hydrology::read_infil(conn)?.map(ComponentData::Infiltration),
        Component::Evaporation => hydrology::read_evap(conn)?.map(ComponentData::Evaporation),
        Component::Channels => channel::read_channels(conn)?.map(ComponentData::Channels),
        Component::HydraulicStructures => {
            structure::read_structures(conn)?.map(ComponentData::HydraulicStructures)
        }
        Component::Streets => structure::read_streets(conn)?.map(ComponentData::Streets),
        Component::ReductionFactors => {
            reduction::read_arf(conn)?.map(ComponentData::ReductionFactors)
        }
        Component::MultipleChannels => {
            reduction::read_mult(conn)?.map(ComponentData::MultipleChannels)
        }
        Component::Sediment => reduction::read_sed(conn)?.map(ComponentData::Sediment),
        Component::Levee => levee::read_levee(conn)?.map(ComponentData::Levee),
        Component::Breach => levee::read_breach(conn)?.map(ComponentData::Breach),
        Component::FloodplainXsec => {
            floodplain::read_fpxsec(conn)?.map(ComponentData::FloodplainXsec)
        }
        Component::CellArray(kind) => {
            floodplain::read_cell_array(conn, kind)?.map(ComponentData::CellArray)
        }
        Component::Gutter => floodplain::read_gutter(conn)?.map(ComponentData::Gutter),
        Component::WaterSurface => floodplain::read_wsurf(conn)?.map(ComponentData::WaterSurface),
        Component::WaterSurfaceTime => {
            floodplain::read_wstime(conn)?.map(ComponentData::WaterSurfaceTime)
        }
        Component::StormDrainInlets => {
            storm_drain::read_inlets(conn)?.map(ComponentData::StormDrainInlets)
        }
        Component::StormDrainRatingTables => {
            storm_drain::read_rating_tables(conn)?.map(ComponentData::StormDrainRatingTables)
        }
        Component::StormDrainOutfalls => {
            storm_drain::read_outfalls(conn)?.map(ComponentData::StormDrainOutfalls)
        }
        Component::SwmmInp => storm_drain::read_swmm_inp(conn)?.map(ComponentData::SwmmInp),
    };
    Ok(data)
}
