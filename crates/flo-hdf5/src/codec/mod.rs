//! Component <-> dataset mapping.
//!
//! Each submodule owns one group family and exposes `write_*` (records to
//! groups) and `read_*` (container to records, `None` when the primary
//! dataset is absent).

mod boundary;
mod channel;
mod control;
mod floodplain;
mod hydrology;
mod levee;
mod reduction;
mod spelling;
mod storm_drain;
mod structure;

use flo_model::{Component, ComponentData, Control};

use crate::H5Result;
use crate::container::{H5Container, H5Group};

pub use control::{control_from_container, grid_from_container};
pub use spelling::{read_spellings, write_spellings};

/// Groups carrying `data`. Disabled or empty components produce nothing.
pub fn component_to_datasets(data: &ComponentData, control: &Control) -> H5Result<Vec<H5Group>> {
    let component = data.component();
    if !component.is_enabled(control) || data.is_empty() {
        tracing::debug!(component = %component, "skipped: disabled or empty");
        return Ok(Vec::new());
    }
    let groups = match data {
        ComponentData::Control(c) => control::write_control(c),
        ComponentData::Grid(g) => control::write_grid(g)?,
        ComponentData::Inflow(d) => vec![boundary::write_inflow(d)],
        ComponentData::Outflow(d) => vec![boundary::write_outflow(d)],
        ComponentData::Rain(d) => vec![hydrology::write_rain(d)],
        ComponentData::Infiltration(d) => vec![hydrology::write_infil(d)],
        ComponentData::Evaporation(d) => vec![hydrology::write_evap(d)],
        ComponentData::Channels(d) => vec![channel::write_channels(d)],
        ComponentData::HydraulicStructures(d) => vec![structure::write_structures(d)],
        ComponentData::Streets(d) => vec![structure::write_streets(d)],
        ComponentData::ReductionFactors(d) => vec![reduction::write_arf(d)],
        ComponentData::MultipleChannels(d) => vec![reduction::write_mult(d)],
        ComponentData::Sediment(d) => vec![reduction::write_sed(d)],
        ComponentData::Levee(d) => vec![levee::write_levee(d)],
        ComponentData::Breach(d) => vec![levee::write_breach(d)],
        ComponentData::FloodplainXsec(d) => vec![floodplain::write_fpxsec(d)],
        ComponentData::CellArray(d) => vec![floodplain::write_cell_array(d)],
        ComponentData::Gutter(d) => vec![floodplain::write_gutter(d)],
        ComponentData::WaterSurface(d) => vec![floodplain::write_wsurf(d)],
        ComponentData::WaterSurfaceTime(d) => vec![floodplain::write_wstime(d)],
        ComponentData::StormDrainInlets(d) => vec![storm_drain::write_inlets(d)],
        ComponentData::StormDrainRatingTables(d) => vec![storm_drain::write_rating_tables(d)],
        ComponentData::StormDrainOutfalls(d) => vec![storm_drain::write_outfalls(d)],
        ComponentData::SwmmInp(_) => Vec::new(),
    };
    Ok(groups.into_iter().filter(|g| !g.is_empty()).collect())
}

/// Records of `component` held by the container.
///
/// Control and Grid are required; every other component reads as `None`
/// when its primary dataset is absent.
pub fn component_from_container(
    container: &H5Container,
    component: Component,
    control: &Control,
) -> H5Result<Option<ComponentData>> {
    let data = match component {
        Component::Control => Some(ComponentData::Control(control_from_container(container)?)),
        Component::Grid => Some(ComponentData::Grid(grid_from_container(container, control)?)),
        Component::Inflow => boundary::read_inflow(container)?.map(ComponentData::Inflow),
        Component::Outflow => boundary::read_outflow(container)?.map(ComponentData::Outflow),
        Component::Rain => hydrology::read_rain(container)?.map(ComponentData::Rain),
        Component::Infiltration => {
            hydrology::read_infil(container)?.map(ComponentData::Infiltration)
        }
        Component::Evaporation => hydrology::read_evap(container)?.map(ComponentData::Evaporation),
        Component::Channels => channel::read_channels(container)?.map(ComponentData::Channels),
        Component::HydraulicStructures => {
            structure::read_structures(container)?.map(ComponentData::HydraulicStructures)
        }
        Component::Streets => structure::read_streets(container)?.map(ComponentData::Streets),
        Component::ReductionFactors => {
            reduction::read_arf(container)?.map(ComponentData::ReductionFactors)
        }
        Component::MultipleChannels => {
            reduction::read_mult(container)?.map(ComponentData::MultipleChannels)
        }
        Component::Sediment => reduction::read_sed(container)?.map(ComponentData::Sediment),
        Component::Levee => levee::read_levee(container)?.map(ComponentData::Levee),
        Component::Breach => levee::read_breach(container)?.map(ComponentData::Breach),
        Component::FloodplainXsec => {
            floodplain::read_fpxsec(container)?.map(ComponentData::FloodplainXsec)
        }
        Component::CellArray(kind) => {
            floodplain::read_cell_array(container, kind)?.map(ComponentData::CellArray)
        }
        Component::Gutter => floodplain::read_gutter(container)?.map(ComponentData::Gutter),
        Component::WaterSurface => {
            floodplain::read_wsurf(container)?.map(ComponentData::WaterSurface)
        }
        Component::WaterSurfaceTime => {
            floodplain::read_wstime(container)?.map(ComponentData::WaterSurfaceTime)
        }
        Component::StormDrainInlets => {
            storm_drain::read_inlets(container)?.map(ComponentData::StormDrainInlets)
        }
        Component::StormDrainRatingTables => {
            storm_drain::read_rating_tables(container)?.map(ComponentData::StormDrainRatingTables)
        }
        Component::StormDrainOutfalls => {
            storm_drain::read_outfalls(container)?.map(ComponentData::StormDrainOutfalls)
        }
        Component::SwmmInp => None,
    };
    Ok(data)
}

/// Components whose primary dataset is present, in import order.
pub fn present_components(container: &H5Container) -> H5Result<Vec<Component>> {
    let control = Control::new();
    let mut out = Vec::new();
    for component in Component::import_order() {
        let present = match component {
            Component::Control => control::has_control(container),
            Component::Grid => control::has_grid(container),
            Component::SwmmInp => false,
            other => component_from_container(container, other, &control)?.is_some(),
        };
        if present {
            out.push(component);
        }
    }
    Ok(out)
}
