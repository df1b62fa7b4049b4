//! The record payload of one component.

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", content = "data")]
pub enum ComponentData {
    Control(Control),
    Grid(GridData),
    Inflow(InflowData),
    Outflow(OutflowData),
    Rain(RainData),
    Infiltration(InfilData),
    Evaporation(EvapData),
    Channels(ChannelData),
    HydraulicStructures(StructureData),
    Streets(StreetData),
    ReductionFactors(ArfData),
    MultipleChannels(MultData),
    Sediment(SedData),
    Levee(LeveeData),
    FloodplainXsec(FpXsecData),
    Breach(BreachData),
    CellArray(CellArrayData),
    Gutter(GutterData),
    StormDrainInlets(InletData),
    StormDrainRatingTables(RatingTableData),
    StormDrainOutfalls(OutfallData),
    WaterSurface(WsurfData),
    WaterSurfaceTime(WstimeData),
    SwmmInp(SwmmInp),
}

impl ComponentData {
    pub fn component(&self) -> Component {
        match self {
            ComponentData::Control(_) => Component::Control,
            ComponentData::Grid(_) => Component::Grid,
            ComponentData::Inflow(_) => Component::Inflow,
            ComponentData::Outflow(_) => Component::Outflow,
            ComponentData::Rain(_) => Component::Rain,
            ComponentData::Infiltration(_) => Component::Infiltration,
            ComponentData::Evaporation(_) => Component::Evaporation,
            ComponentData::Channels(_) => Component::Channels,
            ComponentData::HydraulicStructures(_) => Component::HydraulicStructures,
            ComponentData::Streets(_) => Component::Streets,
            ComponentData::ReductionFactors(_) => Component::ReductionFactors,
            ComponentData::MultipleChannels(_) => Component::MultipleChannels,
            ComponentData::Sediment(_) => Component::Sediment,
            ComponentData::Levee(_) => Component::Levee,
            ComponentData::FloodplainXsec(_) => Component::FloodplainXsec,
            ComponentData::Breach(_) => Component::Breach,
            ComponentData::CellArray(d) => Component::CellArray(d.kind),
            ComponentData::Gutter(_) => Component::Gutter,
            ComponentData::StormDrainInlets(_) => Component::StormDrainInlets,
            ComponentData::StormDrainRatingTables(_) => Component::StormDrainRatingTables,
            ComponentData::StormDrainOutfalls(_) => Component::StormDrainOutfalls,
            ComponentData::WaterSurface(_) => Component::WaterSurface,
            ComponentData::WaterSurfaceTime(_) => Component::WaterSurfaceTime,
            ComponentData::SwmmInp(_) => Component::SwmmInp,
        }
    }

    /// Number of top-level records, used for reports and emptiness checks.
    pub fn record_count(&self) -> usize {
        match self {
            ComponentData::Control(c) => c.len(),
            ComponentData::Grid(g) => g.cells.len(),
            ComponentData::Inflow(d) => d.inflows.len() + d.reservoirs.len(),
            ComponentData::Outflow(d) => d.cells.len(),
            ComponentData::Rain(d) => d.series.len() + d.arf.len() + 1,
            ComponentData::Infiltration(d) => {
                1 + d.channel_segs.len()
                    + d.green_ampt_cells.len()
                    + d.scs_cells.len()
                    + d.channel_cells.len()
                    + d.horton_cells.len()
            }
            ComponentData::Evaporation(d) => d.months.len() + 1,
            ComponentData::Channels(d) => d.element_count() + d.xsections.len(),
            ComponentData::HydraulicStructures(d) => d.structures.len(),
            ComponentData::Streets(d) => {
                d.streets.len() + usize::from(d.global.is_some())
            }
            ComponentData::ReductionFactors(d) => d.totally.len() + d.partially.len(),
            ComponentData::MultipleChannels(d) => {
                d.cells.len()
                    + d.simple.as_ref().map_or(0, |s| s.cells.len())
                    + usize::from(d.global.is_some())
            }
            ComponentData::Sediment(d) => {
                usize::from(!d.is_empty())
                    + d.groups.len()
                    + d.mud_areas.len()
                    + d.rigid_cells.len()
                    + d.supply.len()
                    + d.group_cells.len()
            }
            ComponentData::Levee(d) => d.cells.len() + d.failures.len() + d.fragility.len(),
            ComponentData::FloodplainXsec(d) => d.sections.len(),
            ComponentData::Breach(d) => {
                usize::from(d.global.is_some()) + d.locals.len() + d.fragility.len()
            }
            ComponentData::CellArray(d) => d.rows.len(),
            ComponentData::Gutter(d) => d.cells.len() + usize::from(d.global.is_some()),
            ComponentData::StormDrainInlets(d) => d.inlets.len(),
            ComponentData::StormDrainRatingTables(d) => d.blocks.len(),
            ComponentData::StormDrainOutfalls(d) => d.outfalls.len(),
            ComponentData::WaterSurface(d) => d.cells.len(),
            ComponentData::WaterSurfaceTime(d) => d.cells.len(),
            ComponentData::SwmmInp(d) => d.line_count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
