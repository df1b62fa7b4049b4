//! Grid reference checks run before a component reaches the store.

use flo_core::{CodecError, CodecResult};

use crate::ComponentData;

/// Every `(what, grid)` reference a component makes to the grid.
///
/// Hydraulic structures are absent: out-of-range structures are rejected
/// one by one with a warning instead of failing the component.
pub fn grid_refs(data: &ComponentData) -> Vec<(&'static str, i64)> {
    let mut refs = Vec::new();
    match data {
        ComponentData::Control(_)
        | ComponentData::Grid(_)
        | ComponentData::HydraulicStructures(_)
        | ComponentData::SwmmInp(_) => {}
        ComponentData::Inflow(d) => {
            refs.extend(d.inflows.iter().map(|i| ("inflow", i.grid)));
            refs.extend(d.reservoirs.iter().map(|r| ("reservoir", r.grid)));
        }
        ComponentData::Outflow(d) => refs.extend(d.cells.iter().map(|c| ("outflow", c.grid))),
        ComponentData::Rain(d) => refs.extend(d.arf.iter().map(|c| ("rain arf", c.grid))),
        ComponentData::Infiltration(d) => {
            refs.extend(d.green_ampt_cells.iter().map(|c| ("green-ampt", c.grid)));
            refs.extend(d.scs_cells.iter().map(|c| ("scs", c.grid)));
            refs.extend(d.channel_cells.iter().map(|c| ("channel infiltration", c.grid)));
            refs.extend(d.horton_cells.iter().map(|c| ("horton", c.grid)));
        }
        ComponentData::Evaporation(_) => {}
        ComponentData::Channels(d) => {
            for seg in &d.segments {
                refs.extend(seg.elements.iter().map(|e| ("channel element", e.grid)));
                refs.extend(
                    seg.elements
                        .iter()
                        .filter(|e| e.rbankgrid != 0)
                        .map(|e| ("right bank", e.rbankgrid)),
                );
            }
        }
        ComponentData::Streets(d) => {
            for street in &d.streets {
                refs.extend(street.segments.iter().map(|s| ("street segment", s.grid)));
            }
        }
        ComponentData::ReductionFactors(d) => {
            refs.extend(d.totally.iter().map(|c| ("blocked cell", c.grid)));
            refs.extend(d.partially.iter().map(|c| ("partially blocked cell", c.grid)));
        }
        ComponentData::MultipleChannels(d) => {
            refs.extend(d.cells.iter().map(|c| ("mult cell", c.grid)));
            if let Some(simple) = &d.simple {
                refs.extend(simple.cells.iter().map(|g| ("simple mult cell", *g)));
            }
        }
        ComponentData::Sediment(d) => {
            refs.extend(d.mud_areas.iter().map(|c| ("mud area", c.grid)));
            refs.extend(d.rigid_cells.iter().map(|g| ("rigid bed cell", *g)));
            refs.extend(d.supply.iter().map(|s| ("sediment supply", s.grid)));
            refs.extend(d.group_cells.iter().map(|c| ("sediment group cell", c.grid)));
        }
        ComponentData::Levee(d) => {
            refs.extend(d.cells.iter().map(|c| ("levee cell", c.grid)));
            refs.extend(d.failures.iter().map(|c| ("levee failure", c.grid)));
            refs.extend(d.fragility.iter().map(|c| ("levee fragility", c.grid)));
        }
        ComponentData::FloodplainXsec(d) => {
            for section in &d.sections {
                refs.extend(section.cells.iter().map(|g| ("fpxsec cell", *g)));
            }
        }
        ComponentData::Breach(d) => refs.extend(d.locals.iter().map(|c| ("breach cell", c.grid))),
        ComponentData::CellArray(d) => refs.extend(d.rows.iter().map(|c| ("cell", c.grid))),
        ComponentData::Gutter(d) => refs.extend(d.cells.iter().map(|c| ("gutter cell", c.grid))),
        ComponentData::StormDrainInlets(d) => {
            refs.extend(d.inlets.iter().map(|i| ("storm drain inlet", i.grid)))
        }
        ComponentData::StormDrainRatingTables(d) => {
            refs.extend(d.blocks.iter().map(|b| ("rating table", b.grid())))
        }
        ComponentData::StormDrainOutfalls(d) => {
            refs.extend(d.outfalls.iter().map(|o| ("outfall", o.grid)))
        }
        ComponentData::WaterSurface(d) => refs.extend(d.cells.iter().map(|c| ("wsurf", c.grid))),
        ComponentData::WaterSurfaceTime(d) => {
            refs.extend(d.cells.iter().map(|c| ("wstime", c.grid)))
        }
    }
    refs
}

/// Fails with `DomainError` on the first reference outside `[1..n_cells]`.
pub fn check_grid_refs(data: &ComponentData, n_cells: i64) -> CodecResult<()> {
    for (what, grid) in grid_refs(data) {
        if grid < 1 || grid > n_cells {
            return Err(CodecError::domain(format!(
                "{}: {} references grid {} outside [1..{}]",
                data.component(),
                what,
                grid,
                n_cells
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArfData, BlockedCell, CellValue, WsurfData};

    #[test]
    fn out_of_range_grid_is_a_domain_error() {
        let data = ComponentData::WaterSurface(WsurfData {
            cells: vec![CellValue::new(1, 10.0), CellValue::new(8, 11.0)],
        });
        assert!(check_grid_refs(&data, 8).is_ok());
        let err = check_grid_refs(&data, 7).unwrap_err();
        assert_eq!(err.kind_label(), "DomainError");
        assert!(err.to_string().contains("grid 8"));
    }

    #[test]
    fn arf_refs_use_decoded_grid() {
        let data = ComponentData::ReductionFactors(ArfData {
            iarfblockmod: None,
            totally: vec![BlockedCell {
                grid: 42,
                collapse: true,
            }],
            partially: vec![],
        });
        assert!(check_grid_refs(&data, 42).is_ok());
    }
}
