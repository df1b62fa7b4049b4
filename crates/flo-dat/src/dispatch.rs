//! Component-level entry points over a project directory.

use std::path::Path;

use flo_core::{CodecError, NumberSpellings};
use flo_model::{CellArrayKind, Component, ComponentData, Control};

use crate::lexer::DoubleParser;
use crate::{
    DatFile, DatResult, DatWriter, RowStream, boundary, channel, control, find_file, floodplain,
    grid, hydrology, levee, reduction, sediment, storm_drain, street, structure,
};

/// A parsed component plus the recoverable problems met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub data: ComponentData,
    pub warnings: Vec<String>,
    /// How the component's numbers were written, for text-exact export.
    pub spellings: NumberSpellings,
}

fn open(dir: &Path, name: &str) -> DatResult<Option<RowStream>> {
    match find_file(dir, name) {
        Some(path) => Ok(Some(RowStream::open(&path)?)),
        None => Ok(None),
    }
}

/// Parses one component from `dir`.
///
/// Returns `Ok(None)` when the component's primary file is absent. TOPO.DAT
/// and CONT.DAT are required and raise a missing-file error instead.
pub fn parse_component(
    dir: &Path,
    component: Component,
    control: &Control,
) -> DatResult<Option<Parsed>> {
    let files = component.files();
    let primary = files[0];

    let Some(path) = find_file(dir, primary) else {
        return match component {
            Component::Control | Component::Grid => Err(CodecError::missing(primary).into()),
            _ => Ok(None),
        };
    };
    let mut rows = RowStream::open(&path)?;
    tracing::debug!(component = %component, file = primary, "parsing");

    let mut warnings = Vec::new();
    let data = match component {
        Component::Control => {
            let mut cont = control::parse_cont(&mut rows)?;
            if let Some(mut toler) = open(dir, "TOLER.DAT")? {
                let tol = control::parse_toler(&mut toler, &cont)?;
                cont.merge(&tol);
            }
            ComponentData::Control(cont)
        }
        Component::Grid => {
            let fallback = control.real("CELLSIZE");
            let grid = match open(dir, "MANNINGS_N.DAT")? {
                Some(mannings) => grid::parse_grid(DoubleParser::new(rows, mannings), fallback)?,
                None => grid::parse_grid(rows, fallback)?,
            };
            ComponentData::Grid(grid)
        }
        Component::Inflow => ComponentData::Inflow(boundary::parse_inflow(&mut rows)?),
        Component::Outflow => ComponentData::Outflow(boundary::parse_outflow(&mut rows)?),
        Component::Rain => ComponentData::Rain(hydrology::parse_rain(&mut rows)?),
        Component::Infiltration => ComponentData::Infiltration(hydrology::parse_infil(&mut rows)?),
        Component::Evaporation => ComponentData::Evaporation(hydrology::parse_evap(&mut rows)?),
        Component::Channels => {
            let xsections = match open(dir, "XSEC.DAT")? {
                Some(mut x) => channel::parse_xsec(&mut x)?,
                None => Vec::new(),
            };
            let mut bank = open(dir, "CHANBANK.DAT")?;
            ComponentData::Channels(channel::parse_channels(
                &mut rows,
                bank.as_mut(),
                xsections,
                &mut warnings,
            )?)
        }
        Component::HydraulicStructures => {
            let mut data = structure::parse_hystruc(&mut rows)?;
            if let Some(mut xs) = open(dir, "BRIDGE_XSEC.DAT")? {
                structure::parse_bridge_xsec(&mut xs, &mut data, &mut warnings)?;
            }
            ComponentData::HydraulicStructures(data)
        }
        Component::Streets => ComponentData::Streets(street::parse_street(&mut rows)?),
        Component::ReductionFactors => {
            ComponentData::ReductionFactors(reduction::parse_arf(&mut rows)?)
        }
        Component::MultipleChannels => {
            let mut data = reduction::parse_mult(&mut rows)?;
            if let Some(mut simple) = open(dir, "SIMPLE_MULT.DAT")? {
                data.simple = reduction::parse_simple_mult(&mut simple)?;
            }
            ComponentData::MultipleChannels(data)
        }
        Component::Sediment => ComponentData::Sediment(sediment::parse_sed(&mut rows)?),
        Component::Levee => ComponentData::Levee(levee::parse_levee(&mut rows)?),
        Component::FloodplainXsec => {
            ComponentData::FloodplainXsec(floodplain::parse_fpxsec(&mut rows, &mut warnings)?)
        }
        Component::Breach => ComponentData::Breach(levee::parse_breach(&mut rows)?),
        Component::CellArray(kind) => {
            ComponentData::CellArray(floodplain::parse_cell_array(&mut rows, kind)?)
        }
        Component::Gutter => ComponentData::Gutter(floodplain::parse_gutter(&mut rows)?),
        Component::StormDrainInlets => {
            ComponentData::StormDrainInlets(storm_drain::parse_swmmflo(&mut rows)?)
        }
        Component::StormDrainRatingTables => ComponentData::StormDrainRatingTables(
            storm_drain::parse_swmmflort(&mut rows, &mut warnings)?,
        ),
        Component::StormDrainOutfalls => {
            ComponentData::StormDrainOutfalls(storm_drain::parse_swmmoutf(&mut rows)?)
        }
        Component::WaterSurface => {
            ComponentData::WaterSurface(floodplain::parse_wsurf(&mut rows, &mut warnings)?)
        }
        Component::WaterSurfaceTime => {
            ComponentData::WaterSurfaceTime(floodplain::parse_wstime(&mut rows, &mut warnings)?)
        }
        Component::SwmmInp => ComponentData::SwmmInp(storm_drain::read_swmm_inp(&path)?),
    };

    for w in &warnings {
        tracing::warn!(component = %component, "{}", w);
    }
    let spellings = collect_spellings(dir, component)?;
    Ok(Some(Parsed {
        data,
        warnings,
        spellings,
    }))
}

/// Spellings of every numeric token in the component's files.
///
/// Entries are filed under the canonical file name so emitters find them
/// whatever case the source used. SWMM.INP is carried verbatim and skipped.
pub fn collect_spellings(dir: &Path, component: Component) -> DatResult<NumberSpellings> {
    let mut spellings = NumberSpellings::new();
    if component == Component::SwmmInp {
        return Ok(spellings);
    }
    for name in component.files() {
        let Some(path) = find_file(dir, name) else {
            continue;
        };
        let text = std::fs::read_to_string(&path).map_err(|e| CodecError::io(&path, e))?;
        spellings.scan_text(name, &text);
    }
    Ok(spellings)
}

/// Renders one component as DAT files with numbers in their shortest form.
pub fn emit_component(data: &ComponentData, control: &Control) -> DatResult<Vec<DatFile>> {
    emit_component_with(data, control, &NumberSpellings::new())
}

/// Renders one component as DAT files, restoring recorded number spellings.
///
/// Nothing is produced when the component is switched off in `control` or
/// holds no records.
pub fn emit_component_with(
    data: &ComponentData,
    control: &Control,
    spellings: &NumberSpellings,
) -> DatResult<Vec<DatFile>> {
    let component = data.component();
    if !component.is_enabled(control) || data.is_empty() {
        tracing::debug!(component = %component, "skipped");
        return Ok(Vec::new());
    }

    let writers: Vec<DatWriter> = match data {
        ComponentData::Control(c) => {
            let mut out = vec![control::emit_cont(c)];
            out.extend(control::emit_toler(c));
            out
        }
        ComponentData::Grid(g) => {
            let (topo, mannings) = grid::emit_grid(g);
            vec![topo, mannings]
        }
        ComponentData::Inflow(d) => vec![boundary::emit_inflow(d, control)],
        ComponentData::Outflow(d) => vec![boundary::emit_outflow(d)],
        ComponentData::Rain(d) => vec![hydrology::emit_rain(d)],
        ComponentData::Infiltration(d) => vec![hydrology::emit_infil(d)],
        ComponentData::Evaporation(d) => vec![hydrology::emit_evap(d)],
        ComponentData::Channels(d) => channel::emit_channels(d),
        ComponentData::HydraulicStructures(d) => structure::emit_hystruc(d),
        ComponentData::Streets(d) => vec![street::emit_street(d)],
        ComponentData::ReductionFactors(d) => vec![reduction::emit_arf(d, control)],
        ComponentData::MultipleChannels(d) => reduction::emit_mult(d),
        ComponentData::Sediment(d) => vec![sediment::emit_sed(d, control)],
        ComponentData::Levee(d) => vec![levee::emit_levee(d)],
        ComponentData::FloodplainXsec(d) => vec![floodplain::emit_fpxsec(d)],
        ComponentData::Breach(d) => vec![levee::emit_breach(d)],
        ComponentData::CellArray(d) => vec![floodplain::emit_cell_array(d)],
        ComponentData::Gutter(d) => vec![floodplain::emit_gutter(d)],
        ComponentData::StormDrainInlets(d) => vec![storm_drain::emit_swmmflo(d)],
        ComponentData::StormDrainRatingTables(d) => vec![storm_drain::emit_swmmflort(d)],
        ComponentData::StormDrainOutfalls(d) => vec![storm_drain::emit_swmmoutf(d)],
        ComponentData::WaterSurface(d) => vec![floodplain::emit_wsurf(d)],
        ComponentData::WaterSurfaceTime(d) => vec![floodplain::emit_wstime(d)],
        ComponentData::SwmmInp(d) => vec![storm_drain::emit_swmm_inp(d)],
    };

    Ok(writers
        .into_iter()
        .filter(|w| !w.is_empty())
        .map(|w| w.finish_with(spellings))
        .collect())
}

/// Components that have a primary file in `dir`, in import order.
pub fn present_components(dir: &Path) -> Vec<Component> {
    Component::import_order()
        .into_iter()
        .filter(|c| find_file(dir, c.files()[0]).is_some())
        .collect()
}

/// The cell-array kind whose file is named `file`, if any.
pub fn cell_array_for_file(file: &str) -> Option<CellArrayKind> {
    CellArrayKind::ALL
        .into_iter()
        .find(|k| k.spec().file.eq_ignore_ascii_case(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_component_emits_nothing() {
        let data = ComponentData::Rain(flo_model::RainData {
            irainreal: 0,
            ..Default::default()
        });
        let off = Control::from_pairs([("IRAIN", "0")]);
        assert!(emit_component(&data, &off).unwrap().is_empty());
        let on = Control::from_pairs([("IRAIN", "1")]);
        let files = emit_component(&data, &on).unwrap();
        assert_eq!(files[0].name, "RAIN.DAT");
    }

    #[test]
    fn spellings_are_filed_under_canonical_names() {
        let dir = std::env::temp_dir().join("flo_dat_spellings_case");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("topo.dat"), "0.0 0 10\n100.0 0 11\n").unwrap();
        std::fs::write(dir.join("MANNINGS_N.DAT"), "1 0.040\n2 0.040\n").unwrap();

        let parsed = parse_component(&dir, Component::Grid, &Control::new())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.spellings.spell("TOPO.DAT", "", 0, 100.0), Some("100.0"));
        assert_eq!(parsed.spellings.spell("MANNINGS_N.DAT", "", 1, 0.04), Some("0.040"));

        let files = emit_component_with(&parsed.data, &Control::new(), &parsed.spellings).unwrap();
        assert_eq!(files[0].text, "0.0 0 10\n100.0 0 11\n");
        assert_eq!(files[1].text, "1 0.040\n2 0.040\n");
    }

    #[test]
    fn cell_array_lookup_ignores_case() {
        assert_eq!(cell_array_for_file("tolspatial.dat"), Some(CellArrayKind::TolSpatial));
        assert_eq!(cell_array_for_file("TOPO.DAT"), None);
    }
}
