//! Logical components and the per-cell array catalogue.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Control;

/// Simple `grid value...` arrays that share one code path in every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CellArrayKind {
    FpFroude,
    SteepSlopeN,
    LidVolume,
    ShallowNSpatial,
    TolSpatial,
    Tailings,
    TailingsCv,
    TailingsStackDepth,
    SdDropBox,
    SdClogging,
}

/// Where a cell array lives in each representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellArraySpec {
    pub file: &'static str,
    pub table: &'static str,
    pub columns: &'static [&'static str],
    pub h5_group: &'static str,
    pub h5_dataset: &'static str,
    pub description: &'static str,
    pub gate: Option<&'static str>,
}

impl CellArrayKind {
    pub const ALL: [CellArrayKind; 10] = [
        CellArrayKind::FpFroude,
        CellArrayKind::SteepSlopeN,
        CellArrayKind::LidVolume,
        CellArrayKind::ShallowNSpatial,
        CellArrayKind::TolSpatial,
        CellArrayKind::Tailings,
        CellArrayKind::TailingsCv,
        CellArrayKind::TailingsStackDepth,
        CellArrayKind::SdDropBox,
        CellArrayKind::SdClogging,
    ];

    pub fn spec(self) -> CellArraySpec {
        match self {
            CellArrayKind::FpFroude => CellArraySpec {
                file: "FPFROUDE.DAT",
                table: "fpfroude_cells",
                columns: &["froudefp"],
                h5_group: "Spatially Variable",
                h5_dataset: "FPFROUDE",
                description: "Spatially variable Froude number limit",
                gate: None,
            },
            CellArrayKind::SteepSlopeN => CellArraySpec {
                file: "STEEP_SLOPEN.DAT",
                table: "steep_slope_n_cells",
                columns: &["steep_n"],
                h5_group: "Spatially Variable",
                h5_dataset: "STEEP_SLOPEN",
                description: "Steep slope Manning n adjustment",
                gate: None,
            },
            CellArrayKind::LidVolume => CellArraySpec {
                file: "LID_VOLUME.DAT",
                table: "lid_volume_cells",
                columns: &["volume"],
                h5_group: "Spatially Variable",
                h5_dataset: "LID_VOLUME",
                description: "Low impact development storage volume",
                gate: None,
            },
            CellArrayKind::ShallowNSpatial => CellArraySpec {
                file: "SHALLOWN_SPATIAL.DAT",
                table: "spatialshallow_cells",
                columns: &["shallow_n"],
                h5_group: "Spatially Variable",
                h5_dataset: "SHALLOWN_SPATIAL",
                description: "Spatially variable shallow flow n",
                gate: None,
            },
            CellArrayKind::TolSpatial => CellArraySpec {
                file: "TOLSPATIAL.DAT",
                table: "tolspatial_cells",
                columns: &["tol"],
                h5_group: "Tolerance",
                h5_dataset: "TOLSPATIAL",
                description: "Spatially variable depth tolerance",
                gate: None,
            },
            CellArrayKind::Tailings => CellArraySpec {
                file: "TAILINGS.DAT",
                table: "tailing_cells",
                columns: &["thickness"],
                h5_group: "Tailings",
                h5_dataset: "TAILINGS",
                description: "Tailings thickness",
                gate: None,
            },
            CellArrayKind::TailingsCv => CellArraySpec {
                file: "TAILINGS_CV.DAT",
                table: "tailings_cv_cells",
                columns: &["concentration"],
                h5_group: "Tailings",
                h5_dataset: "TAILINGS_CV",
                description: "Tailings volumetric concentration",
                gate: None,
            },
            CellArrayKind::TailingsStackDepth => CellArraySpec {
                file: "TAILINGS_STACK_DEPTH.DAT",
                table: "tailings_stack_cells",
                columns: &["stack_depth", "concentration"],
                h5_group: "Tailings",
                h5_dataset: "TAILINGS_STACK_DEPTH",
                description: "Tailings stack depth and concentration",
                gate: None,
            },
            CellArrayKind::SdDropBox => CellArraySpec {
                file: "SWMMFLODROPBOX.DAT",
                table: "swmmflo_dropbox",
                columns: &["area"],
                h5_group: "Storm Drain",
                h5_dataset: "SWMMFLODROPBOX",
                description: "Storm drain drop box area",
                gate: Some("SWMM"),
            },
            CellArrayKind::SdClogging => CellArraySpec {
                file: "SDCLOGGING.DAT",
                table: "swmmflo_clogging",
                columns: &["clog_factor"],
                h5_group: "Storm Drain",
                h5_dataset: "SDCLOGGING",
                description: "Storm drain inlet clogging factor",
                gate: Some("SWMM"),
            },
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CellArrayKind::FpFroude => "fpfroude",
            CellArrayKind::SteepSlopeN => "steep_slopen",
            CellArrayKind::LidVolume => "lid_volume",
            CellArrayKind::ShallowNSpatial => "shallown_spatial",
            CellArrayKind::TolSpatial => "tolspatial",
            CellArrayKind::Tailings => "tailings",
            CellArrayKind::TailingsCv => "tailings_cv",
            CellArrayKind::TailingsStackDepth => "tailings_stack_depth",
            CellArrayKind::SdDropBox => "sd_dropbox",
            CellArrayKind::SdClogging => "sd_clogging",
        }
    }
}

/// One logical FLO-2D component; the unit of import, export and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Component {
    Control,
    Grid,
    Inflow,
    Outflow,
    Rain,
    Infiltration,
    Evaporation,
    Channels,
    HydraulicStructures,
    Streets,
    ReductionFactors,
    MultipleChannels,
    Sediment,
    Levee,
    FloodplainXsec,
    Breach,
    CellArray(CellArrayKind),
    Gutter,
    StormDrainInlets,
    StormDrainRatingTables,
    StormDrainOutfalls,
    WaterSurface,
    WaterSurfaceTime,
    SwmmInp,
}

impl Component {
    /// Import order: Control and Grid first, inlets before their rating tables.
    pub fn import_order() -> Vec<Component> {
        let mut order = vec![
            Component::Control,
            Component::Grid,
            Component::Inflow,
            Component::Outflow,
            Component::Rain,
            Component::Infiltration,
            Component::Evaporation,
            Component::Channels,
            Component::HydraulicStructures,
            Component::Streets,
            Component::ReductionFactors,
            Component::MultipleChannels,
            Component::Sediment,
            Component::Levee,
            Component::FloodplainXsec,
            Component::Breach,
        ];
        order.extend(CellArrayKind::ALL.iter().map(|k| Component::CellArray(*k)));
        order.extend([
            Component::Gutter,
            Component::StormDrainInlets,
            Component::StormDrainRatingTables,
            Component::StormDrainOutfalls,
            Component::WaterSurface,
            Component::WaterSurfaceTime,
            Component::SwmmInp,
        ]);
        order
    }

    pub fn key(&self) -> &'static str {
        match self {
            Component::Control => "control",
            Component::Grid => "grid",
            Component::Inflow => "inflow",
            Component::Outflow => "outflow",
            Component::Rain => "rain",
            Component::Infiltration => "infiltration",
            Component::Evaporation => "evaporation",
            Component::Channels => "channels",
            Component::HydraulicStructures => "structures",
            Component::Streets => "streets",
            Component::ReductionFactors => "arf",
            Component::MultipleChannels => "mult",
            Component::Sediment => "sediment",
            Component::Levee => "levee",
            Component::FloodplainXsec => "fpxsec",
            Component::Breach => "breach",
            Component::CellArray(kind) => kind.key(),
            Component::Gutter => "gutter",
            Component::StormDrainInlets => "sd_inlets",
            Component::StormDrainRatingTables => "sd_rating_tables",
            Component::StormDrainOutfalls => "sd_outfalls",
            Component::WaterSurface => "wsurf",
            Component::WaterSurfaceTime => "wstime",
            Component::SwmmInp => "swmm_inp",
        }
    }

    pub fn from_key(key: &str) -> Option<Component> {
        let key = key.trim().to_ascii_lowercase();
        Self::import_order().into_iter().find(|c| c.key() == key)
    }

    /// Source files, first one primary.
    pub fn files(&self) -> &'static [&'static str] {
        match self {
            Component::Control => &["CONT.DAT", "TOLER.DAT"],
            Component::Grid => &["TOPO.DAT", "MANNINGS_N.DAT"],
            Component::Inflow => &["INFLOW.DAT"],
            Component::Outflow => &["OUTFLOW.DAT"],
            Component::Rain => &["RAIN.DAT"],
            Component::Infiltration => &["INFIL.DAT"],
            Component::Evaporation => &["EVAPOR.DAT"],
            Component::Channels => &["CHAN.DAT", "CHANBANK.DAT", "XSEC.DAT"],
            Component::HydraulicStructures => &["HYSTRUC.DAT", "BRIDGE_XSEC.DAT"],
            Component::Streets => &["STREET.DAT"],
            Component::ReductionFactors => &["ARF.DAT"],
            Component::MultipleChannels => &["MULT.DAT", "SIMPLE_MULT.DAT"],
            Component::Sediment => &["SED.DAT"],
            Component::Levee => &["LEVEE.DAT"],
            Component::FloodplainXsec => &["FPXSEC.DAT"],
            Component::Breach => &["BREACH.DAT"],
            Component::CellArray(kind) => cell_array_files(*kind),
            Component::Gutter => &["GUTTER.DAT"],
            Component::StormDrainInlets => &["SWMMFLO.DAT"],
            Component::StormDrainRatingTables => &["SWMMFLORT.DAT"],
            Component::StormDrainOutfalls => &["SWMMOUTF.DAT"],
            Component::WaterSurface => &["WSURF.DAT"],
            Component::WaterSurfaceTime => &["WSTIME.DAT"],
            Component::SwmmInp => &["SWMM.INP"],
        }
    }

    /// Control switches of which at least one must be on for export.
    pub fn gates(&self) -> &'static [&'static str] {
        match self {
            Component::Rain => &["IRAIN"],
            Component::Infiltration => &["INFIL"],
            Component::Evaporation => &["IEVAP"],
            Component::Channels => &["ICHANNEL"],
            Component::HydraulicStructures => &["IHYDRSTRUCT"],
            Component::Streets => &["MSTREET"],
            Component::ReductionFactors => &["IWRFS"],
            Component::MultipleChannels => &["IMULTC"],
            Component::Sediment => &["MUD", "ISED"],
            Component::Levee | Component::Breach => &["LEVEE"],
            Component::StormDrainInlets
            | Component::StormDrainRatingTables
            | Component::StormDrainOutfalls
            | Component::SwmmInp => &["SWMM"],
            Component::CellArray(kind) => match kind {
                CellArrayKind::SdDropBox | CellArrayKind::SdClogging => &["SWMM"],
                _ => &[],
            },
            _ => &[],
        }
    }

    pub fn is_enabled(&self, control: &Control) -> bool {
        let gates = self.gates();
        gates.is_empty() || gates.iter().any(|g| control.switch(g))
    }
}

fn cell_array_files(kind: CellArrayKind) -> &'static [&'static str] {
    match kind {
        CellArrayKind::FpFroude => &["FPFROUDE.DAT"],
        CellArrayKind::SteepSlopeN => &["STEEP_SLOPEN.DAT"],
        CellArrayKind::LidVolume => &["LID_VOLUME.DAT"],
        CellArrayKind::ShallowNSpatial => &["SHALLOWN_SPATIAL.DAT"],
        CellArrayKind::TolSpatial => &["TOLSPATIAL.DAT"],
        CellArrayKind::Tailings => &["TAILINGS.DAT"],
        CellArrayKind::TailingsCv => &["TAILINGS_CV.DAT"],
        CellArrayKind::TailingsStackDepth => &["TAILINGS_STACK_DEPTH.DAT"],
        CellArrayKind::SdDropBox => &["SWMMFLODROPBOX.DAT"],
        CellArrayKind::SdClogging => &["SDCLOGGING.DAT"],
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Control => "Control",
            Component::Grid => "Grid",
            Component::Inflow => "Inflow",
            Component::Outflow => "Outflow",
            Component::Rain => "Rain",
            Component::Infiltration => "Infiltration",
            Component::Evaporation => "Evaporation",
            Component::Channels => "Channels",
            Component::HydraulicStructures => "Hydraulic Structures",
            Component::Streets => "Streets",
            Component::ReductionFactors => "Reduction Factors",
            Component::MultipleChannels => "Multiple Channels",
            Component::Sediment => "Sediment",
            Component::Levee => "Levee",
            Component::FloodplainXsec => "Floodplain Cross Sections",
            Component::Breach => "Breach",
            Component::CellArray(kind) => kind.spec().file,
            Component::Gutter => "Gutter",
            Component::StormDrainInlets => "Storm Drain Inlets",
            Component::StormDrainRatingTables => "Storm Drain Rating Tables",
            Component::StormDrainOutfalls => "Storm Drain Outfalls",
            Component::WaterSurface => "Water Surface",
            Component::WaterSurfaceTime => "Water Surface Time",
            Component::SwmmInp => "SWMM.INP",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_unique_and_resolvable() {
        let order = Component::import_order();
        for c in &order {
            assert_eq!(Component::from_key(c.key()), Some(*c));
        }
        let mut keys: Vec<_> = order.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), order.len());
    }

    #[test]
    fn control_and_grid_come_first_and_inlets_precede_rating_tables() {
        let order = Component::import_order();
        assert_eq!(order[0], Component::Control);
        assert_eq!(order[1], Component::Grid);
        let inlets = order.iter().position(|c| *c == Component::StormDrainInlets);
        let tables = order
            .iter()
            .position(|c| *c == Component::StormDrainRatingTables);
        assert!(inlets < tables);
    }

    #[test]
    fn sediment_is_enabled_by_either_switch() {
        let control = Control::from_pairs([("MUD", "0"), ("ISED", "1")]);
        assert!(Component::Sediment.is_enabled(&control));
        assert!(!Component::Levee.is_enabled(&control));
        assert!(Component::Grid.is_enabled(&control));
    }
}
