//! Mudflow and sediment transport (SED.DAT).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MudGlobal {
    pub va: f64,
    pub vb: f64,
    pub ysa: f64,
    pub ysb: f64,
    pub sgsm: f64,
    pub xkx: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SedGlobal {
    pub isedeqg: i64,
    pub isedsizefrac: i64,
    pub dfifty: f64,
    pub sgrad: f64,
    pub sgst: f64,
    pub dryspwt: f64,
    pub cvfg: f64,
    pub isedsupply: i64,
    pub isedisplay: i64,
    pub scourdep: f64,
}

/// `Z` row with its `P` size fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SedGroup {
    pub isedeqi: i64,
    pub bedthick: f64,
    pub cvfi: f64,
    /// `(sediam, sedpercent)`.
    #[serde(default)]
    pub fractions: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MudArea {
    pub grid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debrisv: Option<f64>,
}

/// `S` row with its `N` supply fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SedSupply {
    pub grid: i64,
    pub isedcfp: i64,
    pub ased: f64,
    pub bsed: f64,
    /// `(ssediam, ssedpercent)`.
    #[serde(default)]
    pub fractions: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SedGroupCell {
    pub grid: i64,
    pub group: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mud: Option<MudGlobal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sed: Option<SedGlobal>,
    #[serde(default)]
    pub groups: Vec<SedGroup>,
    #[serde(default)]
    pub mud_areas: Vec<MudArea>,
    #[serde(default)]
    pub rigid_cells: Vec<i64>,
    #[serde(default)]
    pub supply: Vec<SedSupply>,
    #[serde(default)]
    pub group_cells: Vec<SedGroupCell>,
}

impl SedData {
    pub fn is_empty(&self) -> bool {
        self.mud.is_none()
            && self.sed.is_none()
            && self.groups.is_empty()
            && self.mud_areas.is_empty()
            && self.rigid_cells.is_empty()
            && self.supply.is_empty()
            && self.group_cells.is_empty()
    }
}
