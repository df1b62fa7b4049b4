//! Rainfall, infiltration and evaporation.

use serde::{Deserialize, Serialize};

use crate::{CellValue, TimeValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainData {
    pub irainreal: i64,
    pub irainbuilding: i64,
    pub rtt: f64,
    pub rainabs: f64,
    pub irainarf: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movingstorm: Option<i64>,
    #[serde(default)]
    pub series: Vec<TimeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainspeed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iraindir: Option<i64>,
    #[serde(default)]
    pub arf: Vec<CellValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenAmptGlobal {
    pub abstr: f64,
    pub sati: f64,
    pub satf: f64,
    pub poros: f64,
    pub soild: f64,
    pub infchan: i64,
    pub hydcall: f64,
    pub soilall: f64,
    pub hydcadj: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydcxx: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScsGlobal {
    pub scsnall: f64,
    pub abstr1: f64,
}

/// Global Horton parameters.
///
/// `fhortonia` comes from its own header line while the `I` row carries the
/// remaining three; both are kept under their own names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HortonGlobal {
    pub fhortonia: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fhortoni: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fhortonf: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decaya: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfilChannelSeg {
    pub seg: i64,
    pub hydcx: f64,
    pub hydcxfinal: f64,
    pub soildepthcx: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreenAmptCell {
    pub grid: i64,
    pub hydc: f64,
    pub soils: f64,
    pub dtheta: f64,
    pub abstrinf: f64,
    pub rtimpf: f64,
    pub soil_depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HortonCell {
    pub grid: i64,
    pub fhorti: f64,
    pub fhortf: f64,
    pub deca: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfilData {
    /// 1 Green-Ampt, 2 SCS, 3 both, 4 Horton.
    pub method: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_ampt: Option<GreenAmptGlobal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scs: Option<ScsGlobal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horton: Option<HortonGlobal>,
    #[serde(default)]
    pub channel_segs: Vec<InfilChannelSeg>,
    #[serde(default)]
    pub green_ampt_cells: Vec<GreenAmptCell>,
    #[serde(default)]
    pub scs_cells: Vec<CellValue>,
    /// Channel element hydraulic conductivity (`C` rows).
    #[serde(default)]
    pub channel_cells: Vec<CellValue>,
    #[serde(default)]
    pub horton_cells: Vec<HortonCell>,
}

impl InfilData {
    pub fn uses_green_ampt(&self) -> bool {
        matches!(self.method, 1 | 3)
    }

    pub fn uses_scs(&self) -> bool {
        matches!(self.method, 2 | 3)
    }

    pub fn uses_horton(&self) -> bool {
        self.method == 4
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvapMonth {
    pub month: String,
    pub monthly_evap: f64,
    #[serde(default)]
    pub hourly: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvapData {
    pub ievapmonth: i64,
    pub iday: i64,
    pub clocktime: f64,
    #[serde(default)]
    pub months: Vec<EvapMonth>,
}
