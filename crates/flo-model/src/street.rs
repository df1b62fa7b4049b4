use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetGlobal {
    pub strman: f64,
    pub istrflo: i64,
    pub strfno: f64,
    pub depx: f64,
    pub widst: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreetWing {
    /// Compass direction code 1..=8.
    pub istdir: i64,
    pub widr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreetSegment {
    pub grid: i64,
    pub depex: f64,
    pub stman: f64,
    pub elstr: f64,
    #[serde(default)]
    pub wings: Vec<StreetWing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Street {
    pub name: String,
    #[serde(default)]
    pub segments: Vec<StreetSegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<StreetGlobal>,
    #[serde(default)]
    pub streets: Vec<Street>,
}
