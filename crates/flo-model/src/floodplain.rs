//! Floodplain cross sections, gutters, water surfaces and per-cell arrays.

use serde::{Deserialize, Serialize};

use crate::{CellArrayKind, CellValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FpXsec {
    pub iflo: i64,
    /// Cell count as declared by NNXSEC; may disagree with `cells`.
    pub nnxsec: i64,
    #[serde(default)]
    pub cells: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FpXsecData {
    pub nxprt: i64,
    #[serde(default)]
    pub sections: Vec<FpXsec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GutterGlobal {
    pub width: f64,
    pub height: f64,
    pub n_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GutterCell {
    pub grid: i64,
    pub width: f64,
    pub height: f64,
    pub n_value: f64,
    pub direction: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GutterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<GutterGlobal>,
    #[serde(default)]
    pub cells: Vec<GutterCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WsurfData {
    #[serde(default)]
    pub cells: Vec<CellValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WstimeCell {
    pub grid: i64,
    pub wselev: f64,
    pub time: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WstimeData {
    #[serde(default)]
    pub cells: Vec<WstimeCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellValues {
    pub grid: i64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellArrayData {
    pub kind: CellArrayKind,
    #[serde(default)]
    pub rows: Vec<CellValues>,
}

impl CellArrayData {
    pub fn new(kind: CellArrayKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }
}
