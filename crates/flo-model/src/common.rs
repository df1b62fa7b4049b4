use serde::{Deserialize, Serialize};

/// `grid value` pair used by the many single-valued per-cell arrays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    pub grid: i64,
    pub value: f64,
}

impl CellValue {
    pub fn new(grid: i64, value: f64) -> Self {
        Self { grid, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    pub time: f64,
    pub value: f64,
}

impl TimeValue {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}
