//! Area/width reduction factors and multiple channels.

use serde::{Deserialize, Serialize};

/// Splits a signed ARF grid id into `(grid, collapse)`.
pub fn decode_arf_grid(signed: i64) -> (i64, bool) {
    (signed.abs(), signed < 0)
}

pub fn encode_arf_grid(grid: i64, collapse: bool) -> i64 {
    if collapse { -grid.abs() } else { grid.abs() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCell {
    pub grid: i64,
    pub collapse: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialBlock {
    pub grid: i64,
    pub collapse: bool,
    pub arf: f64,
    /// N, E, S, W, NE, SE, SW, NW.
    pub wrf: [f64; 8],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArfData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iarfblockmod: Option<i64>,
    #[serde(default)]
    pub totally: Vec<BlockedCell>,
    #[serde(default)]
    pub partially: Vec<PartialBlock>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultGlobal {
    pub wmc: f64,
    pub wdrall: f64,
    pub dmall: f64,
    pub nodchnsall: f64,
    pub xnmultall: f64,
    pub sslopemin: f64,
    pub sslopemax: f64,
    pub avuld50: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultCell {
    pub grid: i64,
    pub wdr: f64,
    pub dm: f64,
    pub nodchns: f64,
    pub xnmult: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleMult {
    pub simple_n: f64,
    #[serde(default)]
    pub cells: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<MultGlobal>,
    #[serde(default)]
    pub cells: Vec<MultCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple: Option<SimpleMult>,
}

impl MultData {
    /// Simplified cells that are not also full multi-channel cells, plus the dropped repeats.
    pub fn simple_cells_without_repeats(&self) -> (Vec<i64>, Vec<i64>) {
        let full: std::collections::HashSet<i64> = self.cells.iter().map(|c| c.grid).collect();
        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        if let Some(simple) = &self.simple {
            for &grid in &simple.cells {
                if full.contains(&grid) {
                    dropped.push(grid);
                } else {
                    kept.push(grid);
                }
            }
        }
        (kept, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arf_sign_encodes_collapse() {
        assert_eq!(decode_arf_grid(-42), (42, true));
        assert_eq!(decode_arf_grid(42), (42, false));
        assert_eq!(encode_arf_grid(42, true), -42);
        assert_eq!(encode_arf_grid(42, false), 42);
    }

    #[test]
    fn simple_mult_repeats_are_dropped() {
        let data = MultData {
            global: None,
            cells: vec![MultCell {
                grid: 3,
                wdr: 1.0,
                dm: 1.0,
                nodchns: 1.0,
                xnmult: 0.04,
            }],
            simple: Some(SimpleMult {
                simple_n: 0.1,
                cells: vec![1, 3, 5],
            }),
        };
        let (kept, dropped) = data.simple_cells_without_repeats();
        assert_eq!(kept, vec![1, 5]);
        assert_eq!(dropped, vec![3]);
    }
}
