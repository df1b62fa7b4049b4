//! Grid cells (TOPO.DAT + MANNINGS_N.DAT).

use flo_core::geo::cell_size_from_centroids;
use flo_core::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub fid: i64,
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
    pub n_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_fid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_cell: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity_fid: Option<i64>,
}

impl GridCell {
    pub fn new(fid: i64, x: f64, y: f64, elevation: f64, n_value: f64) -> Self {
        Self {
            fid,
            x,
            y,
            elevation,
            n_value,
            domain_fid: None,
            domain_cell: None,
            connectivity_fid: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridData {
    pub cell_size: f64,
    pub cells: Vec<GridCell>,
    /// N, E, S, W, NE, SE, SW, NW per cell; empty when not yet derived.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbours: Vec<[i64; 8]>,
}

impl GridData {
    /// Builds the grid and infers the cell size from the centroids.
    ///
    /// `fallback` is used for single-cell grids where no spacing exists.
    pub fn from_cells(cells: Vec<GridCell>, fallback: Option<f64>) -> CodecResult<Self> {
        let xs: Vec<f64> = cells.iter().map(|c| c.x).collect();
        let ys: Vec<f64> = cells.iter().map(|c| c.y).collect();
        let cell_size = cell_size_from_centroids(&xs, &ys)
            .or(fallback)
            .ok_or_else(|| CodecError::domain("cannot infer cell size from a single cell"))?;
        if !(cell_size > 0.0) {
            return Err(CodecError::domain(format!(
                "cell size must be positive, got {}",
                cell_size
            )));
        }
        Ok(Self {
            cell_size,
            cells,
            neighbours: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_from_two_by_two() {
        let cells = vec![
            GridCell::new(1, 0.0, 0.0, 10.0, 0.04),
            GridCell::new(2, 100.0, 0.0, 11.0, 0.04),
            GridCell::new(3, 0.0, 100.0, 12.0, 0.04),
            GridCell::new(4, 100.0, 100.0, 13.0, 0.04),
        ];
        let grid = GridData::from_cells(cells, None).unwrap();
        assert_eq!(grid.cell_size, 100.0);
    }

    #[test]
    fn single_cell_needs_fallback() {
        let cells = vec![GridCell::new(1, 5.0, 5.0, 1.0, 0.04)];
        assert!(GridData::from_cells(cells.clone(), None).is_err());
        let grid = GridData::from_cells(cells, Some(30.0)).unwrap();
        assert_eq!(grid.cell_size, 30.0);
    }
}
