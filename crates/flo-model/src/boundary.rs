//! Boundary conditions: inflows, reservoirs and outflows.

use serde::{Deserialize, Serialize};

use crate::TimeValue;

/// Reservoir n-value used when the row does not carry one.
pub const DEFAULT_RESERVOIR_N: f64 = 0.25;
/// Stored tailings value meaning "not set".
pub const TAILINGS_UNSET: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InflowKind {
    Floodplain,
    Channel,
}

impl InflowKind {
    pub fn tag(self) -> &'static str {
        match self {
            InflowKind::Floodplain => "F",
            InflowKind::Channel => "C",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "F" => Some(InflowKind::Floodplain),
            "C" => Some(InflowKind::Channel),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            InflowKind::Floodplain => 0,
            InflowKind::Channel => 1,
        }
    }

    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            InflowKind::Channel
        } else {
            InflowKind::Floodplain
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub time: f64,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inflow {
    pub kind: InflowKind,
    /// 0 = inflow, 1 = outflow.
    pub inoutfc: i64,
    pub grid: i64,
    #[serde(default)]
    pub series: Vec<SeriesRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservoir {
    pub grid: i64,
    pub wsel: f64,
    pub n_value: f64,
    pub use_n_value: bool,
    pub tailings: f64,
}

impl Reservoir {
    /// Resolves the optional trailing values of an `R` row by magnitude:
    /// anything above 1 is a tailings depth, the rest an n-value.
    pub fn from_row(grid: i64, wsel: f64, extras: &[f64]) -> Self {
        let mut res = Reservoir {
            grid,
            wsel,
            n_value: DEFAULT_RESERVOIR_N,
            use_n_value: false,
            tailings: TAILINGS_UNSET,
        };
        for &v in extras {
            if v > 1.0 {
                res.tailings = v;
            } else {
                res.n_value = v;
                res.use_n_value = true;
            }
        }
        res
    }

    pub fn has_tailings(&self) -> bool {
        self.tailings >= 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InflowData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ihourdaily: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideplt: Option<i64>,
    #[serde(default)]
    pub inflows: Vec<Inflow>,
    #[serde(default)]
    pub reservoirs: Vec<Reservoir>,
}

impl InflowData {
    pub fn is_empty(&self) -> bool {
        self.inflows.is_empty() && self.reservoirs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QhParam {
    pub hmax: f64,
    pub coef: f64,
    pub exponent: f64,
}

/// One outflow cell. All OUTFLOW.DAT lines naming the same grid merge here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutflowCell {
    pub grid: i64,
    pub chan_out: i64,
    pub fp_out: i64,
    pub hydro_out: i64,
    #[serde(default)]
    pub qh_params: Vec<QhParam>,
    /// `(depth, q)` rows.
    #[serde(default)]
    pub qh_table: Vec<[f64; 2]>,
    #[serde(default)]
    pub chan_tser: Vec<TimeValue>,
    #[serde(default)]
    pub fp_tser: Vec<TimeValue>,
}

impl OutflowCell {
    pub fn new(grid: i64) -> Self {
        Self {
            grid,
            ..Default::default()
        }
    }

    pub fn flags(&self) -> OutflowFlags {
        OutflowFlags {
            chan_out: self.chan_out,
            fp_out: self.fp_out,
            hydro_out: self.hydro_out,
            chan_tser: self.chan_tser.len() as i64,
            chan_qhpar: self.qh_params.len() as i64,
            chan_qhtab: self.qh_table.len() as i64,
            fp_tser: self.fp_tser.len() as i64,
        }
    }

    pub fn outflow_type(&self) -> i64 {
        outflow_type(self.flags())
    }

    /// Whether a `K` block is needed to carry this cell.
    pub fn has_channel_block(&self) -> bool {
        self.chan_out > 0
            || !self.qh_params.is_empty()
            || !self.qh_table.is_empty()
            || !self.chan_tser.is_empty()
    }

    /// Whether an `N` block is needed. A plain free-floodplain cell with
    /// code 1 and no stage series is written as an `O` line instead.
    pub fn has_floodplain_block(&self) -> bool {
        !self.fp_tser.is_empty() || self.fp_out > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutflowData {
    #[serde(default)]
    pub cells: Vec<OutflowCell>,
}

impl OutflowData {
    /// Returns the record for `grid`, creating it in first-seen order.
    pub fn cell_mut(&mut self, grid: i64) -> &mut OutflowCell {
        let idx = match self.cells.iter().position(|c| c.grid == grid) {
            Some(idx) => idx,
            None => {
                self.cells.push(OutflowCell::new(grid));
                self.cells.len() - 1
            }
        };
        &mut self.cells[idx]
    }
}

/// Presence inputs of the outflow type function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutflowFlags {
    pub chan_out: i64,
    pub fp_out: i64,
    pub hydro_out: i64,
    pub chan_tser: i64,
    pub chan_qhpar: i64,
    pub chan_qhtab: i64,
    pub fp_tser: i64,
}

/// Outflow type 0..=11, first matching rule wins.
pub fn outflow_type(f: OutflowFlags) -> i64 {
    if f.fp_out > 0 && f.chan_out == 0 && f.fp_tser == 0 {
        1
    } else if f.fp_out == 0
        && f.chan_out > 0
        && f.chan_tser == 0
        && f.chan_qhpar == 0
        && f.chan_qhtab == 0
    {
        2
    } else if f.fp_out > 0 && f.chan_out > 0 {
        3
    } else if f.hydro_out > 0 {
        4
    } else if f.fp_out == 0 && f.fp_tser > 0 {
        5
    } else if f.chan_out == 0 && f.chan_tser > 0 {
        6
    } else if f.fp_out > 0 && f.fp_tser > 0 {
        7
    } else if f.chan_out > 0 && f.chan_tser > 0 {
        8
    } else if f.chan_qhpar > 0 {
        10
    } else if f.chan_qhtab > 0 {
        11
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reservoir_magnitude_disambiguation() {
        let tailings = Reservoir::from_row(100, 500.0, &[2.5]);
        assert_eq!(tailings.tailings, 2.5);
        assert_eq!(tailings.n_value, DEFAULT_RESERVOIR_N);
        assert!(!tailings.use_n_value);

        let n = Reservoir::from_row(100, 500.0, &[0.03]);
        assert_eq!(n.n_value, 0.03);
        assert!(n.use_n_value);
        assert_eq!(n.tailings, TAILINGS_UNSET);

        let both = Reservoir::from_row(7, 10.0, &[0.05, 3.0]);
        assert_eq!((both.n_value, both.tailings), (0.05, 3.0));
    }

    #[test]
    fn single_channel_outflow_is_type_2() {
        let mut cell = OutflowCell::new(17);
        cell.chan_out = 1;
        assert_eq!(cell.outflow_type(), 2);
    }

    #[test]
    fn table_rows() {
        let f = |chan_out, fp_out, hydro_out, chan_tser, chan_qhpar, chan_qhtab, fp_tser| {
            outflow_type(OutflowFlags {
                chan_out,
                fp_out,
                hydro_out,
                chan_tser,
                chan_qhpar,
                chan_qhtab,
                fp_tser,
            })
        };
        assert_eq!(f(0, 1, 0, 0, 0, 0, 0), 1);
        assert_eq!(f(1, 1, 0, 0, 0, 0, 0), 3);
        assert_eq!(f(0, 0, 2, 0, 0, 0, 0), 4);
        assert_eq!(f(0, 0, 0, 0, 0, 0, 3), 5);
        assert_eq!(f(0, 0, 0, 4, 0, 0, 0), 6);
        assert_eq!(f(0, 1, 0, 0, 0, 0, 2), 7);
        assert_eq!(f(1, 0, 0, 2, 0, 0, 0), 8);
        assert_eq!(f(1, 0, 0, 0, 1, 0, 0), 10);
        assert_eq!(f(1, 0, 0, 0, 0, 1, 0), 11);
        assert_eq!(f(0, 0, 0, 0, 0, 0, 0), 0);
    }

    #[test]
    fn cells_merge_by_grid() {
        let mut data = OutflowData::default();
        data.cell_mut(5).chan_out = 1;
        data.cell_mut(9).fp_out = 1;
        data.cell_mut(5).hydro_out = 2;
        assert_eq!(data.cells.len(), 2);
        assert_eq!(data.cells[0].hydro_out, 2);
    }

    proptest! {
        #[test]
        fn type_depends_only_on_flags(
            chan_out in 0_i64..3,
            fp_out in 0_i64..3,
            hydro_out in 0_i64..10,
            chan_tser in 0_usize..3,
            chan_qhpar in 0_usize..3,
            chan_qhtab in 0_usize..3,
            fp_tser in 0_usize..3,
        ) {
            let mut cell = OutflowCell::new(1);
            cell.chan_out = chan_out;
            cell.fp_out = fp_out;
            cell.hydro_out = hydro_out;
            cell.chan_tser = vec![TimeValue::new(0.0, 1.0); chan_tser];
            cell.qh_params = vec![QhParam { hmax: 1.0, coef: 2.0, exponent: 0.5 }; chan_qhpar];
            cell.qh_table = vec![[0.0, 0.0]; chan_qhtab];
            cell.fp_tser = vec![TimeValue::new(0.0, 1.0); fp_tser];

            let mut other = cell.clone();
            other.grid = 99;
            for row in other.chan_tser.iter_mut() {
                row.value = 42.0;
            }
            let t = cell.outflow_type();
            prop_assert_eq!(t, other.outflow_type());
            prop_assert!((0..=11).contains(&t) && t != 9);
            if fp_out > 0 && chan_out > 0 {
                prop_assert!(t == 1 || t == 3);
            }
        }
    }
}
