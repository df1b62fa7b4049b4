//! Levees and breach parameters.

use serde::{Deserialize, Serialize};

/// Field names of a four-line breach group (8 + 7 + 7 + 6).
pub const BREACH_FIELDS: [&str; 28] = [
    "zu",
    "zd",
    "zc",
    "crestwidth",
    "crestlength",
    "brbotwidmax",
    "brtopwidmax",
    "brbottel",
    "d50c",
    "porc",
    "uwc",
    "cnc",
    "afrc",
    "cohc",
    "unfcc",
    "d50s",
    "pors",
    "uws",
    "cns",
    "afrs",
    "cohs",
    "unfcs",
    "grasslength",
    "grasscond",
    "grassvmaxp",
    "sedconmax",
    "d50df",
    "unfcdf",
];

/// Fields per line of a breach group.
pub const BREACH_LINE_WIDTHS: [usize; 4] = [8, 7, 7, 6];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeveeDirection {
    pub dir: i64,
    pub crest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveeCell {
    pub grid: i64,
    #[serde(default)]
    pub directions: Vec<LeveeDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeveeWall {
    pub dir: i64,
    pub failevel: f64,
    pub failtime: f64,
    pub levbase: f64,
    pub failwidthmax: f64,
    pub failrate: f64,
    pub failwidrate: f64,
}

impl LeveeWall {
    /// A wall is stored only when at least one of its seven values is set.
    pub fn is_meaningful(&self) -> bool {
        self.dir != 0
            || [
                self.failevel,
                self.failtime,
                self.levbase,
                self.failwidthmax,
                self.failrate,
                self.failwidrate,
            ]
            .iter()
            .any(|v| *v != 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeveeFailureCell {
    pub grid: i64,
    #[serde(default)]
    pub walls: Vec<LeveeWall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragility {
    pub fragchar: String,
    pub prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFragility {
    pub grid: i64,
    pub fragchar: String,
    pub prob: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeveeData {
    pub raiselev: f64,
    pub ilevfail: i64,
    #[serde(default)]
    pub cells: Vec<LeveeCell>,
    #[serde(default)]
    pub failures: Vec<LeveeFailureCell>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_fragility: Option<Fragility>,
    #[serde(default)]
    pub fragility: Vec<CellFragility>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachLocal {
    pub grid: i64,
    pub params: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachFragility {
    pub fragchar: String,
    pub prfail: f64,
    pub prdepth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreachData {
    /// Global group values in `BREACH_FIELDS` order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<Vec<f64>>,
    #[serde(default)]
    pub locals: Vec<BreachLocal>,
    #[serde(default)]
    pub fragility: Vec<BreachFragility>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breach_widths_cover_all_fields() {
        assert_eq!(BREACH_LINE_WIDTHS.iter().sum::<usize>(), BREACH_FIELDS.len());
    }

    #[test]
    fn all_zero_wall_is_not_meaningful() {
        let mut wall = LeveeWall {
            dir: 0,
            failevel: 0.0,
            failtime: 0.0,
            levbase: 0.0,
            failwidthmax: 0.0,
            failrate: 0.0,
            failwidrate: 0.0,
        };
        assert!(!wall.is_meaningful());
        wall.failrate = 0.2;
        assert!(wall.is_meaningful());
    }
}
