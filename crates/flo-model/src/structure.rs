//! Hydraulic structures (HYSTRUC.DAT, BRIDGE_XSEC.DAT).

use serde::{Deserialize, Serialize};

/// First `B` row of a bridge record.
pub const BRIDGE_FIRST_FIELDS: [&str; 9] = [
    "ibtype",
    "coeff",
    "c_prime_user",
    "kf_coef",
    "kww_coef",
    "kphi_coef",
    "ky_coef",
    "kx_coef",
    "kj_coef",
];

/// Second `B` row of a bridge record.
pub const BRIDGE_SECOND_FIELDS: [&str; 15] = [
    "bopening",
    "blength",
    "bn_value",
    "uplength12",
    "lowchord",
    "deckht",
    "decklength",
    "pierwidth",
    "sluicecoefadj",
    "orificecoefadj",
    "coeffweirb",
    "wingwall_angle",
    "phi",
    "lbtoeabut",
    "rbtoeabut",
];

/// `C` and `R` rows share this layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingCurve {
    pub depth: f64,
    pub qcoef: f64,
    pub qexp: f64,
    pub acoef: f64,
    pub aexp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingTableRow {
    pub hdepth: f64,
    pub qtable: f64,
    pub atable: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CulvertEquation {
    pub typec: i64,
    pub typeen: i64,
    pub culvertn: f64,
    pub ke: f64,
    pub cubase: f64,
    pub multbarrels: i64,
}

/// A bridge record assembled from consecutive `B` rows. An odd number of
/// rows leaves the last record without its second half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeVariables {
    pub first: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeXsPoint {
    pub xup: f64,
    pub yup: f64,
    pub yb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub name: String,
    pub ifporchan: i64,
    /// 0 rating curve, 1 rating table, 2 culvert equation, 3 bridge.
    pub icurvtable: i64,
    pub inflonod: i64,
    pub outflonod: i64,
    pub inoutcont: i64,
    pub headrefel: f64,
    pub clength: f64,
    pub cdiameter: f64,
    #[serde(default)]
    pub rating_curves: Vec<RatingCurve>,
    #[serde(default)]
    pub repl_rating_curves: Vec<RatingCurve>,
    #[serde(default)]
    pub rating_table: Vec<RatingTableRow>,
    #[serde(default)]
    pub culverts: Vec<CulvertEquation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storm_drain_cap: Option<f64>,
    #[serde(default)]
    pub bridges: Vec<BridgeVariables>,
    #[serde(default)]
    pub bridge_xs: Vec<BridgeXsPoint>,
}

impl Structure {
    pub fn new(name: impl Into<String>, inflonod: i64, outflonod: i64) -> Self {
        Self {
            name: name.into(),
            ifporchan: 0,
            icurvtable: 0,
            inflonod,
            outflonod,
            inoutcont: 0,
            headrefel: 0.0,
            clength: 0.0,
            cdiameter: 0.0,
            rating_curves: Vec::new(),
            repl_rating_curves: Vec::new(),
            rating_table: Vec::new(),
            culverts: Vec::new(),
            storm_drain_cap: None,
            bridges: Vec::new(),
            bridge_xs: Vec::new(),
        }
    }

    pub fn is_bridge(&self) -> bool {
        self.icurvtable == 3
    }

    /// Feeds one `B` row: completes the open record or starts a new one.
    pub fn push_bridge_row(&mut self, values: Vec<f64>) {
        match self.bridges.last_mut() {
            Some(last) if last.second.is_none() => last.second = Some(values),
            _ => self.bridges.push(BridgeVariables {
                first: values,
                second: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureData {
    #[serde(default)]
    pub structures: Vec<Structure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_rows_pair_up_and_odd_row_is_kept_as_half() {
        let mut s = Structure::new("BR1", 10, 11);
        s.push_bridge_row(vec![1.0; 9]);
        s.push_bridge_row(vec![2.0; 15]);
        s.push_bridge_row(vec![3.0; 9]);
        assert_eq!(s.bridges.len(), 2);
        assert_eq!(s.bridges[0].second.as_ref().map(Vec::len), Some(15));
        assert!(s.bridges[1].second.is_none());
    }
}
