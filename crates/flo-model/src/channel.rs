//! Channel segments, elements and cross sections.

use serde::{Deserialize, Serialize};

/// Rectangular section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectShape {
    pub bankell: f64,
    pub bankelr: f64,
    pub fcw: f64,
    pub fcd: f64,
}

/// Variable-area section; `lower` holds a1 a2 b1 b2 c1 c2, `upper` a11 a22 b11 b22 c11 c22.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarShape {
    pub fcd: f64,
    pub lower: [f64; 6],
    pub excdep: f64,
    pub upper: [f64; 6],
    pub bankell: f64,
    pub bankelr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapShape {
    pub bankell: f64,
    pub bankelr: f64,
    pub fcw: f64,
    pub fcd: f64,
    pub zl: f64,
    pub zr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelShape {
    R(RectShape),
    V(VarShape),
    T(TrapShape),
    N { nxsecnum: i64 },
}

impl ChannelShape {
    pub fn code(&self) -> &'static str {
        match self {
            ChannelShape::R(_) => "R",
            ChannelShape::V(_) => "V",
            ChannelShape::T(_) => "T",
            ChannelShape::N { .. } => "N",
        }
    }

    /// Token positions of `fcn` and `xlen` in the shape row (tag at 0).
    pub fn fcn_xlen_positions(code: &str) -> Option<(usize, usize)> {
        match code {
            "R" => Some((4, 7)),
            "V" => Some((2, 4)),
            "T" => Some((4, 7)),
            "N" => Some((2, 3)),
            _ => None,
        }
    }

    /// Minimum row length including the tag.
    pub fn row_len(code: &str) -> Option<usize> {
        match code {
            "R" => Some(8),
            "V" => Some(20),
            "T" => Some(10),
            "N" => Some(4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelElement {
    pub grid: i64,
    pub rbankgrid: i64,
    pub fcn: f64,
    pub xlen: f64,
    pub shape: ChannelShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confluence {
    pub tributary: i64,
    pub main: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelWse {
    pub istart: i64,
    pub wselstart: f64,
    pub iend: i64,
    pub wselend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSegment {
    pub depinitial: f64,
    pub froudc: f64,
    pub roughadj: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isedn: Option<i64>,
    #[serde(default)]
    pub elements: Vec<ChannelElement>,
    #[serde(default)]
    pub confluences: Vec<Confluence>,
    #[serde(default)]
    pub no_exchange: Vec<i64>,
    #[serde(default)]
    pub wse: Vec<ChannelWse>,
}

impl ChannelSegment {
    pub fn new(depinitial: f64, froudc: f64, roughadj: f64, isedn: Option<i64>) -> Self {
        Self {
            depinitial,
            froudc,
            roughadj,
            isedn,
            elements: Vec::new(),
            confluences: Vec::new(),
            no_exchange: Vec::new(),
            wse: Vec::new(),
        }
    }
}

/// Natural cross section: ordered `(station, elevation)` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XSection {
    pub nxsecnum: i64,
    pub name: String,
    #[serde(default)]
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelData {
    #[serde(default)]
    pub segments: Vec<ChannelSegment>,
    #[serde(default)]
    pub xsections: Vec<XSection>,
}

impl ChannelData {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.xsections.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.segments.iter().map(|s| s.elements.len()).sum()
    }
}
