//! Storm drain inlets, rating tables, outfalls and the raw SWMM.INP.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inlet {
    /// Leading row character, usually `D`.
    pub tag: String,
    pub grid: i64,
    pub name: String,
    pub intype: i64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub coeff: f64,
    pub feature: i64,
    pub curbheight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InletData {
    #[serde(default)]
    pub inlets: Vec<Inlet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdRatingTable {
    pub grid: i64,
    pub name: String,
    /// `(depth, q)`.
    #[serde(default)]
    pub rows: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdCulvert {
    pub grid: i64,
    pub name: String,
    pub cdiameter: f64,
    pub typec: i64,
    pub typeen: i64,
    pub cubase: f64,
    pub multbarrels: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SdRatingBlock {
    Table(SdRatingTable),
    Culvert(SdCulvert),
}

impl SdRatingBlock {
    pub fn name(&self) -> &str {
        match self {
            SdRatingBlock::Table(t) => &t.name,
            SdRatingBlock::Culvert(c) => &c.name,
        }
    }

    pub fn grid(&self) -> i64 {
        match self {
            SdRatingBlock::Table(t) => t.grid,
            SdRatingBlock::Culvert(c) => c.grid,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingTableData {
    #[serde(default)]
    pub blocks: Vec<SdRatingBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfall {
    pub name: String,
    pub grid: i64,
    pub outf_flo: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutfallData {
    #[serde(default)]
    pub outfalls: Vec<Outfall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InpSection {
    /// Header without brackets; empty for lines before the first header.
    pub name: String,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwmmInp {
    #[serde(default)]
    pub sections: Vec<InpSection>,
}

impl SwmmInp {
    /// Splits raw text into sections, dropping blank lines.
    pub fn from_text(text: &str) -> Self {
        let mut sections: Vec<InpSection> = Vec::new();
        for raw in text.lines() {
            let line = raw.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            let trimmed = line.trim();
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                sections.push(InpSection {
                    name: trimmed[1..trimmed.len() - 1].to_string(),
                    lines: Vec::new(),
                });
                continue;
            }
            if sections.is_empty() {
                sections.push(InpSection {
                    name: String::new(),
                    lines: Vec::new(),
                });
            }
            if let Some(current) = sections.last_mut() {
                current.lines.push(line.to_string());
            }
        }
        Self { sections }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if !section.name.is_empty() {
                out.push('[');
                out.push_str(&section.name);
                out.push_str("]\n");
            }
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    pub fn line_count(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inp_sections_survive_text_round_trip() {
        let text = "[TITLE]\nDemo project\n\n[JUNCTIONS]\n;;Name Elev\nJ1   10.0\n";
        let inp = SwmmInp::from_text(text);
        assert_eq!(inp.sections.len(), 2);
        assert_eq!(inp.sections[1].name, "JUNCTIONS");
        assert_eq!(inp.sections[1].lines, vec![";;Name Elev", "J1   10.0"]);
        assert_eq!(SwmmInp::from_text(&inp.to_text()), inp);
    }
}
