//! The FLO-2D control mapping (`cont` table).
//!
//! Values are kept as the strings that were read so that re-export is
//! verbatim; typed accessors parse on demand.

use std::collections::BTreeMap;

use flo_core::{parse_int, parse_real};
use serde::{Deserialize, Serialize};

/// Parameters owned by CONT.DAT.
pub const CONT_NAMES: &[&str] = &[
    "SIMUL",
    "TOUT",
    "LGPLOT",
    "METRIC",
    "IBACKUP",
    "build",
    "ICHANNEL",
    "MSTREET",
    "LEVEE",
    "IWRFS",
    "IMULTC",
    "IRAIN",
    "INFIL",
    "IEVAP",
    "MUD",
    "ISED",
    "IMODFLOW",
    "SWMM",
    "IHYDRSTRUCT",
    "IFLOODWAY",
    "IDEBRV",
    "AMANN",
    "DEPTHDUR",
    "XCONC",
    "XARF",
    "FROUDL",
    "SHALLOWN",
    "ENCROACH",
    "NOPRTFP",
    "DEPRESSDEPTH",
    "NOPRTC",
    "ITIMTEP",
    "TIMTEP",
    "STARTIMTEP",
    "ENDTIMTEP",
    "GRAPTIM",
];

/// Parameters owned by TOLER.DAT.
pub const TOLER_NAMES: &[&str] = &[
    "TOLGLOBAL",
    "DEPTOL",
    "WAVEMAX",
    "COURCHAR_C",
    "COURANTFP",
    "COURANTC",
    "COURANTST",
    "COURCHAR_T",
    "TIME_ACCEL",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEntry {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    #[serde(default)]
    entries: BTreeMap<String, ControlEntry>,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut control = Self::new();
        for (name, value) in pairs {
            control.set(name, value);
        }
        control
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|e| e.value.as_str())
    }

    pub fn entry(&self, name: &str) -> Option<&ControlEntry> {
        self.entries.get(name)
    }

    /// Sets a value; the note defaults to the built-in description of the name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let note = default_note(name).map(str::to_string);
        self.entries.insert(
            name.to_string(),
            ControlEntry {
                value: value.into(),
                note,
            },
        );
    }

    pub fn set_entry(&mut self, name: &str, entry: ControlEntry) {
        self.entries.insert(name.to_string(), entry);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn real(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(parse_real)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(parse_int)
    }

    /// A switch is on when its value parses to a non-zero number.
    pub fn switch(&self, name: &str) -> bool {
        self.real(name).is_some_and(|v| v != 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ControlEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upserts every entry of `other`.
    pub fn merge(&mut self, other: &Control) {
        for (name, entry) in &other.entries {
            self.entries.insert(name.clone(), entry.clone());
        }
    }
}

/// Built-in one-line descriptions stored as the `note` column.
pub fn default_note(name: &str) -> Option<&'static str> {
    let note = match name {
        "SIMUL" => "Simulation time (hrs)",
        "TOUT" => "Output interval (hrs)",
        "LGPLOT" => "Graphical display switch",
        "METRIC" => "Metric units switch",
        "IBACKUP" => "Backup file switch",
        "ICHANNEL" => "Channel switch",
        "MSTREET" => "Street switch",
        "LEVEE" => "Levee switch",
        "IWRFS" => "Area and width reduction switch",
        "IMULTC" => "Multiple channel switch",
        "IRAIN" => "Rainfall switch",
        "INFIL" => "Infiltration switch",
        "IEVAP" => "Evaporation switch",
        "MUD" => "Mudflow switch",
        "ISED" => "Sediment transport switch",
        "IMODFLOW" => "MODFLOW coupling switch",
        "SWMM" => "Storm drain switch",
        "IHYDRSTRUCT" => "Hydraulic structure switch",
        "IFLOODWAY" => "Floodway switch",
        "IDEBRV" => "Debris basin switch",
        "AMANN" => "Manning n increment",
        "DEPTHDUR" => "Depth duration threshold",
        "XCONC" => "Global sediment concentration",
        "XARF" => "Global area reduction factor",
        "FROUDL" => "Global limiting Froude number",
        "SHALLOWN" => "Shallow flow Manning n",
        "ENCROACH" => "Floodway encroachment depth",
        "NOPRTFP" => "Floodplain output option",
        "DEPRESSDEPTH" => "Depression storage depth",
        "NOPRTC" => "Channel output option",
        "ITIMTEP" => "Time series output switch",
        "TIMTEP" => "Time series output interval",
        "STARTIMTEP" => "Time series output start",
        "ENDTIMTEP" => "Time series output end",
        "GRAPTIM" => "Graphical update interval",
        "TOLGLOBAL" => "Global depth tolerance",
        "DEPTOL" => "Percent change in depth",
        "WAVEMAX" => "Wave celerity limit",
        "COURANTFP" => "Floodplain Courant number",
        "COURANTC" => "Channel Courant number",
        "COURANTST" => "Street Courant number",
        "TIME_ACCEL" => "Timestep acceleration",
        "CELLSIZE" => "Grid cell size",
        "MANNING" => "Global Manning n",
        "IHOURDAILY" => "Inflow time base switch",
        "IDEPLT" => "Plotted inflow cell",
        "IARFBLOCKMOD" => "ARF blocking mode",
        "NXPRT" => "Floodplain cross section output switch",
        _ => return None,
    };
    Some(note)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_read_numeric_values() {
        let control = Control::from_pairs([("ICHANNEL", "1"), ("IRAIN", "0"), ("MUD", "x")]);
        assert!(control.switch("ICHANNEL"));
        assert!(!control.switch("IRAIN"));
        assert!(!control.switch("MUD"));
        assert!(!control.switch("SWMM"));
    }

    #[test]
    fn values_are_kept_verbatim() {
        let mut control = Control::new();
        control.set("ENDTIMTEP", "1.0");
        assert_eq!(control.get("ENDTIMTEP"), Some("1.0"));
        assert_eq!(control.real("ENDTIMTEP"), Some(1.0));
        assert_eq!(
            control.entry("ENDTIMTEP").and_then(|e| e.note.as_deref()),
            Some("Time series output end")
        );
    }
}
