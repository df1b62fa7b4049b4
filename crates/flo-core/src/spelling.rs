//! Source spellings of numeric DAT tokens.
//!
//! Values travel as `f64`, so `0.040` and `0.04` collapse to the same
//! number. A spelling table remembers how each value was written, keyed by
//! file, leading tag and token position, and emitters consult it before
//! falling back to `fmt_real`.

use std::collections::BTreeMap;

use crate::{fmt_real, is_numeric, parse_real};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpellingKey {
    pub file: String,
    /// Leading token of the line, or `""` when the line starts with a number.
    pub tag: String,
    pub pos: usize,
    /// `f64::to_bits` of the parsed value.
    pub bits: u64,
}

impl SpellingKey {
    pub fn new(file: &str, tag: &str, pos: usize, value: f64) -> Self {
        Self {
            file: file.to_string(),
            tag: tag.to_string(),
            pos,
            bits: value.to_bits(),
        }
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits)
    }
}

/// The tag a line is filed under.
pub fn line_tag(first: &str) -> &str {
    if is_numeric(first) { "" } else { first }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSpellings {
    entries: BTreeMap<SpellingKey, String>,
}

impl NumberSpellings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans the text of `file`, keeping the first spelling met per key.
    /// Keys whose first spelling is already the shortest form are not stored.
    pub fn scan_text(&mut self, file: &str, text: &str) {
        let mut seen: BTreeMap<SpellingKey, String> = BTreeMap::new();
        for line in text.lines() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some(first) = tokens.first() else {
                continue;
            };
            let tag = line_tag(first);
            for (pos, token) in tokens.iter().enumerate() {
                let Some(value) = parse_real(token) else {
                    continue;
                };
                seen.entry(SpellingKey::new(file, tag, pos, value))
                    .or_insert_with(|| token.to_string());
            }
        }
        seen.retain(|key, text| fmt_real(key.value()) != *text);
        for (key, text) in seen {
            self.entries.entry(key).or_insert(text);
        }
    }

    pub fn insert(&mut self, key: SpellingKey, text: String) {
        self.entries.insert(key, text);
    }

    pub fn spell(&self, file: &str, tag: &str, pos: usize, value: f64) -> Option<&str> {
        self.entries
            .get(&SpellingKey::new(file, tag, pos, value))
            .map(String::as_str)
    }

    /// `value` as it was written at this place, else its shortest form.
    pub fn render(&self, file: &str, tag: &str, pos: usize, value: f64) -> String {
        match self.spell(file, tag, pos, value) {
            Some(text) => text.to_string(),
            None => fmt_real(value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SpellingKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn extend(&mut self, other: NumberSpellings) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_zeros_are_remembered_per_column() {
        let mut s = NumberSpellings::new();
        s.scan_text("MANNINGS_N.DAT", "1 0.040\n2 0.040\n3 0.05\n");
        assert_eq!(s.spell("MANNINGS_N.DAT", "", 1, 0.04), Some("0.040"));
        assert_eq!(s.spell("MANNINGS_N.DAT", "", 1, 0.05), None);
        assert_eq!(s.render("MANNINGS_N.DAT", "", 1, 0.05), "0.05");
        assert_eq!(s.render("MANNINGS_N.DAT", "", 0, 0.04), "0.04");
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn tags_and_fortran_exponents_are_kept_apart() {
        let mut s = NumberSpellings::new();
        s.scan_text("INFLOW.DAT", "R 100 500.0 2.5\nH 0 500\nH 1 1.5D2\n");
        assert_eq!(s.spell("INFLOW.DAT", "R", 2, 500.0), Some("500.0"));
        assert_eq!(s.spell("INFLOW.DAT", "H", 2, 500.0), None);
        assert_eq!(s.spell("INFLOW.DAT", "H", 2, 150.0), Some("1.5D2"));
    }

    #[test]
    fn first_spelling_wins_even_when_canonical() {
        let mut s = NumberSpellings::new();
        s.scan_text("TOPO.DAT", "0 0 10\n100 0 10.00\n");
        assert_eq!(s.spell("TOPO.DAT", "", 2, 10.0), None);
        assert_eq!(s.spell("TOPO.DAT", "", 0, 100.0), None);
    }
}
