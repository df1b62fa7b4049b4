//! Text building blocks for DAT emission.

use std::path::{Path, PathBuf};

use flo_core::spelling::line_tag;
use flo_core::{CodecError, NumberSpellings};

use crate::DatResult;

/// A rendered output file, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatFile {
    pub name: String,
    pub text: String,
}

impl DatFile {
    pub fn write_to(&self, dir: &Path) -> DatResult<PathBuf> {
        let path = dir.join(&self.name);
        std::fs::write(&path, &self.text).map_err(|e| CodecError::io(&path, e))?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
enum Token {
    Real(f64),
    Int(i64),
    Text(String),
}

/// Space separated line builder.
///
/// Numbers stay numeric until the owning writer renders them, so a spelling
/// table can restore the text they were read from.
#[derive(Debug, Default)]
pub struct Line(Vec<Token>);

impl Line {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self(vec![Token::Text(tag.to_string())])
    }

    pub fn real(mut self, v: f64) -> Self {
        self.0.push(Token::Real(v));
        self
    }

    pub fn reals(mut self, vs: &[f64]) -> Self {
        self.0.extend(vs.iter().map(|v| Token::Real(*v)));
        self
    }

    pub fn opt_real(self, v: Option<f64>) -> Self {
        match v {
            Some(v) => self.real(v),
            None => self,
        }
    }

    pub fn int(mut self, v: i64) -> Self {
        self.0.push(Token::Int(v));
        self
    }

    pub fn opt_int(self, v: Option<i64>) -> Self {
        match v {
            Some(v) => self.int(v),
            None => self,
        }
    }

    pub fn text(mut self, s: &str) -> Self {
        if !s.is_empty() {
            self.0.push(Token::Text(s.to_string()));
        }
        self
    }

    fn render(&self, file: &str, spellings: &NumberSpellings, out: &mut String) {
        let tag = match self.0.first() {
            Some(Token::Text(t)) => line_tag(t),
            _ => "",
        };
        for (pos, token) in self.0.iter().enumerate() {
            if pos > 0 {
                out.push(' ');
            }
            match token {
                Token::Real(v) => out.push_str(&spellings.render(file, tag, pos, *v)),
                Token::Int(i) => match spellings.spell(file, tag, pos, *i as f64) {
                    Some(text) => out.push_str(text),
                    None => out.push_str(&i.to_string()),
                },
                Token::Text(t) => out.push_str(t),
            }
        }
        out.push('\n');
    }
}

#[derive(Debug)]
enum Entry {
    Line(Line),
    Raw(String),
}

/// Accumulates the lines of one file.
#[derive(Debug)]
pub struct DatWriter {
    name: String,
    entries: Vec<Entry>,
}

impl DatWriter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, line: Line) {
        self.entries.push(Entry::Line(line));
    }

    pub fn push_raw(&mut self, line: &str) {
        self.entries.push(Entry::Raw(line.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file text with numbers in their shortest form.
    pub fn text(&self) -> String {
        self.render(&NumberSpellings::new())
    }

    pub fn render(&self, spellings: &NumberSpellings) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                Entry::Line(line) => line.render(&self.name, spellings, &mut out),
                Entry::Raw(raw) => {
                    out.push_str(raw);
                    out.push('\n');
                }
            }
        }
        out
    }

    pub fn finish(self) -> DatFile {
        self.finish_with(&NumberSpellings::new())
    }

    pub fn finish_with(self, spellings: &NumberSpellings) -> DatFile {
        DatFile {
            text: self.render(spellings),
            name: self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_skips_unset_fields() {
        let mut w = DatWriter::new("X.DAT");
        w.push(Line::tag("R").int(100).real(500.0).opt_real(None).opt_int(Some(3)));
        w.push(Line::new().real(0.04).text(""));
        let file = w.finish();
        assert_eq!(file.text, "R 100 500 3\n0.04\n");
    }

    #[test]
    fn source_spellings_survive_rendering() {
        let mut spellings = NumberSpellings::new();
        spellings.scan_text("X.DAT", "R 100 500.0 2.50\n1 0.040\n");
        let mut w = DatWriter::new("X.DAT");
        w.push(Line::tag("R").int(100).real(500.0).real(2.5));
        w.push(Line::new().int(1).real(0.040));
        w.push(Line::new().int(2).real(0.05));
        assert_eq!(w.text(), "R 100 500 2.5\n1 0.04\n2 0.05\n");
        let file = w.finish_with(&spellings);
        assert_eq!(file.text, "R 100 500.0 2.50\n1 0.040\n2 0.05\n");
    }
}
