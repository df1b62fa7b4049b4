//! Line tokenisation shared by every DAT grammar.
//!
//! Rows are split on any whitespace and empty lines are dropped. Streams are
//! single-pass; a parser that needs a second look re-opens the file.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flo_core::{CodecError, CodecResult, SchemaErrorKind, parse_int, parse_real};

/// One non-empty line of a DAT file.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub file: Arc<str>,
    /// 1-based line number in the source file.
    pub line: usize,
    pub tokens: Vec<String>,
}

impl Row {
    pub fn new(file: &str, line: usize, tokens: Vec<String>) -> Self {
        Self {
            file: Arc::from(file),
            line,
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Leading token, or `""` for an empty row.
    pub fn tag(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or("")
    }

    pub fn error(&self, kind: SchemaErrorKind) -> CodecError {
        CodecError::schema(self.file.as_ref(), self.line, kind)
    }

    pub fn unknown_tag(&self) -> CodecError {
        self.error(SchemaErrorKind::UnknownTag {
            tag: self.tag().to_string(),
        })
    }

    pub fn require(&self, n: usize) -> CodecResult<()> {
        if self.tokens.len() < n {
            return Err(self.error(SchemaErrorKind::TokenCount {
                expected: n,
                found: self.tokens.len(),
            }));
        }
        Ok(())
    }

    pub fn text(&self, i: usize) -> CodecResult<&str> {
        self.require(i + 1)?;
        Ok(&self.tokens[i])
    }

    pub fn real(&self, i: usize) -> CodecResult<f64> {
        let token = self.text(i)?;
        parse_real(token).ok_or_else(|| {
            self.error(SchemaErrorKind::BadNumber {
                token: token.to_string(),
            })
        })
    }

    pub fn int(&self, i: usize) -> CodecResult<i64> {
        let token = self.text(i)?;
        parse_int(token).ok_or_else(|| {
            self.error(SchemaErrorKind::BadNumber {
                token: token.to_string(),
            })
        })
    }

    /// `None` past the end of the row; a present token must be numeric.
    pub fn opt_real(&self, i: usize) -> CodecResult<Option<f64>> {
        if i >= self.tokens.len() {
            return Ok(None);
        }
        self.real(i).map(Some)
    }

    pub fn opt_int(&self, i: usize) -> CodecResult<Option<i64>> {
        if i >= self.tokens.len() {
            return Ok(None);
        }
        self.int(i).map(Some)
    }

    /// `n` reals starting at `start`.
    pub fn reals(&self, start: usize, n: usize) -> CodecResult<Vec<f64>> {
        self.require(start + n)?;
        (start..start + n).map(|i| self.real(i)).collect()
    }

    /// Every token from `start` to the end, as reals.
    pub fn rest_reals(&self, start: usize) -> CodecResult<Vec<f64>> {
        (start..self.tokens.len()).map(|i| self.real(i)).collect()
    }

    pub fn fixed<const N: usize>(&self, start: usize) -> CodecResult<[f64; N]> {
        let mut out = [0.0; N];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.real(start + k)?;
        }
        Ok(out)
    }

    pub fn is_numeric_at(&self, i: usize) -> bool {
        self.tokens.get(i).and_then(|t| parse_real(t)).is_some()
    }
}

type LineSource = Box<dyn Iterator<Item = io::Result<String>>>;

/// Lazy, single-pass stream of rows with one row of look-ahead.
pub struct RowStream {
    file: Arc<str>,
    path: PathBuf,
    lines: LineSource,
    line_no: usize,
    peeked: Option<Row>,
}

impl RowStream {
    pub fn open(path: &Path) -> CodecResult<Self> {
        let handle = File::open(path).map_err(|e| CodecError::io(path, e))?;
        let file = file_label(path);
        Ok(Self {
            file: Arc::from(file.as_str()),
            path: path.to_path_buf(),
            lines: Box::new(BufReader::new(handle).lines()),
            line_no: 0,
            peeked: None,
        })
    }

    /// Stream over in-memory text; `file` names the source in errors.
    pub fn from_text(file: &str, text: &str) -> Self {
        let lines: Vec<io::Result<String>> = text.lines().map(|l| Ok(l.to_string())).collect();
        Self {
            file: Arc::from(file),
            path: PathBuf::from(file),
            lines: Box::new(lines.into_iter()),
            line_no: 0,
            peeked: None,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    fn pull(&mut self) -> CodecResult<Option<Row>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.map_err(|e| CodecError::io(&self.path, e))?;
            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if tokens.is_empty() {
                continue;
            }
            return Ok(Some(Row {
                file: Arc::clone(&self.file),
                line: self.line_no,
                tokens,
            }));
        }
        Ok(None)
    }

    pub fn next_row(&mut self) -> CodecResult<Option<Row>> {
        if let Some(row) = self.peeked.take() {
            return Ok(Some(row));
        }
        self.pull()
    }

    pub fn peek_row(&mut self) -> CodecResult<Option<&Row>> {
        if self.peeked.is_none() {
            self.peeked = self.pull()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Next row or a token-count error naming `min` as the expected width.
    pub fn expect_row(&mut self, min: usize) -> CodecResult<Row> {
        match self.next_row()? {
            Some(row) => {
                row.require(min)?;
                Ok(row)
            }
            None => Err(CodecError::schema(
                self.file.as_ref(),
                self.line_no + 1,
                SchemaErrorKind::TokenCount {
                    expected: min,
                    found: 0,
                },
            )),
        }
    }
}

impl Iterator for RowStream {
    type Item = CodecResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Opens a DAT file as a lazy row stream.
pub fn single_parser(path: &Path) -> CodecResult<RowStream> {
    RowStream::open(path)
}

/// Zips two streams line-for-line, concatenating their tokens.
pub struct DoubleParser {
    a: RowStream,
    b: RowStream,
    done: bool,
}

impl DoubleParser {
    pub fn new(a: RowStream, b: RowStream) -> Self {
        Self { a, b, done: false }
    }
}

impl Iterator for DoubleParser {
    type Item = CodecResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let left = match self.a.next_row() {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        };
        let right = match self.b.next_row() {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        };
        match (left, right) {
            (Some(mut l), Some(r)) => {
                l.tokens.extend(r.tokens);
                Some(Ok(l))
            }
            (None, None) => {
                self.done = true;
                None
            }
            (Some(l), None) => {
                self.done = true;
                Some(Err(l.error(SchemaErrorKind::LengthMismatch {
                    other: self.b.file().to_string(),
                })))
            }
            (None, Some(r)) => {
                self.done = true;
                Some(Err(r.error(SchemaErrorKind::LengthMismatch {
                    other: self.a.file().to_string(),
                })))
            }
        }
    }
}

pub fn double_parser(path_a: &Path, path_b: &Path) -> CodecResult<DoubleParser> {
    Ok(DoubleParser::new(
        RowStream::open(path_a)?,
        RowStream::open(path_b)?,
    ))
}

/// Normalises a row to `size` slots: right-pads with `None`, or, when
/// `index` is given and the row is short, inserts the gap at `index`.
pub fn fix_row_size(tokens: &[String], size: usize, index: Option<usize>) -> Vec<Option<&str>> {
    let mut out: VecDeque<Option<&str>> = tokens.iter().map(|t| Some(t.as_str())).collect();
    while out.len() < size {
        match index {
            Some(i) if i <= out.len() => out.insert(i, None),
            _ => out.push_back(None),
        }
    }
    out.truncate(size);
    out.into_iter().collect()
}

/// Collapses runs of blanks, strips trailing whitespace and drops empty lines.
pub fn normalise_whitespace(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        out.push_str(&tokens.join(" "));
        out.push('\n');
    }
    out
}

/// Resolves `name` inside `dir`, ignoring case when the exact name is absent.
pub fn find_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Some(exact);
    }
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| {
            p.is_file()
                && p.file_name()
                    .map(|n| n.to_string_lossy().eq_ignore_ascii_case(name))
                    .unwrap_or(false)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lines_are_dropped_and_numbers_kept() {
        let mut rows = RowStream::from_text("T.DAT", "a 1\n\n   \nb   2 3\n");
        let first = rows.next_row().unwrap().unwrap();
        assert_eq!(first.tokens, vec!["a", "1"]);
        assert_eq!(first.line, 1);
        let second = rows.next_row().unwrap().unwrap();
        assert_eq!(second.line, 4);
        assert_eq!(second.int(2).unwrap(), 3);
        assert!(rows.next_row().unwrap().is_none());
    }

    #[test]
    fn peek_does_not_consume() {
        let mut rows = RowStream::from_text("T.DAT", "x\ny\n");
        assert_eq!(rows.peek_row().unwrap().unwrap().tag(), "x");
        assert_eq!(rows.next_row().unwrap().unwrap().tag(), "x");
        assert_eq!(rows.next_row().unwrap().unwrap().tag(), "y");
    }

    #[test]
    fn bad_number_names_token_and_line() {
        let mut rows = RowStream::from_text("OUTFLOW.DAT", "K x17\n");
        let row = rows.next_row().unwrap().unwrap();
        let err = row.int(1).unwrap_err().to_string();
        assert!(err.contains("OUTFLOW.DAT"));
        assert!(err.contains("line 1"));
        assert!(err.contains("x17"));
    }

    #[test]
    fn double_parser_reports_length_mismatch() {
        let a = RowStream::from_text("TOPO.DAT", "0 0 1\n1 0 2\n");
        let b = RowStream::from_text("MANNINGS_N.DAT", "1 0.04\n");
        let rows: Vec<_> = DoubleParser::new(a, b).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].as_ref().unwrap().tokens.len(), 5);
        let err = rows[1].as_ref().unwrap_err();
        assert!(err.to_string().contains("MANNINGS_N.DAT"));
    }

    #[test]
    fn fix_row_size_pads_or_inserts() {
        let tokens: Vec<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(fix_row_size(&tokens, 3, None), vec![Some("a"), Some("b"), None]);
        assert_eq!(fix_row_size(&tokens, 3, Some(1)), vec![Some("a"), None, Some("b")]);
        assert_eq!(fix_row_size(&tokens, 1, None), vec![Some("a")]);
    }

    #[test]
    fn normalise_collapses_blanks() {
        assert_eq!(normalise_whitespace("a   b \t c  \n\n  d\n"), "a b c\nd\n");
    }
}
