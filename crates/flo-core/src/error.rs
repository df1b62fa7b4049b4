use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// The four error kinds every codec layer reports.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema error in {file} at line {line}: {kind}")]
    Schema {
        file: String,
        line: usize,
        kind: SchemaErrorKind,
    },

    #[error("Domain error: {what}")]
    Domain { what: String },

    #[error("State error: {what}")]
    State { what: String },
}

/// Grammar-level faults. Each variant names the offending token where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// A required input file does not exist.
    Missing { path: String },
    /// Two files read in lock-step disagree in row count.
    LengthMismatch { other: String },
    /// A row has fewer tokens than its grammar requires.
    TokenCount { expected: usize, found: usize },
    /// The leading discriminator is not valid at this point.
    UnknownTag { tag: String },
    /// A token that must be numeric is not.
    BadNumber { token: String },
    /// A record names something that does not exist.
    InvalidReference { what: String },
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaErrorKind::Missing { path } => write!(f, "required file {} is missing", path),
            SchemaErrorKind::LengthMismatch { other } => {
                write!(f, "row count differs from {}", other)
            }
            SchemaErrorKind::TokenCount { expected, found } => {
                write!(f, "expected at least {} tokens, found {}", expected, found)
            }
            SchemaErrorKind::UnknownTag { tag } => write!(f, "unknown tag '{}'", tag),
            SchemaErrorKind::BadNumber { token } => write!(f, "'{}' is not a number", token),
            SchemaErrorKind::InvalidReference { what } => write!(f, "invalid reference: {}", what),
        }
    }
}

impl CodecError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CodecError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn schema(file: impl Into<String>, line: usize, kind: SchemaErrorKind) -> Self {
        CodecError::Schema {
            file: file.into(),
            line,
            kind,
        }
    }

    pub fn missing(path: impl Into<String>) -> Self {
        let path = path.into();
        CodecError::Schema {
            file: path.clone(),
            line: 0,
            kind: SchemaErrorKind::Missing { path },
        }
    }

    pub fn domain(what: impl Into<String>) -> Self {
        CodecError::Domain { what: what.into() }
    }

    pub fn state(what: impl Into<String>) -> Self {
        CodecError::State { what: what.into() }
    }

    /// Short label of the error kind, used in reports.
    pub fn kind_label(&self) -> &'static str {
        match self {
            CodecError::Io { .. } => "IOError",
            CodecError::Schema { .. } => "SchemaError",
            CodecError::Domain { .. } => "DomainError",
            CodecError::State { .. } => "StateError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_file_line_and_token() {
        let err = CodecError::schema(
            "OUTFLOW.DAT",
            12,
            SchemaErrorKind::BadNumber {
                token: "x12".to_string(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("OUTFLOW.DAT"));
        assert!(msg.contains("line 12"));
        assert!(msg.contains("x12"));
        assert_eq!(err.kind_label(), "SchemaError");
    }

    #[test]
    fn missing_file_is_a_schema_error() {
        let err = CodecError::missing("TOPO.DAT");
        match err {
            CodecError::Schema {
                kind: SchemaErrorKind::Missing { path },
                ..
            } => assert_eq!(path, "TOPO.DAT"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
