//! Error types for the flo-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the codec crates and
/// gives the CLI one error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("DAT {kind}: {message}")]
    Dat { kind: &'static str, message: String },

    #[error("HDF5 {kind}: {message}")]
    Hdf5 { kind: &'static str, message: String },

    #[error("Project store {kind}: {message}")]
    Store { kind: &'static str, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("State error: {0}")]
    State(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("{component} reported warnings in strict mode: {}", messages.join("; "))]
    Strict {
        component: String,
        messages: Vec<String>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// The codec error kind behind this error, where one exists.
    pub fn kind_label(&self) -> &'static str {
        match self {
            AppError::Dat { kind, .. }
            | AppError::Hdf5 { kind, .. }
            | AppError::Store { kind, .. } => kind,
            AppError::Cancelled => "Cancelled",
            AppError::ConfigRead { .. } | AppError::FileWrite { .. } | AppError::Io(_) => "IOError",
            AppError::Config(_) | AppError::InvalidInput(_) => "InvalidInput",
            AppError::State(_) | AppError::ComponentNotFound(_) => "StateError",
            AppError::Strict { .. } => "Strict",
        }
    }
}

/// Result type for flo-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<flo_dat::DatError> for AppError {
    fn from(err: flo_dat::DatError) -> Self {
        AppError::Dat {
            kind: err.kind_label(),
            message: err.to_string(),
        }
    }
}

impl From<flo_hdf5::H5Error> for AppError {
    fn from(err: flo_hdf5::H5Error) -> Self {
        AppError::Hdf5 {
            kind: err.kind_label(),
            message: err.to_string(),
        }
    }
}

impl From<flo_store::StoreError> for AppError {
    fn from(err: flo_store::StoreError) -> Self {
        match err {
            flo_store::StoreError::Cancelled => AppError::Cancelled,
            other => AppError::Store {
                kind: other.kind_label(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flo_core::CodecError;

    #[test]
    fn store_cancel_stays_distinct() {
        let err: AppError = flo_store::StoreError::Cancelled.into();
        assert!(matches!(err, AppError::Cancelled));
    }

    #[test]
    fn backend_kind_survives_flattening() {
        let err: AppError = flo_dat::DatError::from(CodecError::missing("TOPO.DAT")).into();
        assert_eq!(err.kind_label(), "SchemaError");
        assert!(err.to_string().contains("TOPO.DAT"));
    }
}
