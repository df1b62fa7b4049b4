use flo_core::CodecError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Operation cancelled; the project store was left unchanged")]
    Cancelled,
}

impl StoreError {
    pub fn kind_label(&self) -> &'static str {
        match self {
            StoreError::Sqlite(_) => "IOError",
            StoreError::Codec(e) => e.kind_label(),
            StoreError::Cancelled => "Cancelled",
        }
    }
}
