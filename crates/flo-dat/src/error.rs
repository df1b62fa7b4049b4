use flo_core::CodecError;
use thiserror::Error;

pub type DatResult<T> = Result<T, DatError>;

#[derive(Error, Debug)]
pub enum DatError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Cannot emit {file}: {reason}")]
    Emit { file: String, reason: String },
}

impl DatError {
    pub fn kind_label(&self) -> &'static str {
        match self {
            DatError::Codec(e) => e.kind_label(),
            DatError::Emit { .. } => "IOError",
        }
    }
}
