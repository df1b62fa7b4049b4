use flo_core::CodecError;
use thiserror::Error;

pub type H5Result<T> = Result<T, H5Error>;

#[derive(Error, Debug)]
pub enum H5Error {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A dataset exists but does not have the expected type or shape.
    #[error("Dataset {dataset}: {reason}")]
    Layout { dataset: String, reason: String },

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Backend(#[from] hdf5::Error),

    #[error("HDF5 file support is not enabled (build with the `hdf5` feature)")]
    Unsupported,
}

impl H5Error {
    pub fn layout(dataset: &str, reason: impl Into<String>) -> Self {
        H5Error::Layout {
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            H5Error::Codec(e) => e.kind_label(),
            H5Error::Layout { .. } => "SchemaError",
            #[cfg(feature = "hdf5")]
            H5Error::Backend(_) => "IOError",
            H5Error::Unsupported => "IOError",
        }
    }
}
