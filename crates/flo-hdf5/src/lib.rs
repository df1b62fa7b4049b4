//! flo-hdf5: the FLO-2D HDF5 dataset representation.
//!
//! Contains:
//! - container (in-memory groups and datasets, slice reads)
//! - registry (dataset descriptions)
//! - table (row builders and typed readers)
//! - codec (component <-> dataset mapping, plus DAT number spellings)
//! - file (on-disk backend, behind the `hdf5` feature)

pub mod codec;
pub mod container;
pub mod error;
pub mod file;
pub mod registry;
pub mod table;

pub use codec::{
    component_from_container, component_to_datasets, present_components, read_spellings,
    write_spellings,
};
pub use container::{DEFAULT_COMPRESSION, Dataset, DatasetData, H5Container, H5Group};
pub use error::{H5Error, H5Result};
pub use file::{read_file, write_file};
