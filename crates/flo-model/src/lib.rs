//! flo-model: in-memory records shared by every FLO-2D representation.
//!
//! The DAT parser, the HDF5 codec and the project store all speak these
//! types. Nothing here performs I/O.

pub mod boundary;
pub mod channel;
pub mod common;
pub mod component;
pub mod control;
pub mod data;
pub mod floodplain;
pub mod grid;
pub mod hydrology;
pub mod levee;
pub mod reduction;
pub mod sediment;
pub mod storm_drain;
pub mod street;
pub mod structure;
pub mod validate;

pub use boundary::*;
pub use channel::*;
pub use common::*;
pub use component::{CellArrayKind, CellArraySpec, Component};
pub use control::{Control, ControlEntry};
pub use data::ComponentData;
pub use floodplain::*;
pub use grid::{GridCell, GridData};
pub use hydrology::*;
pub use levee::*;
pub use reduction::*;
pub use sediment::*;
pub use storm_drain::*;
pub use street::*;
pub use structure::*;
