//! flo-dat: the legacy fixed-format DAT representation.
//!
//! - `lexer`: `single_parser`, `double_parser`, `fix_row_size`
//! - one module per file family with a `parse_*` and an `emit_*` function
//! - `dispatch`: component-level entry points used by the application layer
//!
//! Parsers never touch the project store; emitters return text and leave the
//! writing to the caller.

pub mod boundary;
pub mod channel;
pub mod control;
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod floodplain;
pub mod grid;
pub mod hydrology;
pub mod levee;
pub mod lexer;
pub mod reduction;
pub mod sediment;
pub mod storm_drain;
pub mod street;
pub mod structure;

pub use dispatch::{
    Parsed, cell_array_for_file, collect_spellings, emit_component, emit_component_with,
    parse_component, present_components,
};
pub use emit::{DatFile, DatWriter, Line};
pub use error::{DatError, DatResult};
pub use lexer::{
    Row, RowStream, double_parser, find_file, fix_row_size, normalise_whitespace, single_parser,
};
