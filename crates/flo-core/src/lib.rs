//! flo-core: shared foundation for the FLO-2D dataset codec.
//!
//! Contains:
//! - error (the four codec error kinds)
//! - numeric (Real, token parsing and shortest-form formatting)
//! - spelling (source text of numeric tokens, reused on emission)
//! - geo (GeoKernel: cell squares, compass segments, street glyphs, neighbours)
//! - cancel (cooperative cancellation flag)
//! - report (per-component structured reports)

pub mod cancel;
pub mod error;
pub mod geo;
pub mod numeric;
pub mod report;
pub mod spelling;

pub use cancel::CancelToken;
pub use error::{CodecError, CodecResult, SchemaErrorKind};
pub use numeric::*;
pub use report::{ComponentReport, ReportStatus};
pub use spelling::{NumberSpellings, SpellingKey};
