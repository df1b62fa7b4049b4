//! Application service layer for the FLO-2D dataset codec.
//!
//! Import and export sessions over the project store, shared by the CLI:
//! configuration, progress events, session reports with file digests, and
//! round-trip verification.

pub mod config;
pub mod error;
pub mod export_service;
pub mod import_service;
pub mod progress;
pub mod query;
pub mod report;
pub mod session;
pub mod verify;

// Re-export key types for convenience
pub use config::{CodecConfig, Hdf5Config};
pub use error::{AppError, AppResult};
pub use export_service::{export_container, export_dat, export_hdf5, render_dat};
pub use import_service::{import_container, import_dat, import_dat_with_progress, import_hdf5};
pub use progress::{ProgressEvent, Stage};
pub use query::{DumpFormat, TableCount, dump_component, parse_component_key, store_summary};
pub use report::{FileDigest, SessionReport};
pub use session::{ProgressCallback, SessionOptions};
pub use verify::{FileCheck, VerifyReport, verify_dat};
