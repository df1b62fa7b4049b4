//! flo-store: the SQLite project store.
//!
//! Contains:
//! - schema (tables, naming triggers, `trigger_control`)
//! - batch (chunked savepoint writer with cooperative cancellation)
//! - store (`ProjectStore`: bootstrap, component writes and reads, summary)
//! - tables (per-component writers and readers, derived geometry as WKT)

pub mod batch;
pub mod error;
pub mod schema;
mod sql;
pub mod store;
mod tables;

pub use batch::{DEFAULT_CHUNK_SIZE, WriteOptions};
pub use error::{StoreError, StoreResult};
pub use store::ProjectStore;
