// gtfs2sql - Core Library
// GTFS feed directory → SQLite / PostgreSQL tables with surrogate keys

pub mod coerce;
pub mod config;
pub mod copy;
pub mod db;
pub mod decoder;
pub mod entities;
pub mod loader;
pub mod optimizer;
#[cfg(feature = "pg")]
pub mod pg;
pub mod registry;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use config::{ConnectionTarget, Credentials, LoadConfig};
pub use db::{RowSink, SqliteStore, Store, WritePath};
pub use decoder::{DecodedRow, FeedFile};
pub use entities::{EntityKind, OutputRow, RowError, TableDef, Value};
pub use loader::{run, FeedLoader, LoadOptions, DEFAULT_BATCH_SIZE};
pub use optimizer::{OptimizeStats, TripOptimizer};
#[cfg(feature = "pg")]
pub use pg::PgStore;
pub use registry::{IdDomain, IdRegistry};
pub use report::{LoadReport, TableOutcome, TableStatus};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
