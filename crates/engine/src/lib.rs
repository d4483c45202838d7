//! `unirec-engine` — multi-source customer record reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded raw records, returns normalized,
//! clustered, and merged results. No file or network I/O.

pub mod cluster;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod golden;
pub mod mismatch;
pub mod normalize;
pub mod record;
pub mod report;
pub mod similarity;

pub use config::{EngineConfig, SourceConfig, SourceType};
pub use engine::run;
pub use error::ReconError;
pub use record::{NormalizedRecord, RawRecord, RunInput};
pub use report::{RunReport, RunSummary};
