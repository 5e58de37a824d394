//! Connectors between GridGuard's validation engine and the outside world
//!
//! ## Overview
//!
//! The core crate decides whether a reading is admissible. This crate
//! moves readings in and out around that decision:
//!
//! ```text
//! DataSource ──→ apg::decode ──→ ValidationEngine ──→ PersistenceSink
//!  (HTTP, fixture)   (rows → observations)   (verdicts)     (idempotent upsert)
//!        ↑                                                       │
//!        └──────────────── EtlPipeline::run_every ───────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`apg`]: payload model of the APG imbalance API and its date formats
//! - [`source`]: where windows of data come from
//! - [`http`]: plain HTTP GET source with retries (feature `http`)
//! - [`sink`]: where accepted points go
//! - [`etl`]: one fetch → validate → persist cycle, and the loop around it
//! - [`health`]: liveness report
//!
//! ## Retry Logic
//!
//! Only the HTTP source retries, with exponential backoff:
//! ```text
//! retry_delay = base * 2^attempt
//! ```
//! The engine and the sinks never retry. A failed cycle is logged and the
//! next tick starts from a fresh window.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use gridguard_connectors::{
//!     etl::{EtlConfig, EtlPipeline},
//!     sink::MemorySink,
//!     source::StaticSource,
//! };
//! use gridguard_core::{time::FixedTime, ValidationEngine};
//!
//! # async fn example() -> Result<(), gridguard_connectors::ConnectorError> {
//! let payload = r#"{ "ResponseData": { "Description": "", "ValueColumns": [], "ValueRows": [] } }"#;
//!
//! let pipeline = EtlPipeline::new(
//!     EtlConfig::default(),
//!     Arc::new(ValidationEngine::default()),
//!     Arc::new(StaticSource::from_json(payload)?),
//!     Arc::new(MemorySink::default()),
//!     Arc::new(FixedTime::new(1_746_534_600_000)),
//! );
//!
//! let report = pipeline.run_cycle().await?;
//! assert_eq!(report.fetched, 0);
//! # Ok(())
//! # }
//! ```

pub mod apg;
pub mod etl;
pub mod health;
pub mod sink;
pub mod source;

#[cfg(feature = "http")]
pub mod http;

// Re-export common types
pub use apg::{DecodeError, ImbalanceResponse};
pub use etl::{CycleReport, EtlConfig, EtlPipeline};
pub use health::HealthStatus;
pub use sink::{MemorySink, PersistedPoint, PersistenceSink, SinkError};
pub use source::{DataSource, StaticSource};

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpSource};

use gridguard_core::StoreError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Fetching a window failed
    #[error("Source error: {0}")]
    Source(String),

    /// The payload could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Persisting a point failed
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The history store reported a fault
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}
