//! # dataset-dl
//!
//! Embeddable client library for asynchronous dataset collection APIs of
//! the trigger/poll/fetch family.
//!
//! ## Design Philosophy
//!
//! dataset-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Patient** - Remote jobs may run for minutes or hours; the poll loop
//!   is unbounded and runs are stopped via cancellation, not deadlines
//! - **Fault-tolerant** - Rate limits and transient network failures are
//!   recovered locally; only genuine terminal conditions fail a run
//! - **Testable** - The transport and the clock are trait seams, so the
//!   entire workflow runs under test without a network or wall-clock waits
//!
//! ## Quick Start
//!
//! ```no_run
//! use dataset_dl::{Collector, CollectionJob, Config, Dataset, DiscoverBy};
//! use std::collections::BTreeMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let token = std::env::var("API_TOKEN")?;
//!     let collector = Collector::new(token, Config::default())?;
//!
//!     let mut filters = BTreeMap::new();
//!     filters.insert("location".to_string(), "92027".to_string());
//!
//!     let job = CollectionJob {
//!         dataset: Dataset::new("gd_lfqkr8wm13ixtbd8f5")
//!             .discover_by(DiscoverBy::InputFilters)
//!             .primary_field("location"),
//!         inputs: vec![filters],
//!         destination: "discovered_properties.json".into(),
//!     };
//!
//!     if collector.run(&job).await {
//!         println!("results written to {}", job.destination.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Backoff policy and bounded retry driver
pub mod backoff;
/// Injectable clock for poll-loop suspension
pub mod clock;
/// Collection orchestrator
pub mod collector;
/// Configuration types
pub mod config;
/// Dataset adapters
pub mod dataset;
/// Error types
pub mod error;
/// Result persistence
pub mod sink;
/// HTTP transport with outcome classification
pub mod transport;
/// Core types
pub mod types;

// Re-export commonly used types
pub use backoff::{BackoffPolicy, IsRetryable};
pub use clock::{Clock, TokioClock};
pub use collector::{CollectionJob, Collector};
pub use config::{Config, PollConfig, RetryConfig, SinkConfig};
pub use dataset::{Dataset, DiscoverBy};
pub use error::{Error, PersistError, Result, SubmitError, TransportError};
pub use sink::JsonFileSink;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
pub use types::{
    BatchSummary, CollectionOutcome, InputRecord, JobStatus, ResultRecord, SnapshotId,
};
