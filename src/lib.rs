//! Token usage telemetry collection
//!
//! Collects token-usage telemetry from LLM tooling sources and emits
//! normalized [`UsageEvent`]s for a time-series sink. The library centers
//! on the incremental log ingestion engine for Claude Code's local files:
//! ever-growing per-session JSONL logs plus a periodically rewritten
//! aggregate snapshot, de-duplicated exactly once per record identifier
//! across repeated runs and process restarts.
//!
//! ## Architecture
//!
//! - [`events`] - normalized usage event value type and sink mapping
//! - [`records`] - typed raw record structures for both on-disk formats
//! - [`pricing`] - immutable model tariff table with fallback resolution
//! - [`timestamp`] - lenient timestamp parsing with now() fallback
//! - [`state`] - durable, bounded dedup state (seen identifiers +
//!   snapshot fingerprint)
//! - [`snapshot`] - aggregate snapshot reader with change-gating
//! - [`scanner`] - incremental session log scanner
//! - [`collector`] - the [`Collector`] contract and the Claude Code facade
//! - [`config`] / [`logging`] - process configuration and structured
//!   logging
//!
//! ## Usage
//!
//! ```no_run
//! use token_dash_collector::{ClaudeCodeCollector, Collector};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut collector = ClaudeCodeCollector::new();
//! if collector.is_configured() {
//!     for event in collector.collect().await? {
//!         println!("{}", event.to_line_protocol("token_usage"));
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod events;
pub mod logging;
pub mod pricing;
pub mod records;
pub mod scanner;
pub mod snapshot;
pub mod state;
pub mod timestamp;

pub use collector::{ClaudeCodeCollector, Collector, CollectorSummary};
pub use events::{normalize_model_name, FieldValue, UsageEvent};
pub use pricing::{ModelPricing, PricingTable};
pub use state::StateStore;
