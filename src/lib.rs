//! Prometheus exporter for Jitsi Videobridge Colibri statistics.
//!
//! The exporter polls a videobridge's `/colibri/stats` endpoint and exposes
//! the statistics as Prometheus metrics on an HTTP `/metrics` endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   Videobridge   │────>│    Collector    │────>│   HTTP Server   │
//! │ (/colibri/stats)│     │ (probe+assemble)│     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! Two collection strategies are available, selected at configuration time:
//! a cached mode where a background loop refreshes a shared snapshot on a
//! fixed interval, and an on-demand mode where every scrape probes the
//! videobridge synchronously.
//!
//! # Usage
//!
//! ```bash
//! colibri-exporter --config config.json5
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for configuration options.

pub mod collector;
pub mod config;
pub mod http;
pub mod probe;
pub mod snapshot;
pub mod stats;

pub use collector::{CachedCollector, Collector, OnDemandCollector, RefreshLoop, SharedState};
pub use config::ExporterConfig;
pub use http::HttpServer;
pub use probe::{ProbeError, Prober};
pub use snapshot::MetricsSnapshot;
pub use stats::StatsDocument;
