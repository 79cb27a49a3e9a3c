//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! observer, sfc, bridge produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stdout (pretty or JSON lines)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Log level from RUST_LOG first, then the configured level
//! - Metric updates are cheap no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
