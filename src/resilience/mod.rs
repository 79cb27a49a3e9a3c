//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Subscription open fails or the stream breaks:
//!     → retries.rs (RetryPolicy decides how long to wait before the next open)
//!     → observer::manager sleeps on a fresh timer, racing the shutdown signal
//! ```
//!
//! # Design Decisions
//! - Open failures are never fatal; the bridge keeps trying for its whole life
//! - Delay is a policy object so tests can swap the 30 s production wait
//! - No attempt limit and no growth in the reference policy

pub mod retries;

pub use retries::{ConstantDelay, RetryPolicy, DEFAULT_RETRY_DELAY};
