//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every ShutdownSignal observes it at its next wait point
//!     worker exits → JoinToken released → Shutdown::wait() returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The signal is one-shot and never resets; late subscribers see it at once
//! - Join tokens are released by ownership, so a worker cannot release twice
//! - Shutdown has a timeout: the binary exits after the drain deadline

pub mod shutdown;
pub mod signals;

pub use shutdown::{JoinToken, Shutdown, ShutdownSignal};
