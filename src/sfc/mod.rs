//! Staking and DeFi read accessors.
//!
//! # Data Flow
//! ```text
//! BridgeConfig (contract addresses, call timeout)
//!     → caller.rs (AlloySfc: read-only contract calls with timeouts)
//!     → repository.rs (SfcRepository: raw values → API records)
//!     → types.rs (Epoch, DelegationLock, PendingRewards, DefiSettings)
//! ```
//!
//! # Design Decisions
//! - Calls are read-only; no transactions are ever signed
//! - Malformed responses are typed errors, never truncated or panicking
//! - Callers choose fallbacks explicitly (pending rewards default to zero)

pub mod caller;
pub mod contracts;
pub mod repository;
pub mod types;

pub use caller::{AlloySfc, SfcCaller};
pub use repository::{SfcRepository, SFC_FIRST_LOCK_EPOCH};
pub use types::{
    DefiAddresses, DefiSettings, DelegationLock, Epoch, PendingRewards, SfcError, SfcResult,
};
