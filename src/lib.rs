//! Bridge between an application server and an Opera/Lachesis full node.
//!
//! Exposes typed read accessors for on-chain staking and DeFi state and keeps
//! a live feed of new block headers that survives node restarts.

pub mod bridge;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod observer;
pub mod resilience;
pub mod sfc;

pub use bridge::{Bridge, BridgeError};
pub use config::schema::BridgeConfig;
pub use lifecycle::Shutdown;
pub use observer::{Feed, ObserverState};
