//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!     → handed to Bridge::connect and the observability setup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::BridgeConfig;
pub use schema::DefiConfig;
pub use schema::LifecycleConfig;
pub use schema::ObservabilityConfig;
pub use schema::ObserverConfig;
pub use schema::RpcConfig;
pub use schema::SfcConfig;
