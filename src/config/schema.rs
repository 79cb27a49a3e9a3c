//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bridge.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Full node connection.
    pub rpc: RpcConfig,

    /// Block header observer.
    pub observer: ObserverConfig,

    /// SFC staking contracts.
    pub sfc: SfcConfig,

    /// fMint DeFi contracts.
    pub defi: DefiConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Startup and shutdown behaviour.
    pub lifecycle: LifecycleConfig,
}

/// Full node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Pubsub-capable endpoint: `ws://`, `wss://` or a path to an IPC socket.
    pub url: String,

    /// Timeout for a single contract call in seconds.
    pub call_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:18546".to_string(),
            call_timeout_secs: 10,
        }
    }
}

/// Block header observer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObserverConfig {
    /// Start the observer on connect.
    pub enabled: bool,

    /// Subscription topic.
    pub topic: String,

    /// Wait between subscription attempts in seconds.
    pub retry_delay_secs: u64,

    /// Bound on a single subscription attempt in seconds.
    pub open_timeout_secs: u64,

    /// Feed buffer size; 0 means unbounded.
    pub channel_capacity: usize,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            topic: "newHeads".to_string(),
            retry_delay_secs: 30,
            open_timeout_secs: 10,
            channel_capacity: 10_000,
        }
    }
}

/// SFC staking contract addresses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SfcConfig {
    /// SFC contract address.
    pub contract: String,

    /// SFC tokenizer contract address; empty if not deployed.
    pub tokenizer: String,
}

impl Default for SfcConfig {
    fn default() -> Self {
        Self {
            contract: "0xFC00FACE00000000000000000000000000000000".to_string(),
            tokenizer: String::new(),
        }
    }
}

/// fMint DeFi contract addresses. Empty strings mean "not configured".
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DefiConfig {
    pub address_provider: String,
    pub minter: String,
    pub token_registry: String,
    pub reward_distribution: String,
    pub collateral_pool: String,
    pub debt_pool: String,
    pub price_oracle_aggregate: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human readable logs.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long to wait for background tasks after shutdown is triggered.
    pub shutdown_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.observer.topic, "newHeads");
        assert_eq!(config.observer.retry_delay_secs, 30);
        assert!(config.observer.enabled);
        assert!(config.defi.minter.is_empty());
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: BridgeConfig = toml::from_str(
            r#"
            [observer]
            channel_capacity = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.observer.channel_capacity, 0);
        assert_eq!(config.observer.open_timeout_secs, 10);
        assert_eq!(config.rpc.call_timeout_secs, 10);
    }
}
