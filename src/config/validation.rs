//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint must support subscriptions (ws, wss or IPC)
//! - Contract addresses must parse
//! - Timeouts and delays must be non-zero
//! - Feed capacity must fit a bounded channel
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: BridgeConfig → Result<(), Vec<ValidationError>>

use alloy::primitives::Address;
use thiserror::Error;
use url::Url;

use crate::config::schema::BridgeConfig;
use crate::observer::dispatcher::MAX_CHANNEL_CAPACITY;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rpc.url '{0}' is not a ws://, wss:// or IPC endpoint")]
    UnsupportedEndpoint(String),

    #[error("{field} '{value}' is not a valid address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observer.topic must not be empty")]
    EmptyTopic,

    #[error("observer.channel_capacity {value} exceeds the maximum of {max}")]
    CapacityTooLarge { value: usize, max: usize },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Whether `url` can carry pubsub subscriptions.
pub fn is_pubsub_endpoint(url: &str) -> bool {
    if url.ends_with(".ipc") {
        return true;
    }
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "ws" | "wss"),
        Err(_) => false,
    }
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_pubsub_endpoint(&config.rpc.url) {
        errors.push(ValidationError::UnsupportedEndpoint(config.rpc.url.clone()));
    }

    let non_zero = [
        ("rpc.call_timeout_secs", config.rpc.call_timeout_secs),
        ("observer.retry_delay_secs", config.observer.retry_delay_secs),
        ("observer.open_timeout_secs", config.observer.open_timeout_secs),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.observer.topic.trim().is_empty() {
        errors.push(ValidationError::EmptyTopic);
    }

    if config.observer.channel_capacity > MAX_CHANNEL_CAPACITY {
        errors.push(ValidationError::CapacityTooLarge {
            value: config.observer.channel_capacity,
            max: MAX_CHANNEL_CAPACITY,
        });
    }

    check_address(&mut errors, "sfc.contract", &config.sfc.contract, true);
    check_address(&mut errors, "sfc.tokenizer", &config.sfc.tokenizer, false);

    let defi = &config.defi;
    let defi_addresses = [
        ("defi.address_provider", &defi.address_provider),
        ("defi.minter", &defi.minter),
        ("defi.token_registry", &defi.token_registry),
        ("defi.reward_distribution", &defi.reward_distribution),
        ("defi.collateral_pool", &defi.collateral_pool),
        ("defi.debt_pool", &defi.debt_pool),
        ("defi.price_oracle_aggregate", &defi.price_oracle_aggregate),
    ];
    for (field, value) in defi_addresses {
        check_address(&mut errors, field, value, false);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    required: bool,
) {
    if value.is_empty() && !required {
        return;
    }
    if value.parse::<Address>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&BridgeConfig::default()), Ok(()));
    }

    #[test]
    fn test_pubsub_endpoints() {
        assert!(is_pubsub_endpoint("ws://localhost:18546"));
        assert!(is_pubsub_endpoint("wss://rpc.example.org/ws"));
        assert!(is_pubsub_endpoint("/var/opera/opera.ipc"));
        assert!(!is_pubsub_endpoint("http://localhost:8545"));
        assert!(!is_pubsub_endpoint("not a url"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = BridgeConfig::default();
        config.rpc.url = "https://rpc.example.org".to_string();
        config.observer.topic = " ".to_string();
        config.observer.open_timeout_secs = 0;
        config.sfc.contract = String::new();
        config.defi.minter = "0x1234".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::Zero("observer.open_timeout_secs")));
        assert!(errors.contains(&ValidationError::EmptyTopic));
        assert!(errors.contains(&ValidationError::InvalidAddress {
            field: "defi.minter",
            value: "0x1234".to_string(),
        }));
    }

    #[test]
    fn test_rejects_oversized_channel_capacity() {
        let mut config = BridgeConfig::default();
        config.observer.channel_capacity = MAX_CHANNEL_CAPACITY;
        assert!(validate_config(&config).is_ok());

        config.observer.channel_capacity = 1 << 62;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::CapacityTooLarge {
                value: 1 << 62,
                max: MAX_CHANNEL_CAPACITY,
            }])
        );
    }

    #[test]
    fn test_optional_addresses_may_be_empty() {
        let mut config = BridgeConfig::default();
        config.sfc.tokenizer = String::new();
        config.defi.minter = "0x0000000000000000000000000000000000000001".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
