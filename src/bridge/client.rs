//! Full node connection.
//!
//! # Responsibilities
//! - Connect to a pubsub-capable endpoint (WebSocket or IPC)
//! - Bound the connection attempt with the call timeout
//! - Hand out a type-erased provider shared by all subsystems

use std::time::Duration;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tokio::time::timeout;

use crate::bridge::types::{BridgeError, BridgeResult};
use crate::config::RpcConfig;

/// Connect to the node configured in `config`.
pub async fn connect(config: &RpcConfig) -> BridgeResult<DynProvider> {
    let limit = Duration::from_secs(config.call_timeout_secs);

    let provider = match timeout(limit, ProviderBuilder::new().connect(&config.url)).await {
        Ok(Ok(provider)) => provider.erased(),
        Ok(Err(e)) => {
            tracing::error!(rpc_url = %config.url, error = %e, "Can not connect to the full node");
            return Err(BridgeError::Rpc(format!(
                "connection to '{}' failed: {}",
                config.url, e
            )));
        }
        Err(_) => {
            tracing::error!(rpc_url = %config.url, "Full node connection timed out");
            return Err(BridgeError::Timeout(config.call_timeout_secs));
        }
    };

    tracing::info!(rpc_url = %config.url, "Connected to the full node");
    Ok(provider)
}
