//! Bridge to the full node.
//!
//! # Data Flow
//! ```text
//! BridgeConfig
//!     → client.rs (pubsub provider connection with timeout)
//!     → sfc::AlloySfc + SfcRepository (staking/DeFi reads)
//!     → observer::spawn (block header worker, joined through Shutdown)
//!     → Bridge (read accessors + header Feed for the query layer)
//! ```
//!
//! # Design Decisions
//! - One provider connection is shared by contract reads and the subscription
//! - The observer is the only background task; closing the bridge joins it
//! - Prefer a local IPC endpoint; remote endpoints should be tunnelled

pub mod client;
pub mod types;

use std::time::Duration;

use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::Header;
use tokio::sync::watch;
use tokio::time::timeout;

use crate::config::BridgeConfig;
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::observer::{self, Feed, HeadSource, ObserverState};
use crate::sfc::{AlloySfc, SfcRepository};

pub use types::{BridgeError, BridgeResult};

/// Connected bridge: typed read accessors plus the live header feed.
pub struct Bridge {
    provider: DynProvider,
    sfc: SfcRepository<AlloySfc>,
    shutdown: Shutdown,
    observer: Option<watch::Receiver<ObserverState>>,
    call_timeout: Duration,
    shutdown_timeout: Duration,
}

impl Bridge {
    /// Connect to the node and start the header observer if enabled.
    ///
    /// Returns the bridge and, when the observer runs, the feed of new headers.
    pub async fn connect(config: &BridgeConfig) -> BridgeResult<(Self, Option<Feed<Header>>)> {
        let provider = client::connect(&config.rpc).await?;
        let sfc = SfcRepository::new(AlloySfc::from_config(provider.clone(), config)?);
        let shutdown = Shutdown::new();

        let (observer, feed) = if config.observer.enabled {
            let source = HeadSource::new(
                provider.clone(),
                Duration::from_secs(config.observer.open_timeout_secs),
            );
            let handle = observer::spawn(source, &config.observer, &shutdown);
            (Some(handle.state), Some(handle.feed))
        } else {
            tracing::info!("Block observer disabled");
            (None, None)
        };

        let bridge = Self {
            provider,
            sfc,
            shutdown,
            observer,
            call_timeout: Duration::from_secs(config.rpc.call_timeout_secs),
            shutdown_timeout: Duration::from_secs(config.lifecycle.shutdown_timeout_secs),
        };
        Ok((bridge, feed))
    }

    /// Staking and DeFi accessors.
    pub fn sfc(&self) -> &SfcRepository<AlloySfc> {
        &self.sfc
    }

    /// Current observer state, if the observer runs.
    pub fn observer_state(&self) -> Option<ObserverState> {
        self.observer.as_ref().map(|state| *state.borrow())
    }

    /// Signal for consumers that should stop together with the bridge.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.subscribe()
    }

    /// Chain id reported by the node.
    pub async fn chain_id(&self) -> BridgeResult<u64> {
        match timeout(self.call_timeout, self.provider.get_chain_id()).await {
            Ok(Ok(id)) => Ok(id),
            Ok(Err(e)) => Err(BridgeError::Rpc(e.to_string())),
            Err(_) => Err(BridgeError::Timeout(self.call_timeout.as_secs())),
        }
    }

    /// Latest block number known to the node.
    pub async fn block_number(&self) -> BridgeResult<u64> {
        match timeout(self.call_timeout, self.provider.get_block_number()).await {
            Ok(Ok(number)) => Ok(number),
            Ok(Err(e)) => Err(BridgeError::Rpc(e.to_string())),
            Err(_) => Err(BridgeError::Timeout(self.call_timeout.as_secs())),
        }
    }

    /// Whether the node answers basic queries.
    pub async fn is_healthy(&self) -> bool {
        match self.block_number().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Full node health check failed");
                false
            }
        }
    }

    /// Stop the observer and wait for it, bounded by the shutdown timeout.
    ///
    /// Returns `false` if the worker did not finish in time.
    pub async fn close(self) -> bool {
        self.shutdown.trigger();
        let clean = self.shutdown.wait_with_timeout(self.shutdown_timeout).await;
        if clean {
            tracing::info!("Bridge closed");
        }
        clean
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("sfc", self.sfc.caller())
            .field("observer", &self.observer_state())
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}
