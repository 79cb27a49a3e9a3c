//! Bridge error definitions.

use thiserror::Error;

use crate::sfc::SfcError;

/// Errors that can occur while connecting or querying the node.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Contract accessor setup or call failed.
    #[error(transparent)]
    Sfc(#[from] SfcError),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
