//! Chain view errors.

use alloy_transport::{RpcError, TransportErrorKind};
use thiserror::Error;

/// An error produced by one of the chain views.
#[derive(Debug, Error)]
pub enum ViewError {
    /// An RPC transport failure against either chain.
    #[error("transport error: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),

    /// A contract read failed.
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy_contract::Error),

    /// The queried index lies beyond the last appended batch or block.
    #[error("index {0} is beyond the chain tip")]
    NotFound(u64),

    /// The rollup node lacks a required RPC extension.
    #[error("rollup node does not support {0}")]
    Unsupported(&'static str),

    /// Appended batch data did not decode or does not cover the index.
    #[error("batch data is unusable: {0}")]
    BadBatch(&'static str),

    /// An RLP payload failed to decode.
    #[error("rlp decoding failed: {0}")]
    Rlp(#[from] alloy_rlp::Error),
}
