//! Prover errors.

use alloy_transport::{RpcError, TransportErrorKind};
use stakado_mpt::TrieError;
use stakado_providers::ViewError;
use thiserror::Error;

/// An error produced by the prover core.
///
/// Only on-chain reverts matching the race classes are absorbed, and that
/// classification happens inside the phase driver; every [`ProverError`]
/// that reaches the service loop aborts the current dispute without
/// advancing the cursor, except [`ProverError::Fatal`] which terminates
/// the process.
#[derive(Debug, Error)]
pub enum ProverError {
    /// An RPC transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),

    /// A chain view failed.
    #[error(transparent)]
    View(#[from] ViewError),

    /// The witness is internally corrupt or does not open correctly.
    #[error("corrupt witness: {0}")]
    Witness(#[from] TrieError),

    /// An on-chain call reverted with a decoded reason string.
    ///
    /// The phase driver matches the reason against the race classes; a
    /// reason that escapes it is re-raised as a submission failure.
    #[error("reverted: {0}")]
    Revert(String),

    /// A submission failed outside the race classes.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The witness does not cover progress the chain reports.
    #[error("witness does not cover on-chain progress: {0}")]
    Inconsistent(&'static str),

    /// Misconfiguration or an unrecoverable boot failure.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl From<alloy_contract::Error> for ProverError {
    fn from(err: alloy_contract::Error) -> Self {
        match crate::contracts::revert_reason(&err) {
            Some(reason) => Self::Revert(reason),
            None => Self::Submission(err.to_string()),
        }
    }
}
