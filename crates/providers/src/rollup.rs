//! Rollup-node view backed by an alloy provider.

use crate::{RollupView, ViewError};
use alloy_primitives::{Address, B256, Bytes, U64};
use alloy_provider::Provider;
use alloy_transport::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use stakado_protocol::StateDiffProof;

/// JSON-RPC error code a node answers with for unknown methods.
const METHOD_NOT_FOUND: i64 = -32601;

/// The state-diff extension endpoint served by patched rollup nodes.
const STATE_DIFF_METHOD: &str = "eth_getStateDiffProof";

/// A [`RollupView`] over the rollup execution node's JSON-RPC interface.
#[derive(Debug, Clone)]
pub struct AlloyRollupView<P> {
    /// The rollup node provider.
    provider: P,
}

impl<P: Provider> AlloyRollupView<P> {
    /// Creates a new view over the given provider.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider> RollupView for AlloyRollupView<P> {
    async fn state_root(&self, block: u64) -> Result<B256, ViewError> {
        let header = self
            .provider
            .get_block_by_number(block.into())
            .await?
            .ok_or(ViewError::NotFound(block))?
            .header;
        Ok(header.inner.state_root)
    }

    async fn state_diff_proof(&self, block: u64) -> Result<StateDiffProof, ViewError> {
        let result = self
            .provider
            .client()
            .request(STATE_DIFF_METHOD, (U64::from(block),))
            .await;
        match result {
            Ok(proof) => Ok(proof),
            Err(err) if is_method_not_found(&err) => {
                Err(ViewError::Unsupported(STATE_DIFF_METHOD))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn code_at(&self, address: Address, block: u64) -> Result<Bytes, ViewError> {
        Ok(self.provider.get_code_at(address).block_id(block.into()).await?)
    }
}

/// Returns `true` when the node rejected the method itself rather than the
/// request.
fn is_method_not_found(err: &RpcError<TransportErrorKind>) -> bool {
    matches!(err, RpcError::ErrorResp(payload) if payload.code == METHOD_NOT_FOUND)
}
