//! View traits the prover core consumes.

use crate::ViewError;
use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use stakado_protocol::{
    BatchHeader, GlobalIndex, StateDiffProof, StateRootBatchProof, TransactionBatchProof,
};

/// Read-only adapter over the settlement chain's commitment contracts.
///
/// All operations are keyed by [`GlobalIndex`]; derivations walk the
/// batch-append events of the relevant chain in ascending order.
#[async_trait]
pub trait SettlementView: Send + Sync {
    /// Returns the header of the state batch containing `index`, or `None`
    /// when the index lies beyond the last appended batch.
    async fn state_root_batch_header(
        &self,
        index: GlobalIndex,
    ) -> Result<Option<BatchHeader>, ViewError>;

    /// Returns the committed state root at `index`.
    async fn state_root(&self, index: GlobalIndex) -> Result<B256, ViewError>;

    /// Returns the inclusion proof of the state root at `index`.
    async fn state_root_batch_proof(
        &self,
        index: GlobalIndex,
    ) -> Result<StateRootBatchProof, ViewError>;

    /// Returns the inclusion proof of the transaction at `index`.
    async fn transaction_batch_proof(
        &self,
        index: GlobalIndex,
    ) -> Result<TransactionBatchProof, ViewError>;
}

/// Read-only adapter over the rollup execution node.
#[async_trait]
pub trait RollupView: Send + Sync {
    /// Returns the state root of the given rollup block.
    async fn state_root(&self, block: u64) -> Result<B256, ViewError>;

    /// Returns the pre-execution witness for the given rollup block.
    ///
    /// Fails with [`ViewError::Unsupported`] when the node lacks the
    /// extension endpoint.
    async fn state_diff_proof(&self, block: u64) -> Result<StateDiffProof, ViewError>;

    /// Returns the code of `address` at the given rollup block.
    async fn code_at(&self, address: Address, block: u64) -> Result<Bytes, ViewError>;
}
