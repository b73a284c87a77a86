//! Settlement-chain view backed by an alloy provider.

use crate::{SettlementView, ViewError};
use alloy_consensus::Transaction as _;
use alloy_primitives::{Address, B256, Bytes, TxHash, U256, keccak256};
use alloy_provider::Provider;
use alloy_rlp::Decodable;
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use stakado_protocol::{
    BatchHeader, BatchInclusionProof, GlobalIndex, StateRootBatchProof, TransactionBatchProof,
    TransactionChainElement, merkle,
};
use tracing::trace;

sol! {
    /// The chain of state-root batch commitments.
    #[sol(rpc)]
    contract StateCommitmentChain {
        /// Emitted for every appended state batch.
        event StateBatchAppended(
            uint256 indexed _batchIndex,
            bytes32 _batchRoot,
            uint256 _batchSize,
            uint256 _prevTotalElements,
            bytes _extraData
        );

        /// Appends a batch of state roots.
        function appendStateBatch(bytes32[] calldata _batch, uint256 _shouldStartAtElement) external;
    }

    /// The chain of transaction batch commitments.
    #[sol(rpc)]
    contract CanonicalTransactionChain {
        /// Emitted for every appended transaction batch.
        event TransactionBatchAppended(
            uint256 indexed _batchIndex,
            bytes32 _batchRoot,
            uint256 _batchSize,
            uint256 _prevTotalElements,
            bytes _extraData
        );

        /// Appends a batch of RLP-encoded transaction chain elements.
        function appendTransactionBatch(bytes[] calldata _elements, uint256 _shouldStartAtElement) external;
    }
}

/// A [`SettlementView`] resolving batch data out of the commitment chains'
/// append events and the calldata of the appending transactions.
#[derive(Debug)]
pub struct AlloySettlementView<P: Provider + Clone> {
    /// Provider for transaction lookups.
    provider: P,
    /// State-commitment chain instance.
    scc: StateCommitmentChain::StateCommitmentChainInstance<P>,
    /// Canonical transaction chain instance.
    ctc: CanonicalTransactionChain::CanonicalTransactionChainInstance<P>,
}

impl<P: Provider + Clone> AlloySettlementView<P> {
    /// Creates a new view over the two commitment chains.
    pub fn new(
        provider: P,
        state_commitment_chain: Address,
        canonical_transaction_chain: Address,
    ) -> Self {
        let scc = StateCommitmentChain::new(state_commitment_chain, provider.clone());
        let ctc = CanonicalTransactionChain::new(canonical_transaction_chain, provider.clone());
        Self { provider, scc, ctc }
    }

    /// Walks state-batch append events until one encloses `index`.
    async fn locate_state_batch(
        &self,
        index: GlobalIndex,
    ) -> Result<Option<(BatchHeader, TxHash)>, ViewError> {
        let events = self.scc.StateBatchAppended_filter().from_block(0u64).query().await?;
        for (event, log) in events {
            let header = BatchHeader {
                batch_index: to_u64(event._batchIndex)?,
                batch_root: event._batchRoot,
                batch_size: to_u64(event._batchSize)?,
                prev_total_elements: to_u64(event._prevTotalElements)?,
                extra_data: event._extraData,
            };
            if header.contains(index) {
                let tx_hash = log
                    .transaction_hash
                    .ok_or(ViewError::BadBatch("append event lacks a transaction hash"))?;
                trace!(
                    target: "providers::settlement",
                    index,
                    batch_index = header.batch_index,
                    "Located enclosing state batch"
                );
                return Ok(Some((header, tx_hash)));
            }
        }
        Ok(None)
    }

    /// Walks transaction-batch append events until one encloses `index`.
    async fn locate_transaction_batch(
        &self,
        index: GlobalIndex,
    ) -> Result<Option<(BatchHeader, TxHash)>, ViewError> {
        let events = self.ctc.TransactionBatchAppended_filter().from_block(0u64).query().await?;
        for (event, log) in events {
            let header = BatchHeader {
                batch_index: to_u64(event._batchIndex)?,
                batch_root: event._batchRoot,
                batch_size: to_u64(event._batchSize)?,
                prev_total_elements: to_u64(event._prevTotalElements)?,
                extra_data: event._extraData,
            };
            if header.contains(index) {
                let tx_hash = log
                    .transaction_hash
                    .ok_or(ViewError::BadBatch("append event lacks a transaction hash"))?;
                return Ok(Some((header, tx_hash)));
            }
        }
        Ok(None)
    }

    /// Recovers a state batch's roots from the appending transaction.
    async fn state_batch_elements(&self, tx_hash: TxHash) -> Result<Vec<B256>, ViewError> {
        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await?
            .ok_or(ViewError::BadBatch("append transaction not found"))?;
        let call = StateCommitmentChain::appendStateBatchCall::abi_decode(tx.input())
            .map_err(|_| ViewError::BadBatch("append calldata does not decode"))?;
        Ok(call._batch)
    }

    /// Recovers a transaction batch's chain elements from the appending
    /// transaction.
    async fn transaction_batch_elements(&self, tx_hash: TxHash) -> Result<Vec<Bytes>, ViewError> {
        let tx = self
            .provider
            .get_transaction_by_hash(tx_hash)
            .await?
            .ok_or(ViewError::BadBatch("append transaction not found"))?;
        let call = CanonicalTransactionChain::appendTransactionBatchCall::abi_decode(tx.input())
            .map_err(|_| ViewError::BadBatch("append calldata does not decode"))?;
        Ok(call._elements)
    }
}

#[async_trait]
impl<P: Provider + Clone> SettlementView for AlloySettlementView<P> {
    async fn state_root_batch_header(
        &self,
        index: GlobalIndex,
    ) -> Result<Option<BatchHeader>, ViewError> {
        Ok(self.locate_state_batch(index).await?.map(|(header, _)| header))
    }

    async fn state_root(&self, index: GlobalIndex) -> Result<B256, ViewError> {
        let (header, tx_hash) =
            self.locate_state_batch(index).await?.ok_or(ViewError::NotFound(index))?;
        let roots = self.state_batch_elements(tx_hash).await?;
        roots
            .get(header.offset_of(index) as usize)
            .copied()
            .ok_or(ViewError::BadBatch("batch smaller than its header claims"))
    }

    async fn state_root_batch_proof(
        &self,
        index: GlobalIndex,
    ) -> Result<StateRootBatchProof, ViewError> {
        let (header, tx_hash) =
            self.locate_state_batch(index).await?.ok_or(ViewError::NotFound(index))?;
        let roots = self.state_batch_elements(tx_hash).await?;
        build_state_root_proof(header, &roots, index)
    }

    async fn transaction_batch_proof(
        &self,
        index: GlobalIndex,
    ) -> Result<TransactionBatchProof, ViewError> {
        let (header, tx_hash) =
            self.locate_transaction_batch(index).await?.ok_or(ViewError::NotFound(index))?;
        let elements = self.transaction_batch_elements(tx_hash).await?;
        build_transaction_proof(header, &elements, index)
    }
}

/// Assembles the inclusion proof of one state root against its batch.
fn build_state_root_proof(
    header: BatchHeader,
    roots: &[B256],
    index: GlobalIndex,
) -> Result<StateRootBatchProof, ViewError> {
    let offset = header.offset_of(index) as usize;
    let state_root =
        *roots.get(offset).ok_or(ViewError::BadBatch("batch smaller than its header claims"))?;

    let leaves: Vec<B256> = roots.iter().map(|root| keccak256(root)).collect();
    if merkle::merkle_root(&leaves) != header.batch_root {
        return Err(ViewError::BadBatch("recomputed batch root does not match the commitment"));
    }
    let siblings = merkle::merkle_proof(&leaves, offset)
        .ok_or(ViewError::BadBatch("batch smaller than its header claims"))?;

    Ok(StateRootBatchProof {
        state_root,
        header,
        proof: BatchInclusionProof { index: offset as u64, siblings },
    })
}

/// Assembles the inclusion proof of one transaction against its batch.
fn build_transaction_proof(
    header: BatchHeader,
    elements: &[Bytes],
    index: GlobalIndex,
) -> Result<TransactionBatchProof, ViewError> {
    let offset = header.offset_of(index) as usize;
    let raw = elements
        .get(offset)
        .ok_or(ViewError::BadBatch("batch smaller than its header claims"))?;
    let element = TransactionChainElement::decode(&mut raw.as_ref())?;
    let transaction = element.transaction()?;

    let leaves: Vec<B256> = elements.iter().map(|element| keccak256(element)).collect();
    if merkle::merkle_root(&leaves) != header.batch_root {
        return Err(ViewError::BadBatch("recomputed batch root does not match the commitment"));
    }
    let siblings = merkle::merkle_proof(&leaves, offset)
        .ok_or(ViewError::BadBatch("batch smaller than its header claims"))?;

    Ok(TransactionBatchProof {
        transaction,
        element,
        header,
        proof: BatchInclusionProof { index: offset as u64, siblings },
    })
}

fn to_u64(value: U256) -> Result<u64, ViewError> {
    u64::try_from(value).map_err(|_| ViewError::BadBatch("batch counter exceeds 64 bits"))
}
