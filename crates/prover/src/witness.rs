//! Fraud witness assembly.

use crate::ProverError;
use alloy_primitives::{Address, B256, map::HashMap};
use stakado_mpt::ProofTrie;
use stakado_protocol::{
    GlobalIndex, StateDiffProof, StateRootBatchProof, TransactionBatchProof,
};
use stakado_providers::{RollupView, SettlementView};
use tracing::debug;

/// The self-contained witness for one dispute.
///
/// The tries are live working copies: the phase driver mutates them in
/// lock-step with the on-chain commitments so every inclusion proof it
/// submits stays valid against the transitioner's latest root.
#[derive(Debug, Clone)]
pub struct FraudProofData {
    /// Inclusion proof of the last trusted state root, at `index - 1`.
    pub pre_state_root_proof: StateRootBatchProof,
    /// Inclusion proof of the disputed state root, at `index`.
    pub post_state_root_proof: StateRootBatchProof,
    /// Inclusion proof of the disputed transaction.
    pub transaction_proof: TransactionBatchProof,
    /// Pre-execution witness for every touched account and slot.
    pub state_diff_proof: StateDiffProof,
    /// Live view of the state trie under the pre-state root.
    pub state_trie: ProofTrie,
    /// Live views of the touched accounts' storage tries.
    pub storage_tries: HashMap<Address, ProofTrie>,
}

impl FraudProofData {
    /// Hash keying the dispute on the verifier.
    pub fn tx_hash(&self) -> B256 {
        self.transaction_proof.transaction.tx_hash()
    }
}

/// Materializes the full witness bundle for the suspect `index`.
///
/// All four reads must succeed; partial results are discarded.
pub async fn assemble<L1, L2>(
    settlement: &L1,
    rollup: &L2,
    index: GlobalIndex,
    block_offset: u64,
) -> Result<FraudProofData, ProverError>
where
    L1: SettlementView + ?Sized,
    L2: RollupView + ?Sized,
{
    if index == 0 {
        return Err(ProverError::Inconsistent("the genesis state root has no pre-state to dispute"));
    }

    let pre_state_root_proof = settlement.state_root_batch_proof(index - 1).await?;
    let post_state_root_proof = settlement.state_root_batch_proof(index).await?;
    let transaction_proof = settlement.transaction_batch_proof(index).await?;
    let state_diff_proof = rollup.state_diff_proof(index + block_offset - 1).await?;

    let state_trie = ProofTrie::from_proofs(
        pre_state_root_proof.state_root,
        state_diff_proof.account_state_proofs.iter().map(|account| account.account_proof.as_slice()),
    )?;

    let mut storage_tries = HashMap::default();
    for account in &state_diff_proof.account_state_proofs {
        let trie = ProofTrie::from_proofs(
            account.storage_root,
            account.storage_proof.iter().map(|slot| slot.proof.as_slice()),
        )?;
        storage_tries.insert(account.address, trie);
    }

    debug!(
        target: "prover::witness",
        index,
        accounts = state_diff_proof.account_state_proofs.len(),
        "Assembled fraud witness"
    );

    Ok(FraudProofData {
        pre_state_root_proof,
        post_state_root_proof,
        transaction_proof,
        state_diff_proof,
        state_trie,
        storage_tries,
    })
}
