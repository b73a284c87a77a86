//! The three-phase dispute driver.
//!
//! One invocation owns one dispute: it binds (or adopts) the on-chain
//! transitioner for `(preStateRoot, txHash)`, walks it from `PRE_EXECUTION`
//! through `POST_EXECUTION` to `COMPLETE`, and finalizes the verification.
//! Every write is guarded by a read of the forward-progress predicate, and
//! every revert matching a race class is treated as a peer having made the
//! same progress first.

use crate::{
    BytecodeDeployer, EMPTY_CODE_CARRIER, FraudProofData, ProverError, StateManagerHandle,
    TransitionPhase, TransitionerHandle, VerifierHandle, races,
};
use alloy_primitives::{Address, B256, keccak256};
use stakado_protocol::{GlobalIndex, encode_account, encode_storage_value, encode_trie_witness};
use stakado_providers::RollupView;
use tracing::{debug, info};

/// Drives one dispute through the verifier's phase machine.
#[derive(Debug)]
pub struct PhaseDriver<'a, V, D, L2> {
    verifier: &'a V,
    deployer: &'a D,
    rollup: &'a L2,
    block_offset: u64,
}

impl<'a, V, D, L2> PhaseDriver<'a, V, D, L2>
where
    V: VerifierHandle,
    D: BytecodeDeployer,
    L2: RollupView,
{
    /// Creates a driver over the given collaborators.
    pub const fn new(verifier: &'a V, deployer: &'a D, rollup: &'a L2, block_offset: u64) -> Self {
        Self { verifier, deployer, rollup, block_offset }
    }

    /// Runs the dispute for the suspect `index` to completion.
    ///
    /// Returns the cursor to resume scanning from: the start of the batch
    /// containing the disputed root, so the remaining roots of that batch
    /// are re-examined under the corrected post-state.
    pub async fn drive(
        &self,
        index: GlobalIndex,
        data: &mut FraudProofData,
    ) -> Result<GlobalIndex, ProverError> {
        let pre_state_root = data.pre_state_root_proof.state_root;
        let tx_hash = data.tx_hash();

        // bind the transitioner, adopting a peer's instance when one exists
        let mut transitioner_address =
            self.verifier.transitioner_address(pre_state_root, tx_hash).await?;
        if transitioner_address.is_zero() {
            info!(target: "prover::phase", index, %pre_state_root, "Initializing fraud verification");
            match self.verifier.initialize_fraud_verification(data).await {
                Ok(()) => {}
                Err(ProverError::Revert(reason)) if races::is_initialize_race(&reason) => {
                    info!(target: "prover::phase", index, "A peer initialized the dispute first");
                }
                Err(err) => return Err(err),
            }
            transitioner_address =
                self.verifier.transitioner_address(pre_state_root, tx_hash).await?;
            if transitioner_address.is_zero() {
                return Err(ProverError::Submission(
                    "transitioner missing after initialization".to_string(),
                ));
            }
        }

        let transitioner = self.verifier.transitioner(transitioner_address);
        let manager_address = transitioner.state_manager().await?;
        let manager = self.verifier.state_manager(manager_address);

        if transitioner.phase().await? == TransitionPhase::PreExecution {
            self.prove_pre_state(index, &*transitioner, &*manager, data).await?;
        }

        if transitioner.phase().await? == TransitionPhase::PostExecution {
            self.commit_post_state(&*transitioner, &*manager, data).await?;
        }

        if transitioner.phase().await? == TransitionPhase::Complete {
            match self.verifier.finalize_fraud_verification(data, tx_hash).await {
                Ok(()) => {
                    info!(target: "prover::phase", index, "Fraudulent state root invalidated");
                }
                Err(ProverError::Revert(reason)) if races::is_finalize_race(&reason) => {
                    info!(target: "prover::phase", index, "A peer finalized the dispute first");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(data.pre_state_root_proof.header.prev_total_elements)
    }

    /// `PRE_EXECUTION`: prove every touched account and slot into the state
    /// manager, then replay the disputed transaction.
    ///
    /// A phase-guard revert at any point means a peer already advanced the
    /// machine; the remaining submissions are obsolete and the caller falls
    /// through to the next phase.
    async fn prove_pre_state(
        &self,
        index: GlobalIndex,
        transitioner: &dyn TransitionerHandle,
        manager: &dyn StateManagerHandle,
        data: &FraudProofData,
    ) -> Result<(), ProverError> {
        for account in &data.state_diff_proof.account_state_proofs {
            if manager.has_account(account.address).await? {
                continue;
            }

            let code = self.rollup.code_at(account.address, index + self.block_offset).await?;
            let carrier = if code.is_empty() {
                EMPTY_CODE_CARRIER
            } else {
                self.deployer.deploy_code(&code).await?
            };

            let witness = encode_trie_witness(&account.account_proof);
            match transitioner.prove_contract_state(account.address, carrier, witness).await {
                Ok(()) => {
                    debug!(target: "prover::phase", account = %account.address, "Proved account state");
                }
                Err(ProverError::Revert(reason)) if races::is_already_proven(&reason) => {}
                Err(ProverError::Revert(reason)) if races::is_phase_guard(&reason) => {
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        }

        for account in &data.state_diff_proof.account_state_proofs {
            for slot in &account.storage_proof {
                let witness = encode_trie_witness(&slot.proof);
                match transitioner.prove_storage_slot(account.address, slot.key, witness).await {
                    Ok(()) => {}
                    Err(ProverError::Revert(reason)) if races::is_already_proven(&reason) => {}
                    Err(ProverError::Revert(reason)) if races::is_phase_guard(&reason) => {
                        return Ok(());
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        match transitioner.apply_transaction(&data.transaction_proof.transaction).await {
            Ok(()) => {
                info!(target: "prover::phase", index, "Replayed disputed transaction on-chain");
                Ok(())
            }
            Err(ProverError::Revert(reason)) if races::is_phase_guard(&reason) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// `POST_EXECUTION`: commit every changed account and slot back through
    /// the transitioner while keeping the local tries aligned with the
    /// on-chain working roots.
    ///
    /// Both sub-loops re-read the commit event log on every iteration;
    /// absorbing every peer commit into the local trie before computing the
    /// next inclusion proof is what keeps the proofs valid under races.
    async fn commit_post_state(
        &self,
        transitioner: &dyn TransitionerHandle,
        manager: &dyn StateManagerHandle,
        data: &mut FraudProofData,
    ) -> Result<(), ProverError> {
        while manager.uncommitted_accounts().await? > 0 {
            let committed = transitioner.committed_accounts().await?;
            for account in &data.state_diff_proof.account_state_proofs {
                if !committed.contains(&account.address) {
                    continue;
                }
                let state = manager.account(account.address).await?;
                let encoded =
                    encode_account(state.nonce, state.balance, state.storage_root, state.code_hash);
                data.state_trie.insert(keccak256(account.address).as_slice(), &encoded)?;
            }

            let Some(address) = self.next_uncommitted_account(manager, data).await? else {
                return Err(ProverError::Inconsistent(
                    "no uncommitted account left in the witness while the on-chain counter is positive",
                ));
            };

            let proof = data.state_trie.create_proof(keccak256(address).as_slice())?;
            match transitioner.commit_contract_state(address, encode_trie_witness(&proof)).await {
                Ok(()) => {
                    debug!(target: "prover::phase", account = %address, "Committed account state");
                }
                Err(ProverError::Revert(reason)) if races::is_commit_invalidation(&reason) => {
                    debug!(target: "prover::phase", account = %address, reason, "Commit raced with a peer; reconciling");
                }
                Err(err) => return Err(err),
            }
        }

        while manager.uncommitted_slots().await? > 0 {
            let committed = transitioner.committed_slots().await?;
            for account in &data.state_diff_proof.account_state_proofs {
                for slot in &account.storage_proof {
                    if !committed.contains(&(account.address, slot.key)) {
                        continue;
                    }
                    let value = manager.storage(account.address, slot.key).await?;
                    let trie = data.storage_tries.get_mut(&account.address).ok_or(
                        ProverError::Inconsistent("storage trie missing for a witnessed account"),
                    )?;
                    trie.insert(keccak256(slot.key).as_slice(), &encode_storage_value(value))?;
                }
            }

            let Some((address, key)) = self.next_uncommitted_slot(manager, data).await? else {
                return Err(ProverError::Inconsistent(
                    "no uncommitted slot left in the witness while the on-chain counter is positive",
                ));
            };

            let trie = data
                .storage_tries
                .get(&address)
                .ok_or(ProverError::Inconsistent("storage trie missing for a witnessed account"))?;
            let proof = trie.create_proof(keccak256(key).as_slice())?;
            match transitioner.commit_storage_slot(address, key, encode_trie_witness(&proof)).await
            {
                Ok(()) => {
                    debug!(target: "prover::phase", account = %address, slot = %key, "Committed storage slot");
                }
                Err(ProverError::Revert(reason)) if races::is_commit_invalidation(&reason) => {
                    debug!(target: "prover::phase", account = %address, slot = %key, reason, "Commit raced with a peer; reconciling");
                }
                Err(err) => return Err(err),
            }
        }

        match transitioner.complete_transition().await {
            Ok(()) => Ok(()),
            Err(ProverError::Revert(reason)) if races::is_phase_guard(&reason) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Picks any witnessed account that is changed but not yet committed.
    async fn next_uncommitted_account(
        &self,
        manager: &dyn StateManagerHandle,
        data: &FraudProofData,
    ) -> Result<Option<Address>, ProverError> {
        for account in &data.state_diff_proof.account_state_proofs {
            if manager.was_account_changed(account.address).await?
                && !manager.was_account_committed(account.address).await?
            {
                return Ok(Some(account.address));
            }
        }
        Ok(None)
    }

    /// Picks any witnessed slot that is changed but not yet committed.
    async fn next_uncommitted_slot(
        &self,
        manager: &dyn StateManagerHandle,
        data: &FraudProofData,
    ) -> Result<Option<(Address, B256)>, ProverError> {
        for account in &data.state_diff_proof.account_state_proofs {
            for slot in &account.storage_proof {
                if manager.was_slot_changed(account.address, slot.key).await?
                    && !manager.was_slot_committed(account.address, slot.key).await?
                {
                    return Ok(Some((account.address, slot.key)));
                }
            }
        }
        Ok(None)
    }
}
