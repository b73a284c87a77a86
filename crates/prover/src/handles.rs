//! Trait seams over the dispute contracts.
//!
//! The phase driver talks to the verifier, its per-dispute transitioner, and
//! the transitioner's state manager exclusively through these traits; the
//! alloy-backed implementations live in [`crate::AlloyVerifier`].

use crate::{FraudProofData, ProverError};
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use stakado_protocol::RollupTransaction;

/// Phase of a state transitioner.
///
/// The on-chain machine only ever moves forward; `INIT` is represented by
/// the absence of a transitioner, not a phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TransitionPhase {
    /// Collecting pre-state witnesses.
    PreExecution = 0,
    /// Committing post-state back through the transitioner.
    PostExecution = 1,
    /// Replay finished; the dispute may be finalized.
    Complete = 2,
}

impl TryFrom<u8> for TransitionPhase {
    type Error = ProverError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PreExecution),
            1 => Ok(Self::PostExecution),
            2 => Ok(Self::Complete),
            _ => Err(ProverError::Submission(format!("transitioner reports unknown phase {value}"))),
        }
    }
}

/// Account state as the state manager currently holds it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagedAccount {
    /// Current nonce.
    pub nonce: u64,
    /// Current balance.
    pub balance: U256,
    /// Current storage root.
    pub storage_root: B256,
    /// Current code hash.
    pub code_hash: B256,
}

/// Handle over the fraud verifier.
#[async_trait]
pub trait VerifierHandle: Send + Sync {
    /// Returns the transitioner bound to `(pre_state_root, tx_hash)`, or the
    /// zero address when no prover initialized the dispute yet.
    async fn transitioner_address(
        &self,
        pre_state_root: B256,
        tx_hash: B256,
    ) -> Result<Address, ProverError>;

    /// Submits `initializeFraudVerification` for the dispute.
    async fn initialize_fraud_verification(
        &self,
        data: &FraudProofData,
    ) -> Result<(), ProverError>;

    /// Submits `finalizeFraudVerification`, invalidating the disputed root.
    async fn finalize_fraud_verification(
        &self,
        data: &FraudProofData,
        tx_hash: B256,
    ) -> Result<(), ProverError>;

    /// Returns a handle over the transitioner at `address`.
    fn transitioner(&self, address: Address) -> Box<dyn TransitionerHandle>;

    /// Returns a handle over the state manager at `address`.
    fn state_manager(&self, address: Address) -> Box<dyn StateManagerHandle>;
}

/// Handle over a per-dispute state transitioner.
#[async_trait]
pub trait TransitionerHandle: Send + Sync {
    /// Current phase of the transitioner.
    async fn phase(&self) -> Result<TransitionPhase, ProverError>;

    /// Address of the transitioner's state manager.
    async fn state_manager(&self) -> Result<Address, ProverError>;

    /// Proves an account's pre-state into the state manager.
    async fn prove_contract_state(
        &self,
        account: Address,
        code_carrier: Address,
        witness: Bytes,
    ) -> Result<(), ProverError>;

    /// Proves a storage slot's pre-state into the state manager.
    async fn prove_storage_slot(
        &self,
        account: Address,
        key: B256,
        witness: Bytes,
    ) -> Result<(), ProverError>;

    /// Replays the disputed transaction, advancing to `POST_EXECUTION`.
    async fn apply_transaction(&self, transaction: &RollupTransaction) -> Result<(), ProverError>;

    /// Commits an account's post-state against the working root.
    async fn commit_contract_state(
        &self,
        account: Address,
        witness: Bytes,
    ) -> Result<(), ProverError>;

    /// Commits a storage slot's post-state against the working root.
    async fn commit_storage_slot(
        &self,
        account: Address,
        key: B256,
        witness: Bytes,
    ) -> Result<(), ProverError>;

    /// Seals the transitioner once nothing is left to commit.
    async fn complete_transition(&self) -> Result<(), ProverError>;

    /// Every account any prover committed on this transitioner, from genesis.
    async fn committed_accounts(&self) -> Result<Vec<Address>, ProverError>;

    /// Every storage slot any prover committed on this transitioner, from
    /// genesis.
    async fn committed_slots(&self) -> Result<Vec<(Address, B256)>, ProverError>;
}

/// Handle over a per-dispute state manager.
#[async_trait]
pub trait StateManagerHandle: Send + Sync {
    /// Whether the account's pre-state was proven already.
    async fn has_account(&self, account: Address) -> Result<bool, ProverError>;

    /// The manager's current view of the account.
    async fn account(&self, account: Address) -> Result<ManagedAccount, ProverError>;

    /// The manager's current value of a storage slot.
    async fn storage(&self, account: Address, key: B256) -> Result<B256, ProverError>;

    /// Whether the replay changed the account.
    async fn was_account_changed(&self, account: Address) -> Result<bool, ProverError>;

    /// Whether the account was committed back already.
    async fn was_account_committed(&self, account: Address) -> Result<bool, ProverError>;

    /// Whether the replay changed the slot.
    async fn was_slot_changed(&self, account: Address, key: B256) -> Result<bool, ProverError>;

    /// Whether the slot was committed back already.
    async fn was_slot_committed(&self, account: Address, key: B256) -> Result<bool, ProverError>;

    /// Number of changed accounts not yet committed.
    async fn uncommitted_accounts(&self) -> Result<u64, ProverError>;

    /// Number of changed slots not yet committed.
    async fn uncommitted_slots(&self) -> Result<u64, ProverError>;
}

/// Publishes code carriers on the settlement chain.
#[async_trait]
pub trait BytecodeDeployer: Send + Sync {
    /// Deploys a contract whose runtime code equals `code` byte for byte and
    /// returns its address.
    async fn deploy_code(&self, code: &Bytes) -> Result<Address, ProverError>;
}
