//! Alloy-backed handles over the dispute contracts.

use crate::{
    FraudProofData, ManagedAccount, ProverError, StateManagerHandle, TransitionPhase,
    TransitionerHandle, VerifierHandle,
    contracts::{FraudVerifier, StateManager, StateTransitioner},
};
use alloy_primitives::{Address, B256, Bytes};
use alloy_provider::Provider;
use async_trait::async_trait;
use stakado_protocol::RollupTransaction;

/// Preflights a call to surface the revert reason, then lands it and waits
/// for the receipt. The race classes the phase driver filters on are decoded
/// out of the preflight; a transaction that still reverts on-chain after a
/// clean preflight lost a race it cannot name and aborts the dispute.
macro_rules! submit {
    ($call:expr) => {{
        let call = $call;
        match call.call().await {
            Ok(_) => match call.send().await {
                Ok(pending) => match pending.get_receipt().await {
                    Ok(receipt) if receipt.status() => Ok(()),
                    Ok(_) => {
                        Err(ProverError::Submission("transaction reverted on-chain".to_string()))
                    }
                    Err(err) => Err(ProverError::Submission(err.to_string())),
                },
                Err(err) => Err(ProverError::from(err)),
            },
            Err(err) => Err(ProverError::from(err)),
        }
    }};
}

/// [`VerifierHandle`] over the on-chain fraud verifier.
#[derive(Debug)]
pub struct AlloyVerifier<P: Provider + Clone + 'static> {
    provider: P,
    instance: FraudVerifier::FraudVerifierInstance<P>,
    deploy_gas_limit: u64,
    run_gas_limit: u64,
}

impl<P: Provider + Clone + 'static> AlloyVerifier<P> {
    /// Creates a verifier handle with the configured gas limits for the
    /// writes it and its sub-handles submit.
    pub fn new(provider: P, address: Address, deploy_gas_limit: u64, run_gas_limit: u64) -> Self {
        let instance = FraudVerifier::new(address, provider.clone());
        Self { provider, instance, deploy_gas_limit, run_gas_limit }
    }
}

#[async_trait]
impl<P: Provider + Clone + 'static> VerifierHandle for AlloyVerifier<P> {
    async fn transitioner_address(
        &self,
        pre_state_root: B256,
        tx_hash: B256,
    ) -> Result<Address, ProverError> {
        self.instance
            .getStateTransitioner(pre_state_root, tx_hash)
            .call()
            .await
            .map_err(ProverError::from)
    }

    async fn initialize_fraud_verification(
        &self,
        data: &FraudProofData,
    ) -> Result<(), ProverError> {
        let pre = &data.pre_state_root_proof;
        let txp = &data.transaction_proof;
        submit!(self.instance.initializeFraudVerification(
            pre.state_root,
            (&pre.header).into(),
            (&pre.proof).into(),
            (&txp.transaction).into(),
            (&txp.element).into(),
            (&txp.header).into(),
            (&txp.proof).into(),
        ))
    }

    async fn finalize_fraud_verification(
        &self,
        data: &FraudProofData,
        tx_hash: B256,
    ) -> Result<(), ProverError> {
        let pre = &data.pre_state_root_proof;
        let post = &data.post_state_root_proof;
        submit!(self.instance.finalizeFraudVerification(
            pre.state_root,
            (&pre.header).into(),
            (&pre.proof).into(),
            tx_hash,
            post.state_root,
            (&post.header).into(),
            (&post.proof).into(),
        ))
    }

    fn transitioner(&self, address: Address) -> Box<dyn TransitionerHandle> {
        Box::new(AlloyTransitioner {
            instance: StateTransitioner::new(address, self.provider.clone()),
            deploy_gas_limit: self.deploy_gas_limit,
            run_gas_limit: self.run_gas_limit,
        })
    }

    fn state_manager(&self, address: Address) -> Box<dyn StateManagerHandle> {
        Box::new(AlloyStateManager { instance: StateManager::new(address, self.provider.clone()) })
    }
}

/// [`TransitionerHandle`] over a deployed state transitioner.
#[derive(Debug)]
struct AlloyTransitioner<P: Provider + Clone> {
    instance: StateTransitioner::StateTransitionerInstance<P>,
    deploy_gas_limit: u64,
    run_gas_limit: u64,
}

#[async_trait]
impl<P: Provider + Clone + 'static> TransitionerHandle for AlloyTransitioner<P> {
    async fn phase(&self) -> Result<TransitionPhase, ProverError> {
        let raw = self.instance.phase().call().await.map_err(ProverError::from)?;
        TransitionPhase::try_from(raw)
    }

    async fn state_manager(&self) -> Result<Address, ProverError> {
        self.instance.stateManager().call().await.map_err(ProverError::from)
    }

    async fn prove_contract_state(
        &self,
        account: Address,
        code_carrier: Address,
        witness: Bytes,
    ) -> Result<(), ProverError> {
        submit!(self.instance.proveContractState(account, code_carrier, witness))
    }

    async fn prove_storage_slot(
        &self,
        account: Address,
        key: B256,
        witness: Bytes,
    ) -> Result<(), ProverError> {
        submit!(self.instance.proveStorageSlot(account, key, witness))
    }

    async fn apply_transaction(&self, transaction: &RollupTransaction) -> Result<(), ProverError> {
        submit!(self.instance.applyTransaction(transaction.into()).gas(self.run_gas_limit))
    }

    async fn commit_contract_state(
        &self,
        account: Address,
        witness: Bytes,
    ) -> Result<(), ProverError> {
        submit!(self.instance.commitContractState(account, witness).gas(self.deploy_gas_limit))
    }

    async fn commit_storage_slot(
        &self,
        account: Address,
        key: B256,
        witness: Bytes,
    ) -> Result<(), ProverError> {
        submit!(self.instance.commitStorageSlot(account, key, witness).gas(self.deploy_gas_limit))
    }

    async fn complete_transition(&self) -> Result<(), ProverError> {
        submit!(self.instance.completeTransition())
    }

    async fn committed_accounts(&self) -> Result<Vec<Address>, ProverError> {
        let events = self
            .instance
            .AccountCommitted_filter()
            .from_block(0u64)
            .query()
            .await
            .map_err(ProverError::from)?;
        Ok(events.into_iter().map(|(event, _)| event._address).collect())
    }

    async fn committed_slots(&self) -> Result<Vec<(Address, B256)>, ProverError> {
        let events = self
            .instance
            .StorageSlotCommitted_filter()
            .from_block(0u64)
            .query()
            .await
            .map_err(ProverError::from)?;
        Ok(events.into_iter().map(|(event, _)| (event._address, event._key)).collect())
    }
}

/// [`StateManagerHandle`] over a deployed state manager.
#[derive(Debug)]
struct AlloyStateManager<P: Provider + Clone> {
    instance: StateManager::StateManagerInstance<P>,
}

#[async_trait]
impl<P: Provider + Clone + 'static> StateManagerHandle for AlloyStateManager<P> {
    async fn has_account(&self, account: Address) -> Result<bool, ProverError> {
        self.instance.hasAccount(account).call().await.map_err(ProverError::from)
    }

    async fn account(&self, account: Address) -> Result<ManagedAccount, ProverError> {
        let state = self.instance.getAccount(account).call().await.map_err(ProverError::from)?;
        Ok(ManagedAccount {
            nonce: u64::try_from(state.nonce).map_err(|_| {
                ProverError::Submission("state manager reports a nonce beyond 64 bits".to_string())
            })?,
            balance: state.balance,
            storage_root: state.storageRoot,
            code_hash: state.codeHash,
        })
    }

    async fn storage(&self, account: Address, key: B256) -> Result<B256, ProverError> {
        self.instance.getContractStorage(account, key).call().await.map_err(ProverError::from)
    }

    async fn was_account_changed(&self, account: Address) -> Result<bool, ProverError> {
        self.instance.wasAccountChanged(account).call().await.map_err(ProverError::from)
    }

    async fn was_account_committed(&self, account: Address) -> Result<bool, ProverError> {
        self.instance.wasAccountCommitted(account).call().await.map_err(ProverError::from)
    }

    async fn was_slot_changed(&self, account: Address, key: B256) -> Result<bool, ProverError> {
        self.instance.wasContractStorageChanged(account, key).call().await.map_err(ProverError::from)
    }

    async fn was_slot_committed(&self, account: Address, key: B256) -> Result<bool, ProverError> {
        self.instance
            .wasContractStorageCommitted(account, key)
            .call()
            .await
            .map_err(ProverError::from)
    }

    async fn uncommitted_accounts(&self) -> Result<u64, ProverError> {
        let count =
            self.instance.getTotalUncommittedAccounts().call().await.map_err(ProverError::from)?;
        u64::try_from(count).map_err(|_| {
            ProverError::Submission("uncommitted account counter exceeds 64 bits".to_string())
        })
    }

    async fn uncommitted_slots(&self) -> Result<u64, ProverError> {
        let count = self
            .instance
            .getTotalUncommittedContractStorage()
            .call()
            .await
            .map_err(ProverError::from)?;
        u64::try_from(count).map_err(|_| {
            ProverError::Submission("uncommitted storage counter exceeds 64 bits".to_string())
        })
    }
}
