//! End-to-end tests of the phase driver against a scripted in-memory chain.
//!
//! The fake chain implements the verifier/transitioner/state-manager
//! protocol faithfully enough to exercise phase ordering, race-revert
//! filtering, event-driven trie reconciliation, and the cursor rewind,
//! without verifying the submitted merkle witnesses themselves (the trie
//! crate's tests cover those cryptographically).

use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use async_trait::async_trait;
use stakado_mpt::ProofTrie;
use stakado_protocol::{
    AccountStateProof, BatchHeader, StateDiffProof, StateRootBatchProof, StorageStateProof,
    TransactionBatchProof, encode_account, encode_storage_value,
};
use stakado_prover::{
    BytecodeDeployer, EMPTY_CODE_CARRIER, FraudProofData, ManagedAccount, PhaseDriver,
    ProverError, StateManagerHandle, TransitionPhase, TransitionerHandle, VerifierHandle,
};
use stakado_providers::{RollupView, ViewError};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

const TRANSITIONER: Address = Address::repeat_byte(0x11);
const MANAGER: Address = Address::repeat_byte(0x22);
const BLOCK_OFFSET: u64 = 1;
const PREV_TOTAL_ELEMENTS: u64 = 5;
const SUSPECT_INDEX: u64 = 7;

/// Shared state of the scripted chain.
#[derive(Debug, Default)]
struct Chain {
    bound: bool,
    phase: Phase,
    finalized: bool,
    applied: bool,
    proven_accounts: HashSet<Address>,
    proven_slots: HashSet<(Address, B256)>,
    /// Replay outcome, fixed up front: accounts and slots the disputed
    /// transaction changes, with their post-state values.
    post_accounts: HashMap<Address, ManagedAccount>,
    post_slots: HashMap<(Address, B256), B256>,
    changed_accounts: Vec<Address>,
    changed_slots: Vec<(Address, B256)>,
    committed_accounts: Vec<Address>,
    committed_slots: Vec<(Address, B256)>,
    /// When set, the next `initializeFraudVerification` loses the race.
    init_race: bool,
    /// When set, the next account commit is preempted by a peer committing
    /// this address, invalidating our root.
    commit_interference: Option<Address>,
    /// Code carriers passed to `proveContractState`, per account.
    carriers: Vec<(Address, Address)>,
    log: Vec<&'static str>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Phase {
    #[default]
    Pre,
    Post,
    Complete,
}

impl Phase {
    fn as_transition_phase(self) -> TransitionPhase {
        match self {
            Self::Pre => TransitionPhase::PreExecution,
            Self::Post => TransitionPhase::PostExecution,
            Self::Complete => TransitionPhase::Complete,
        }
    }
}

fn guard() -> ProverError {
    ProverError::Revert("Function must be called during the correct phase.".to_string())
}

#[derive(Debug, Clone, Default)]
struct FakeVerifier {
    chain: Arc<Mutex<Chain>>,
}

#[async_trait]
impl VerifierHandle for FakeVerifier {
    async fn transitioner_address(
        &self,
        _pre_state_root: B256,
        _tx_hash: B256,
    ) -> Result<Address, ProverError> {
        let chain = self.chain.lock().unwrap();
        Ok(if chain.bound { TRANSITIONER } else { Address::ZERO })
    }

    async fn initialize_fraud_verification(
        &self,
        _data: &FraudProofData,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.bound {
            return Err(ProverError::Revert(
                "Transitioner has already been initialized.".to_string(),
            ));
        }
        chain.bound = true;
        if chain.init_race {
            // a peer's initialization landed between our read and our write
            return Err(ProverError::Revert(
                "Transitioner has already been initialized.".to_string(),
            ));
        }
        chain.log.push("initialize");
        Ok(())
    }

    async fn finalize_fraud_verification(
        &self,
        _data: &FraudProofData,
        _tx_hash: B256,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.finalized {
            return Err(ProverError::Revert("Invalid batch header.".to_string()));
        }
        if chain.phase != Phase::Complete {
            return Err(guard());
        }
        chain.finalized = true;
        chain.log.push("finalize");
        Ok(())
    }

    fn transitioner(&self, address: Address) -> Box<dyn TransitionerHandle> {
        assert_eq!(address, TRANSITIONER);
        Box::new(FakeTransitioner { chain: self.chain.clone() })
    }

    fn state_manager(&self, address: Address) -> Box<dyn StateManagerHandle> {
        assert_eq!(address, MANAGER);
        Box::new(FakeManager { chain: self.chain.clone() })
    }
}

#[derive(Debug)]
struct FakeTransitioner {
    chain: Arc<Mutex<Chain>>,
}

#[async_trait]
impl TransitionerHandle for FakeTransitioner {
    async fn phase(&self) -> Result<TransitionPhase, ProverError> {
        Ok(self.chain.lock().unwrap().phase.as_transition_phase())
    }

    async fn state_manager(&self) -> Result<Address, ProverError> {
        Ok(MANAGER)
    }

    async fn prove_contract_state(
        &self,
        account: Address,
        code_carrier: Address,
        _witness: Bytes,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.phase != Phase::Pre {
            return Err(guard());
        }
        if !chain.proven_accounts.insert(account) {
            return Err(ProverError::Revert(
                "Account state has already been proven.".to_string(),
            ));
        }
        chain.carriers.push((account, code_carrier));
        chain.log.push("prove_account");
        Ok(())
    }

    async fn prove_storage_slot(
        &self,
        account: Address,
        key: B256,
        _witness: Bytes,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.phase != Phase::Pre {
            return Err(guard());
        }
        if !chain.proven_slots.insert((account, key)) {
            return Err(ProverError::Revert(
                "Storage slot has already been proven.".to_string(),
            ));
        }
        chain.log.push("prove_slot");
        Ok(())
    }

    async fn apply_transaction(
        &self,
        _transaction: &stakado_protocol::RollupTransaction,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.phase != Phase::Pre {
            return Err(guard());
        }
        chain.applied = true;
        chain.phase = Phase::Post;
        chain.log.push("apply");
        Ok(())
    }

    async fn commit_contract_state(
        &self,
        account: Address,
        _witness: Bytes,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.phase != Phase::Post {
            return Err(guard());
        }
        if let Some(peer_account) = chain.commit_interference.take() {
            // the peer's commit lands first and moves the working root
            chain.committed_accounts.push(peer_account);
            return Err(ProverError::Revert("Invalid root hash".to_string()));
        }
        if !chain.changed_accounts.contains(&account) ||
            chain.committed_accounts.contains(&account)
        {
            return Err(ProverError::Revert(
                "Account state wasn't changed or has already been committed.".to_string(),
            ));
        }
        chain.committed_accounts.push(account);
        chain.log.push("commit_account");
        Ok(())
    }

    async fn commit_storage_slot(
        &self,
        account: Address,
        key: B256,
        _witness: Bytes,
    ) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.phase != Phase::Post {
            return Err(guard());
        }
        if !chain.changed_slots.contains(&(account, key)) ||
            chain.committed_slots.contains(&(account, key))
        {
            return Err(ProverError::Revert(
                "Storage slot wasn't changed or has already been committed.".to_string(),
            ));
        }
        chain.committed_slots.push((account, key));
        chain.log.push("commit_slot");
        Ok(())
    }

    async fn complete_transition(&self) -> Result<(), ProverError> {
        let mut chain = self.chain.lock().unwrap();
        if chain.phase != Phase::Post {
            return Err(guard());
        }
        assert_eq!(
            chain.changed_accounts.len(),
            chain.committed_accounts.len(),
            "completeTransition with uncommitted accounts"
        );
        assert_eq!(
            chain.changed_slots.len(),
            chain.committed_slots.len(),
            "completeTransition with uncommitted slots"
        );
        chain.phase = Phase::Complete;
        chain.log.push("complete");
        Ok(())
    }

    async fn committed_accounts(&self) -> Result<Vec<Address>, ProverError> {
        Ok(self.chain.lock().unwrap().committed_accounts.clone())
    }

    async fn committed_slots(&self) -> Result<Vec<(Address, B256)>, ProverError> {
        Ok(self.chain.lock().unwrap().committed_slots.clone())
    }
}

#[derive(Debug)]
struct FakeManager {
    chain: Arc<Mutex<Chain>>,
}

#[async_trait]
impl StateManagerHandle for FakeManager {
    async fn has_account(&self, account: Address) -> Result<bool, ProverError> {
        Ok(self.chain.lock().unwrap().proven_accounts.contains(&account))
    }

    async fn account(&self, account: Address) -> Result<ManagedAccount, ProverError> {
        Ok(self
            .chain
            .lock()
            .unwrap()
            .post_accounts
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn storage(&self, account: Address, key: B256) -> Result<B256, ProverError> {
        Ok(self
            .chain
            .lock()
            .unwrap()
            .post_slots
            .get(&(account, key))
            .copied()
            .unwrap_or_default())
    }

    async fn was_account_changed(&self, account: Address) -> Result<bool, ProverError> {
        let chain = self.chain.lock().unwrap();
        Ok(chain.applied && chain.changed_accounts.contains(&account))
    }

    async fn was_account_committed(&self, account: Address) -> Result<bool, ProverError> {
        Ok(self.chain.lock().unwrap().committed_accounts.contains(&account))
    }

    async fn was_slot_changed(&self, account: Address, key: B256) -> Result<bool, ProverError> {
        let chain = self.chain.lock().unwrap();
        Ok(chain.applied && chain.changed_slots.contains(&(account, key)))
    }

    async fn was_slot_committed(&self, account: Address, key: B256) -> Result<bool, ProverError> {
        Ok(self.chain.lock().unwrap().committed_slots.contains(&(account, key)))
    }

    async fn uncommitted_accounts(&self) -> Result<u64, ProverError> {
        let chain = self.chain.lock().unwrap();
        if !chain.applied {
            return Ok(0);
        }
        let committed: HashSet<_> = chain.committed_accounts.iter().collect();
        Ok(chain.changed_accounts.iter().filter(|account| !committed.contains(account)).count()
            as u64)
    }

    async fn uncommitted_slots(&self) -> Result<u64, ProverError> {
        let chain = self.chain.lock().unwrap();
        if !chain.applied {
            return Ok(0);
        }
        let committed: HashSet<_> = chain.committed_slots.iter().collect();
        Ok(chain.changed_slots.iter().filter(|slot| !committed.contains(slot)).count() as u64)
    }
}

#[derive(Debug, Default)]
struct FakeDeployer {
    deployed: Mutex<Vec<Bytes>>,
}

#[async_trait]
impl BytecodeDeployer for FakeDeployer {
    async fn deploy_code(&self, code: &Bytes) -> Result<Address, ProverError> {
        let mut deployed = self.deployed.lock().unwrap();
        deployed.push(code.clone());
        Ok(Address::repeat_byte(0xd0 + deployed.len() as u8))
    }
}

#[derive(Debug, Default)]
struct FakeRollup {
    code: HashMap<Address, Bytes>,
}

#[async_trait]
impl RollupView for FakeRollup {
    async fn state_root(&self, block: u64) -> Result<B256, ViewError> {
        Err(ViewError::NotFound(block))
    }

    async fn state_diff_proof(&self, block: u64) -> Result<StateDiffProof, ViewError> {
        Err(ViewError::NotFound(block))
    }

    async fn code_at(&self, address: Address, _block: u64) -> Result<Bytes, ViewError> {
        Ok(self.code.get(&address).cloned().unwrap_or_default())
    }
}

/// One witnessed account of the fixture.
struct WitnessAccount {
    address: Address,
    nonce: u64,
    slots: Vec<(B256, B256)>,
}

fn account(byte: u8, nonce: u64, slots: Vec<(B256, B256)>) -> WitnessAccount {
    WitnessAccount { address: Address::repeat_byte(byte), nonce, slots }
}

/// Builds a [`FraudProofData`] whose tries really contain the witnessed
/// accounts, so the driver's proof generation operates on valid state.
fn witness_fixture(accounts: &[WitnessAccount]) -> FraudProofData {
    let mut state_trie = ProofTrie::default();
    let mut account_proofs = Vec::new();

    let mut storage_tries = alloy_primitives::map::HashMap::default();
    for account in accounts {
        let mut storage_trie = ProofTrie::default();
        for (key, value) in &account.slots {
            storage_trie
                .insert(keccak256(key).as_slice(), &encode_storage_value(*value))
                .unwrap();
        }
        storage_tries.insert(account.address, storage_trie);
    }

    for account in accounts {
        let storage_root = storage_tries[&account.address].root();
        let encoded =
            encode_account(account.nonce, U256::from(1_000u64), storage_root, B256::ZERO);
        state_trie.insert(keccak256(account.address).as_slice(), &encoded).unwrap();
    }

    for account in accounts {
        let storage_root = storage_tries[&account.address].root();
        let storage_proof = account
            .slots
            .iter()
            .map(|(key, value)| StorageStateProof {
                key: *key,
                value: *value,
                proof: storage_tries[&account.address]
                    .create_proof(keccak256(key).as_slice())
                    .unwrap(),
            })
            .collect();
        account_proofs.push(AccountStateProof {
            address: account.address,
            nonce: account.nonce,
            balance: U256::from(1_000u64),
            code_hash: B256::ZERO,
            storage_root,
            account_proof: state_trie.create_proof(keccak256(account.address).as_slice()).unwrap(),
            storage_proof,
        });
    }

    let header = BatchHeader {
        batch_index: 1,
        batch_size: 4,
        prev_total_elements: PREV_TOTAL_ELEMENTS,
        ..Default::default()
    };

    FraudProofData {
        pre_state_root_proof: StateRootBatchProof {
            state_root: state_trie.root(),
            header: header.clone(),
            ..Default::default()
        },
        post_state_root_proof: StateRootBatchProof {
            state_root: B256::repeat_byte(0xbd),
            header,
            ..Default::default()
        },
        transaction_proof: TransactionBatchProof::default(),
        state_diff_proof: StateDiffProof {
            account_state_proofs: account_proofs,
            ..Default::default()
        },
        state_trie,
        storage_tries,
    }
}

/// Marks the fixture's accounts and slots as changed by the replay, with
/// bumped post-state values.
fn plan_changes(chain: &Arc<Mutex<Chain>>, accounts: &[WitnessAccount]) {
    let mut chain = chain.lock().unwrap();
    for account in accounts {
        chain.changed_accounts.push(account.address);
        chain.post_accounts.insert(
            account.address,
            ManagedAccount {
                nonce: account.nonce + 1,
                balance: U256::from(900u64),
                storage_root: B256::repeat_byte(0x33),
                code_hash: B256::ZERO,
            },
        );
        for (key, _) in &account.slots {
            chain.changed_slots.push((account.address, *key));
            chain.post_slots.insert((account.address, *key), keccak256(key));
        }
    }
}

fn slot(byte: u8) -> (B256, B256) {
    (B256::repeat_byte(byte), B256::repeat_byte(byte ^ 0xff))
}

#[tokio::test]
async fn test_clean_run_single_dispute() {
    let accounts = vec![
        account(0xa1, 7, vec![slot(0x01), slot(0x02)]),
        account(0xa2, 0, vec![slot(0x03)]),
        account(0xa3, 3, vec![]),
    ];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup {
        code: [(accounts[0].address, Bytes::from_static(&[0x60, 0x01]))].into_iter().collect(),
    };

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    let cursor = driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();

    // the cursor rewinds to the start of the disputed root's batch
    assert_eq!(cursor, PREV_TOTAL_ELEMENTS);

    let chain = verifier.chain.lock().unwrap();
    assert!(chain.finalized);
    assert_eq!(chain.committed_accounts.len(), 3);
    assert_eq!(chain.committed_slots.len(), 3);
    // only the account with code triggered a carrier deployment; the other
    // two carry the sentinel
    assert_eq!(deployer.deployed.lock().unwrap().len(), 1);
    assert_ne!(chain.carriers[0].1, EMPTY_CODE_CARRIER);
    assert_eq!(chain.carriers[1].1, EMPTY_CODE_CARRIER);
    assert_eq!(chain.carriers[2].1, EMPTY_CODE_CARRIER);

    // the write sequence respects the phase machine
    let log = chain.log.clone();
    assert_eq!(log[0], "initialize");
    assert_eq!(log[1..4], ["prove_account"; 3]);
    assert_eq!(log[4..7], ["prove_slot"; 3]);
    assert_eq!(log[7], "apply");
    assert_eq!(log[8..11], ["commit_account"; 3]);
    assert_eq!(log[11..14], ["commit_slot"; 3]);
    assert_eq!(log[14], "complete");
    assert_eq!(log[15], "finalize");
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let accounts = vec![account(0xa1, 1, vec![slot(0x01)])];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    let first = driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();
    let writes_after_first = verifier.chain.lock().unwrap().log.len();

    // a second full run over the settled dispute only observes race reverts
    let mut fresh = witness_fixture(&accounts);
    let second = driver.drive(SUSPECT_INDEX, &mut fresh).await.unwrap();

    assert_eq!(first, second);
    let chain = verifier.chain.lock().unwrap();
    assert_eq!(chain.log.len(), writes_after_first);
    assert!(chain.finalized);
}

#[tokio::test]
async fn test_peer_wins_initialization() {
    let accounts = vec![account(0xa1, 1, vec![slot(0x01)])];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    // the transitioner already exists when we first look
    verifier.chain.lock().unwrap().bound = true;
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    let cursor = driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();

    assert_eq!(cursor, PREV_TOTAL_ELEMENTS);
    let chain = verifier.chain.lock().unwrap();
    assert!(chain.finalized);
    assert!(!chain.log.contains(&"initialize"));
}

#[tokio::test]
async fn test_initialization_race_is_adopted() {
    let accounts = vec![account(0xa1, 1, vec![])];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    // our read sees the zero address but a peer's write lands first
    verifier.chain.lock().unwrap().init_race = true;
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    let cursor = driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();

    assert_eq!(cursor, PREV_TOTAL_ELEMENTS);
    let chain = verifier.chain.lock().unwrap();
    assert!(chain.finalized);
    assert!(!chain.log.contains(&"initialize"));
}

#[tokio::test]
async fn test_peer_commit_invalidates_root_and_is_reconciled() {
    let accounts = vec![
        account(0xa1, 1, vec![]),
        account(0xa2, 2, vec![]),
        account(0xa3, 3, vec![]),
    ];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    // a peer commits the third account right before our first commit lands
    verifier.chain.lock().unwrap().commit_interference = Some(accounts[2].address);
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    let cursor = driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();
    assert_eq!(cursor, PREV_TOTAL_ELEMENTS);

    let chain = verifier.chain.lock().unwrap();
    assert!(chain.finalized);
    // the peer's commit is first in the log-ordered event list and every
    // witnessed account still ended up committed exactly once
    assert_eq!(chain.committed_accounts[0], accounts[2].address);
    let unique: HashSet<_> = chain.committed_accounts.iter().collect();
    assert_eq!(unique.len(), 3);

    // the peer's post-state was absorbed into the local trie before the
    // retried proof was generated
    let expected = chain.post_accounts[&accounts[2].address];
    let stored = data
        .state_trie
        .get(keccak256(accounts[2].address).as_slice())
        .unwrap()
        .expect("peer-committed account must be in the local trie");
    assert_eq!(
        stored.as_ref(),
        encode_account(expected.nonce, expected.balance, expected.storage_root, expected.code_hash)
            .as_ref()
    );
}

#[tokio::test]
async fn test_adopts_dispute_already_past_pre_execution() {
    let accounts = vec![account(0xa1, 1, vec![slot(0x07)])];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    {
        let mut chain = verifier.chain.lock().unwrap();
        chain.bound = true;
        chain.applied = true;
        chain.phase = Phase::Post;
    }
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();

    let chain = verifier.chain.lock().unwrap();
    assert!(chain.finalized);
    // pre-execution writes were skipped entirely
    assert!(!chain.log.contains(&"prove_account"));
    assert!(!chain.log.contains(&"apply"));
    assert!(chain.log.contains(&"commit_account"));
}

#[tokio::test]
async fn test_witness_missing_changed_account_is_inconsistent() {
    let accounts = vec![account(0xa1, 1, vec![])];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    {
        // the replay also changes an account the diff proof never covered
        let mut chain = verifier.chain.lock().unwrap();
        chain.changed_accounts.push(Address::repeat_byte(0xee));
    }
    let deployer = FakeDeployer::default();
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    let err = driver.drive(SUSPECT_INDEX, &mut data).await.unwrap_err();

    assert!(matches!(err, ProverError::Inconsistent(_)), "got {err:?}");
    let chain = verifier.chain.lock().unwrap();
    assert!(!chain.finalized);
    assert!(!chain.log.contains(&"complete"));
}

#[tokio::test]
async fn test_empty_code_accounts_use_the_sentinel_carrier() {
    let accounts = vec![account(0xa1, 1, vec![]), account(0xa2, 2, vec![])];
    let mut data = witness_fixture(&accounts);

    let verifier = FakeVerifier::default();
    plan_changes(&verifier.chain, &accounts);
    let deployer = FakeDeployer::default();
    // neither account has code on the rollup
    let rollup = FakeRollup::default();

    let driver = PhaseDriver::new(&verifier, &deployer, &rollup, BLOCK_OFFSET);
    driver.drive(SUSPECT_INDEX, &mut data).await.unwrap();

    assert!(deployer.deployed.lock().unwrap().is_empty());
    let chain = verifier.chain.lock().unwrap();
    assert!(chain.carriers.iter().all(|(_, carrier)| *carrier == EMPTY_CODE_CARRIER));
    assert!(chain.finalized);
}
