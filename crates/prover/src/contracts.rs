//! Settlement-chain contract bindings and codec conversions.

use crate::ProverError;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_sol_types::{Revert, SolError, sol};
use stakado_protocol::{
    BatchHeader, BatchInclusionProof, RollupTransaction, TransactionChainElement,
};

sol! {
    /// Batch header as the verifier consumes it.
    #[derive(Debug)]
    struct ChainBatchHeader {
        uint256 batchIndex;
        bytes32 batchRoot;
        uint256 batchSize;
        uint256 prevTotalElements;
        bytes extraData;
    }

    /// Within-batch inclusion proof.
    #[derive(Debug)]
    struct ChainInclusionProof {
        uint256 index;
        bytes32[] siblings;
    }

    /// A rollup transaction in ABI form.
    #[derive(Debug)]
    struct OvmTransaction {
        uint256 timestamp;
        uint256 blockNumber;
        uint8 l1QueueOrigin;
        address l1TxOrigin;
        address entrypoint;
        uint256 gasLimit;
        bytes data;
    }

    /// The committed chain element carrying the transaction.
    #[derive(Debug)]
    struct ChainElement {
        bool isSequenced;
        uint256 queueIndex;
        uint256 timestamp;
        uint256 blockNumber;
        bytes txData;
    }

    /// Name registry the settlement contracts resolve through.
    #[sol(rpc)]
    contract AddressManager {
        function getAddress(string memory _name) external view returns (address);
    }

    /// Entry point of the dispute protocol.
    #[sol(rpc)]
    contract FraudVerifier {
        function getStateTransitioner(bytes32 _preStateRoot, bytes32 _txHash) external view returns (address);

        function initializeFraudVerification(
            bytes32 _preStateRoot,
            ChainBatchHeader memory _preStateRootBatchHeader,
            ChainInclusionProof memory _preStateRootProof,
            OvmTransaction memory _transaction,
            ChainElement memory _txChainElement,
            ChainBatchHeader memory _transactionBatchHeader,
            ChainInclusionProof memory _transactionProof
        ) external;

        function finalizeFraudVerification(
            bytes32 _preStateRoot,
            ChainBatchHeader memory _preStateRootBatchHeader,
            ChainInclusionProof memory _preStateRootProof,
            bytes32 _txHash,
            bytes32 _postStateRoot,
            ChainBatchHeader memory _postStateRootBatchHeader,
            ChainInclusionProof memory _postStateRootProof
        ) external;
    }

    /// Per-dispute replay state machine.
    #[sol(rpc)]
    contract StateTransitioner {
        function phase() external view returns (uint8);
        function stateManager() external view returns (address);

        function proveContractState(address _ovmContractAddress, address _ethContractAddress, bytes memory _stateTrieWitness) external;
        function proveStorageSlot(address _ovmContractAddress, bytes32 _key, bytes memory _storageTrieWitness) external;
        function applyTransaction(OvmTransaction memory _transaction) external;
        function commitContractState(address _ovmContractAddress, bytes memory _stateTrieWitness) external;
        function commitStorageSlot(address _ovmContractAddress, bytes32 _key, bytes memory _storageTrieWitness) external;
        function completeTransition() external;

        event AccountCommitted(address _address);
        event StorageSlotCommitted(address _address, bytes32 _key);
    }

    /// Per-dispute sandboxed state the transitioner reads and writes.
    #[sol(rpc)]
    contract StateManager {
        function hasAccount(address _address) external view returns (bool);
        function getAccount(address _address) external view returns (uint256 nonce, uint256 balance, bytes32 storageRoot, bytes32 codeHash);
        function getContractStorage(address _contract, bytes32 _key) external view returns (bytes32);

        function wasAccountChanged(address _address) external view returns (bool);
        function wasAccountCommitted(address _address) external view returns (bool);
        function wasContractStorageChanged(address _contract, bytes32 _key) external view returns (bool);
        function wasContractStorageCommitted(address _contract, bytes32 _key) external view returns (bool);

        function getTotalUncommittedAccounts() external view returns (uint256);
        function getTotalUncommittedContractStorage() external view returns (uint256);
    }
}

impl From<&BatchHeader> for ChainBatchHeader {
    fn from(header: &BatchHeader) -> Self {
        Self {
            batchIndex: U256::from(header.batch_index),
            batchRoot: header.batch_root,
            batchSize: U256::from(header.batch_size),
            prevTotalElements: U256::from(header.prev_total_elements),
            extraData: header.extra_data.clone(),
        }
    }
}

impl From<&BatchInclusionProof> for ChainInclusionProof {
    fn from(proof: &BatchInclusionProof) -> Self {
        Self { index: U256::from(proof.index), siblings: proof.siblings.clone() }
    }
}

impl From<&RollupTransaction> for OvmTransaction {
    fn from(tx: &RollupTransaction) -> Self {
        Self {
            timestamp: U256::from(tx.timestamp),
            blockNumber: U256::from(tx.block_number),
            l1QueueOrigin: tx.l1_queue_origin as u8,
            l1TxOrigin: tx.l1_tx_origin,
            entrypoint: tx.entrypoint,
            gasLimit: U256::from(tx.gas_limit),
            data: tx.data.clone(),
        }
    }
}

impl From<&TransactionChainElement> for ChainElement {
    fn from(element: &TransactionChainElement) -> Self {
        Self {
            isSequenced: element.is_sequenced,
            queueIndex: U256::from(element.queue_index),
            timestamp: U256::from(element.timestamp),
            blockNumber: U256::from(element.block_number),
            txData: element.tx_data.clone(),
        }
    }
}

/// Decodes the `Error(string)` reason out of a reverted contract call.
pub(crate) fn revert_reason(err: &alloy_contract::Error) -> Option<String> {
    let data = err.as_revert_data()?;
    Revert::abi_decode(&data).ok().map(|revert| revert.reason)
}

/// The well-known settlement contracts, resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedAddresses {
    /// The state-commitment chain.
    pub state_commitment_chain: Address,
    /// The canonical transaction chain.
    pub canonical_transaction_chain: Address,
    /// The fraud verifier.
    pub fraud_verifier: Address,
}

/// Resolves the settlement contracts through the on-chain address manager.
pub async fn resolve_addresses<P: Provider + Clone>(
    provider: P,
    address_manager: Address,
) -> Result<ResolvedAddresses, ProverError> {
    let manager = AddressManager::new(address_manager, provider);
    let state_commitment_chain = manager
        .getAddress("StateCommitmentChain".to_string())
        .call()
        .await
        .map_err(ProverError::from)?;
    let canonical_transaction_chain = manager
        .getAddress("CanonicalTransactionChain".to_string())
        .call()
        .await
        .map_err(ProverError::from)?;
    let fraud_verifier =
        manager.getAddress("FraudVerifier".to_string()).call().await.map_err(ProverError::from)?;
    Ok(ResolvedAddresses { state_commitment_chain, canonical_transaction_chain, fraud_verifier })
}
