//! State-diff witnesses returned by the rollup node.
//!
//! A state-diff proof is the minimal bundle of trie witnesses covering every
//! account and storage slot read or written while executing one rollup
//! block's single transaction against the preceding state root. The wire
//! format is the rollup node's JSON extension, hence the serde derives.

use alloy_primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Header of the rollup block the diff proof witnesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDiffHeader {
    /// Rollup block number.
    #[serde(with = "alloy_serde::quantity")]
    pub number: u64,
    /// Rollup block hash.
    pub hash: B256,
    /// State root after executing the block.
    pub state_root: B256,
    /// Block timestamp.
    #[serde(with = "alloy_serde::quantity")]
    pub timestamp: u64,
}

/// Witness for one storage slot touched by the disputed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStateProof {
    /// Storage slot key.
    pub key: B256,
    /// Pre-state value of the slot.
    pub value: B256,
    /// RLP-encoded trie nodes opening the slot under the account's
    /// storage root.
    pub proof: Vec<Bytes>,
}

/// Witness for one account touched by the disputed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStateProof {
    /// Account address.
    pub address: Address,
    /// Pre-state nonce.
    #[serde(with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// Pre-state balance.
    pub balance: U256,
    /// Hash of the account's code.
    pub code_hash: B256,
    /// Root of the account's storage trie.
    pub storage_root: B256,
    /// RLP-encoded trie nodes opening the account under the state root.
    pub account_proof: Vec<Bytes>,
    /// Witnesses for the touched slots of this account.
    pub storage_proof: Vec<StorageStateProof>,
}

/// The full pre-execution witness for one rollup block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDiffProof {
    /// Header of the witnessed block.
    pub header: StateDiffHeader,
    /// One witness per touched account.
    pub account_state_proofs: Vec<AccountStateProof>,
}
