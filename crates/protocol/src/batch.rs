//! Batch commitments posted to the settlement chain.

use crate::{RollupTransaction, TransactionChainElement, merkle};
use alloy_primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};

/// Header of a batch appended to a settlement-chain commitment chain.
///
/// Both the state-commitment chain and the canonical transaction chain post
/// batches with this shape; a header is immutable once appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchHeader {
    /// Position of the batch in its chain.
    pub batch_index: u64,
    /// Root of the batch Merkle tree.
    pub batch_root: B256,
    /// Number of elements committed by this batch.
    pub batch_size: u64,
    /// Total number of elements committed by all prior batches.
    pub prev_total_elements: u64,
    /// Opaque data the appender attached to the batch.
    pub extra_data: Bytes,
}

impl BatchHeader {
    /// Returns `true` when the global `index` falls inside this batch.
    pub const fn contains(&self, index: u64) -> bool {
        self.prev_total_elements <= index && index < self.prev_total_elements + self.batch_size
    }

    /// Within-batch offset of the global `index`.
    pub const fn offset_of(&self, index: u64) -> u64 {
        index - self.prev_total_elements
    }
}

/// Sibling path binding one element to a batch root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInclusionProof {
    /// Within-batch offset of the proven element.
    pub index: u64,
    /// Sibling hashes from the leaf up to the root.
    pub siblings: Vec<B256>,
}

impl BatchInclusionProof {
    /// Verifies this path against `root` for the given `leaf` hash.
    pub fn verify(&self, root: B256, leaf: B256) -> bool {
        merkle::verify_inclusion(root, leaf, self.index, &self.siblings)
    }
}

/// Proof that a state root is an element of a committed state batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRootBatchProof {
    /// The committed state root.
    pub state_root: B256,
    /// Header of the enclosing batch.
    pub header: BatchHeader,
    /// Sibling path of the root inside the batch tree.
    pub proof: BatchInclusionProof,
}

/// Proof that a transaction is an element of a committed transaction batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBatchProof {
    /// The transaction recovered from the committed chain element.
    pub transaction: RollupTransaction,
    /// The element that was actually hashed into the batch tree.
    pub element: TransactionChainElement,
    /// Header of the enclosing batch.
    pub header: BatchHeader,
    /// Sibling path of the element inside the batch tree.
    pub proof: BatchInclusionProof,
}
