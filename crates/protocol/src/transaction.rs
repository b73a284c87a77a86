//! Rollup transactions and the chain elements that commit them.

use alloy_primitives::{Address, B256, Bytes, keccak256};
use alloy_rlp::{BufMut, Decodable, Encodable, RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};

/// Queue a rollup transaction entered the chain through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum QueueOrigin {
    /// Submitted directly to the sequencer.
    #[default]
    Sequencer = 0,
    /// Enqueued on the settlement chain.
    L1 = 1,
}

impl Encodable for QueueOrigin {
    fn encode(&self, out: &mut dyn BufMut) {
        (*self as u8).encode(out);
    }

    fn length(&self) -> usize {
        (*self as u8).length()
    }
}

impl Decodable for QueueOrigin {
    fn decode(buf: &mut &[u8]) -> Result<Self, alloy_rlp::Error> {
        match u8::decode(buf)? {
            0 => Ok(Self::Sequencer),
            1 => Ok(Self::L1),
            _ => Err(alloy_rlp::Error::Custom("invalid queue origin")),
        }
    }
}

/// A rollup transaction as committed on the canonical transaction chain.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct RollupTransaction {
    /// Timestamp the sequencer assigned to the transaction.
    pub timestamp: u64,
    /// Settlement-chain block the transaction was contextualized with.
    pub block_number: u64,
    /// Queue the transaction entered through.
    pub l1_queue_origin: QueueOrigin,
    /// Settlement-chain sender for queue transactions.
    pub l1_tx_origin: Address,
    /// Target the rollup executes the call against.
    pub entrypoint: Address,
    /// Gas limit of the rollup execution.
    pub gas_limit: u64,
    /// Calldata of the rollup execution.
    pub data: Bytes,
}

impl RollupTransaction {
    /// Hash keying the dispute on the fraud verifier.
    pub fn tx_hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// The element actually hashed into the transaction-batch tree.
///
/// `tx_data` carries the RLP encoding of the embedded [`RollupTransaction`];
/// the element's own RLP encoding is what the batch tree commits.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, RlpEncodable, RlpDecodable, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct TransactionChainElement {
    /// Whether the element came in through the sequencer.
    pub is_sequenced: bool,
    /// Index in the settlement-chain queue, zero for sequenced elements.
    pub queue_index: u64,
    /// Timestamp assigned at sequencing.
    pub timestamp: u64,
    /// Settlement-chain block assigned at sequencing.
    pub block_number: u64,
    /// RLP encoding of the embedded transaction.
    pub tx_data: Bytes,
}

impl TransactionChainElement {
    /// Leaf hash of this element in the batch tree.
    pub fn leaf_hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }

    /// Decodes the embedded [`RollupTransaction`].
    pub fn transaction(&self) -> Result<RollupTransaction, alloy_rlp::Error> {
        RollupTransaction::decode(&mut self.tx_data.as_ref())
    }
}

impl From<&RollupTransaction> for TransactionChainElement {
    fn from(tx: &RollupTransaction) -> Self {
        Self {
            is_sequenced: tx.l1_queue_origin == QueueOrigin::Sequencer,
            queue_index: 0,
            timestamp: tx.timestamp,
            block_number: tx.block_number,
            tx_data: alloy_rlp::encode(tx).into(),
        }
    }
}
