#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod batch;
pub use batch::{BatchHeader, BatchInclusionProof, StateRootBatchProof, TransactionBatchProof};

mod transaction;
pub use transaction::{QueueOrigin, RollupTransaction, TransactionChainElement};

mod witness;
pub use witness::{AccountStateProof, StateDiffHeader, StateDiffProof, StorageStateProof};

mod encoding;
pub use encoding::{encode_account, encode_storage_value, encode_trie_witness};

pub mod merkle;

/// Ordinal numbering rollup transactions and the state roots they produce.
///
/// Root `i` is the result of executing transaction `i`; a per-deployment
/// block offset shifts between this index space and rollup block numbers.
pub type GlobalIndex = u64;
