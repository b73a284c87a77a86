//! Canonical wire-level encodings.
//!
//! Everything that crosses a trie or an ABI boundary is encoded here so that
//! every component commits to byte-identical representations.

use alloy_primitives::{B256, Bytes, U256};
use alloy_trie::TrieAccount;

/// RLP account encoding stored under `keccak256(address)` in the state trie.
pub fn encode_account(nonce: u64, balance: U256, storage_root: B256, code_hash: B256) -> Bytes {
    let account = TrieAccount { nonce, balance, storage_root, code_hash };
    alloy_rlp::encode(&account).into()
}

/// RLP encoding of a storage value with leading zeros stripped.
pub fn encode_storage_value(value: B256) -> Bytes {
    alloy_rlp::encode(U256::from_be_bytes(value.0)).into()
}

/// Trie witnesses cross the ABI boundary as an RLP list of node encodings.
pub fn encode_trie_witness(nodes: &[Bytes]) -> Bytes {
    let mut out = Vec::new();
    alloy_rlp::encode_list::<_, Bytes>(nodes, &mut out);
    out.into()
}
