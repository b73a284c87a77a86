//! Canonical batch Merkle tree.
//!
//! Batches posted to the settlement chain commit their elements in a binary
//! Merkle tree: leaves are keccak-256 hashes of the batch elements, the leaf
//! level is padded to the next power of two with `keccak256([])` filler
//! leaves, and every parent is `keccak256(left ++ right)`.

use alloy_primitives::{B256, keccak256};

/// Filler leaf padding the leaf level to a power of two.
pub fn filler_leaf() -> B256 {
    keccak256([])
}

/// Computes the batch root over the given leaves.
///
/// A batch always carries at least one element; an empty slice yields the
/// root of a single filler leaf.
pub fn merkle_root(leaves: &[B256]) -> B256 {
    let mut level = padded(leaves);
    while level.len() > 1 {
        level = level.chunks(2).map(|pair| hash_pair(pair[0], pair[1])).collect();
    }
    level[0]
}

/// Computes the sibling path for the leaf at `index`.
///
/// Returns `None` when `index` does not select a real (non-filler) leaf.
pub fn merkle_proof(leaves: &[B256], index: usize) -> Option<Vec<B256>> {
    if index >= leaves.len() {
        return None;
    }

    let mut level = padded(leaves);
    let mut idx = index;
    let mut siblings = Vec::new();
    while level.len() > 1 {
        siblings.push(level[idx ^ 1]);
        level = level.chunks(2).map(|pair| hash_pair(pair[0], pair[1])).collect();
        idx /= 2;
    }
    Some(siblings)
}

/// Verifies that `leaf` sits at `index` under `root` given its sibling path.
pub fn verify_inclusion(root: B256, leaf: B256, index: u64, siblings: &[B256]) -> bool {
    if siblings.len() >= 64 || index >> siblings.len() != 0 {
        return false;
    }

    let mut acc = leaf;
    let mut idx = index;
    for sibling in siblings {
        acc = if idx & 1 == 0 { hash_pair(acc, *sibling) } else { hash_pair(*sibling, acc) };
        idx >>= 1;
    }
    acc == root
}

fn padded(leaves: &[B256]) -> Vec<B256> {
    let width = leaves.len().max(1).next_power_of_two();
    let mut level = leaves.to_vec();
    level.resize(width, filler_leaf());
    level
}

fn hash_pair(left: B256, right: B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    keccak256(buf)
}
