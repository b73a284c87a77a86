//! [`ProofTrie`](crate::ProofTrie) errors.

use alloy_primitives::B256;
use thiserror::Error;

/// An error produced while building or operating on a [`ProofTrie`](crate::ProofTrie).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// A witness node failed to decode as a merkle patricia trie node.
    #[error("witness contains an undecodable trie node: {0}")]
    CorruptWitness(alloy_rlp::Error),

    /// A referenced node is absent from the content-addressed store.
    ///
    /// Surfaces when an operation walks into a subtree the witness does not
    /// cover.
    #[error("missing trie node {0}")]
    MissingNode(B256),

    /// A lookup path ended inside a branch node.
    ///
    /// Keys of one trie share a fixed width, so a path can only be exhausted
    /// by a key of the wrong length.
    #[error("key exhausted at a branch node")]
    PathExhausted,
}
