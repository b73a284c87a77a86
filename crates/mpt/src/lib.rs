#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::TrieError;

mod trie;
pub use trie::ProofTrie;
