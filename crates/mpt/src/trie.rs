//! A merkle patricia trie view assembled from proof nodes.

use crate::TrieError;
use alloy_primitives::{B256, Bytes, keccak256, map::HashMap};
use alloy_rlp::{Decodable, Encodable};
use alloy_trie::{
    EMPTY_ROOT_HASH, Nibbles, TrieMask,
    nodes::{BranchNode, ExtensionNode, LeafNode, RlpNode, TrieNode},
};

/// A mutable merkle patricia trie view backed by a content-addressed store.
///
/// The store maps `keccak256(rlp(node))` to the node's RLP encoding and is
/// populated from the node lists of membership proofs. The union is
/// order-independent, so proofs for any number of keys may be layered into
/// one view. Reads, writes, and proof generation all walk the store from the
/// current root; touching a subtree the witness does not cover fails with
/// [`TrieError::MissingNode`] rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofTrie {
    /// Root the next walk starts from.
    root: B256,
    /// Content-addressed node store.
    nodes: HashMap<B256, Bytes>,
}

impl Default for ProofTrie {
    fn default() -> Self {
        Self::new(EMPTY_ROOT_HASH)
    }
}

impl ProofTrie {
    /// Creates an empty view rooted at `root`.
    pub fn new(root: B256) -> Self {
        Self { root, nodes: HashMap::default() }
    }

    /// Builds a view rooted at `root` from an iterator of proof node lists.
    ///
    /// Every node is keyed by its keccak-256 hash, so overlapping proofs
    /// collapse to the union of their node sets regardless of order.
    pub fn from_proofs<'a, I>(root: B256, proofs: I) -> Result<Self, TrieError>
    where
        I: IntoIterator<Item = &'a [Bytes]>,
    {
        let mut trie = Self::new(root);
        for list in proofs {
            for node in list {
                trie.add_node(node.clone())?;
            }
        }
        Ok(trie)
    }

    /// Adds a single proof node to the store.
    pub fn add_node(&mut self, bytes: Bytes) -> Result<(), TrieError> {
        TrieNode::decode(&mut bytes.as_ref()).map_err(TrieError::CorruptWitness)?;
        self.nodes.insert(keccak256(&bytes), bytes);
        Ok(())
    }

    /// Returns the current root.
    pub const fn root(&self) -> B256 {
        self.root
    }

    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the view proves the key absent, and
    /// [`TrieError::MissingNode`] when the path leaves the witnessed
    /// portion of the trie.
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>, TrieError> {
        let path = Nibbles::unpack(key);
        let mut node = self.load(self.root)?;
        let mut offset = 0;
        loop {
            match node {
                TrieNode::EmptyRoot => return Ok(None),
                TrieNode::Leaf(leaf) => {
                    return Ok((path.slice(offset..) == leaf.key).then(|| Bytes::from(leaf.value)));
                }
                TrieNode::Extension(ext) => {
                    if !path.slice(offset..).starts_with(&ext.key) {
                        return Ok(None);
                    }
                    offset += ext.key.len();
                    node = self.load_ref(&ext.child)?;
                }
                TrieNode::Branch(branch) => {
                    if offset == path.len() {
                        return Err(TrieError::PathExhausted);
                    }
                    let nibble = path.get_unchecked(offset) as u8;
                    match branch_child(&branch, nibble) {
                        Some(child) => {
                            let child = child.clone();
                            offset += 1;
                            node = self.load_ref(&child)?;
                        }
                        None => return Ok(None),
                    }
                }
            }
        }
    }

    /// Writes `value` under `key`, re-rooting the view.
    ///
    /// The mutated path is re-encoded bottom-up; every node on it must be
    /// resolvable from the store.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        let path = Nibbles::unpack(key);
        let root_node = self.load(self.root)?;
        let new_root = self.insert_at(root_node, path, value.to_vec())?;

        // the root reference is a hash regardless of encoded size
        let mut buf = Vec::new();
        new_root.encode(&mut buf);
        let hash = keccak256(&buf);
        self.nodes.insert(hash, buf.into());
        self.root = hash;
        Ok(())
    }

    /// Produces an inclusion proof for `key` against the current root.
    ///
    /// The proof is the ordered list of hash-referenced node encodings on the
    /// path from the root towards the key; nodes embedded inline travel
    /// inside their parent's encoding.
    pub fn create_proof(&self, key: &[u8]) -> Result<Vec<Bytes>, TrieError> {
        let path = Nibbles::unpack(key);
        let mut proof = Vec::new();
        if self.root == EMPTY_ROOT_HASH {
            return Ok(proof);
        }

        let root_bytes =
            self.nodes.get(&self.root).ok_or(TrieError::MissingNode(self.root))?;
        proof.push(root_bytes.clone());
        let mut node =
            TrieNode::decode(&mut root_bytes.as_ref()).map_err(TrieError::CorruptWitness)?;

        let mut offset = 0;
        loop {
            match node {
                TrieNode::EmptyRoot => return Ok(proof),
                TrieNode::Leaf(_) => return Ok(proof),
                TrieNode::Extension(ext) => {
                    if !path.slice(offset..).starts_with(&ext.key) {
                        return Ok(proof);
                    }
                    offset += ext.key.len();
                    node = self.descend(&ext.child, &mut proof)?;
                }
                TrieNode::Branch(branch) => {
                    if offset == path.len() {
                        return Err(TrieError::PathExhausted);
                    }
                    let nibble = path.get_unchecked(offset) as u8;
                    match branch_child(&branch, nibble) {
                        Some(child) => {
                            let child = child.clone();
                            offset += 1;
                            node = self.descend(&child, &mut proof)?;
                        }
                        None => return Ok(proof),
                    }
                }
            }
        }
    }

    fn insert_at(
        &mut self,
        node: TrieNode,
        path: Nibbles,
        value: Vec<u8>,
    ) -> Result<TrieNode, TrieError> {
        match node {
            TrieNode::EmptyRoot => Ok(TrieNode::Leaf(LeafNode::new(path, value))),
            TrieNode::Leaf(leaf) => {
                if leaf.key == path {
                    return Ok(TrieNode::Leaf(LeafNode::new(path, value)));
                }

                // keys of one trie share a fixed width, so both suffixes
                // carry a nibble at the divergence point
                let common = path.common_prefix_length(&leaf.key);
                if common == path.len() || common == leaf.key.len() {
                    return Err(TrieError::PathExhausted);
                }
                let new_ref =
                    self.encode_ref(&TrieNode::Leaf(LeafNode::new(path.slice(common + 1..), value)));
                let old_ref = self.encode_ref(&TrieNode::Leaf(LeafNode::new(
                    leaf.key.slice(common + 1..),
                    leaf.value,
                )));
                let branch = branch_of_two(
                    (path.get_unchecked(common) as u8, new_ref),
                    (leaf.key.get_unchecked(common) as u8, old_ref),
                );
                self.wrap_extension(path.slice(..common), branch)
            }
            TrieNode::Extension(ext) => {
                if path.starts_with(&ext.key) {
                    let child = self.load_ref(&ext.child)?;
                    let new_child = self.insert_at(child, path.slice(ext.key.len()..), value)?;
                    let child_ref = self.encode_ref(&new_child);
                    return Ok(TrieNode::Extension(ExtensionNode::new(ext.key, child_ref)));
                }

                // the path forks inside the extension; split it at the fork
                let common = path.common_prefix_length(&ext.key);
                if common == path.len() {
                    return Err(TrieError::PathExhausted);
                }
                let new_ref =
                    self.encode_ref(&TrieNode::Leaf(LeafNode::new(path.slice(common + 1..), value)));
                let rest = ext.key.slice(common + 1..);
                let old_ref = if rest.is_empty() {
                    ext.child
                } else {
                    self.encode_ref(&TrieNode::Extension(ExtensionNode::new(rest, ext.child)))
                };
                let branch = branch_of_two(
                    (path.get_unchecked(common) as u8, new_ref),
                    (ext.key.get_unchecked(common) as u8, old_ref),
                );
                self.wrap_extension(path.slice(..common), branch)
            }
            TrieNode::Branch(branch) => {
                if path.is_empty() {
                    return Err(TrieError::PathExhausted);
                }
                let nibble = path.get_unchecked(0) as u8;
                let rest = path.slice(1..);
                let new_child = match branch_child(&branch, nibble) {
                    Some(child_ref) => {
                        let child = self.load_ref(child_ref)?;
                        self.insert_at(child, rest, value)?
                    }
                    None => TrieNode::Leaf(LeafNode::new(rest, value)),
                };
                let child_ref = self.encode_ref(&new_child);

                let mut children = expand_children(&branch);
                children[nibble as usize] = Some(child_ref);
                Ok(collapse_children(children))
            }
        }
    }

    /// Encodes a node, stores it when hash-referenced, and returns the
    /// reference its parent embeds.
    fn encode_ref(&mut self, node: &TrieNode) -> RlpNode {
        let mut buf = Vec::new();
        node.encode(&mut buf);
        let reference = RlpNode::from_rlp(&buf);
        if let Some(hash) = reference.as_hash() {
            self.nodes.insert(hash, buf.into());
        }
        reference
    }

    fn wrap_extension(&mut self, prefix: Nibbles, node: TrieNode) -> Result<TrieNode, TrieError> {
        if prefix.is_empty() {
            return Ok(node);
        }
        let child = self.encode_ref(&node);
        Ok(TrieNode::Extension(ExtensionNode::new(prefix, child)))
    }

    fn load(&self, hash: B256) -> Result<TrieNode, TrieError> {
        if hash == EMPTY_ROOT_HASH {
            return Ok(TrieNode::EmptyRoot);
        }
        let bytes = self.nodes.get(&hash).ok_or(TrieError::MissingNode(hash))?;
        TrieNode::decode(&mut bytes.as_ref()).map_err(TrieError::CorruptWitness)
    }

    fn load_ref(&self, node: &RlpNode) -> Result<TrieNode, TrieError> {
        match node.as_hash() {
            Some(hash) => self.load(hash),
            None => TrieNode::decode(&mut &node[..]).map_err(TrieError::CorruptWitness),
        }
    }

    fn descend(&self, child: &RlpNode, proof: &mut Vec<Bytes>) -> Result<TrieNode, TrieError> {
        match child.as_hash() {
            Some(hash) => {
                let bytes = self.nodes.get(&hash).ok_or(TrieError::MissingNode(hash))?;
                proof.push(bytes.clone());
                TrieNode::decode(&mut bytes.as_ref()).map_err(TrieError::CorruptWitness)
            }
            None => TrieNode::decode(&mut &child[..]).map_err(TrieError::CorruptWitness),
        }
    }
}

/// Selects a branch child by nibble out of the mask-compressed stack.
fn branch_child(branch: &BranchNode, nibble: u8) -> Option<&RlpNode> {
    if !branch.state_mask.is_bit_set(nibble) {
        return None;
    }
    let index = (0..nibble).filter(|i| branch.state_mask.is_bit_set(*i)).count();
    branch.stack.get(index)
}

fn expand_children(branch: &BranchNode) -> [Option<RlpNode>; 16] {
    let mut children: [Option<RlpNode>; 16] = std::array::from_fn(|_| None);
    let mut stack = branch.stack.iter();
    for (i, slot) in children.iter_mut().enumerate() {
        if branch.state_mask.is_bit_set(i as u8) {
            *slot = stack.next().cloned();
        }
    }
    children
}

fn collapse_children(children: [Option<RlpNode>; 16]) -> TrieNode {
    let mut mask = 0u16;
    let mut stack = Vec::new();
    for (i, child) in children.into_iter().enumerate() {
        if let Some(child) = child {
            mask |= 1 << i;
            stack.push(child);
        }
    }
    TrieNode::Branch(BranchNode::new(stack, TrieMask::new(mask)))
}

fn branch_of_two(a: (u8, RlpNode), b: (u8, RlpNode)) -> TrieNode {
    let mut children: [Option<RlpNode>; 16] = std::array::from_fn(|_| None);
    children[a.0 as usize] = Some(a.1);
    children[b.0 as usize] = Some(b.1);
    collapse_children(children)
}
