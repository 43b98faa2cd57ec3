//! Consistent hash ring.
//!
//! The ring keeps a sorted map from token to owning peer address. A key is
//! owned by the first vnode whose token is at or after the key's token,
//! wrapping around to the smallest token.
//!
//! # Thread Safety
//!
//! All methods take `&self`; state lives behind a `parking_lot::RwLock`, so
//! lookups from many threads only contend with membership changes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::token::Token;
use crate::vnode::VirtualNode;

/// Default number of virtual nodes per peer.
pub const DEFAULT_VNODES: usize = 256;

/// Upper bound on virtual nodes per peer accepted from configuration.
pub const MAX_VNODES: usize = 65_536;

#[derive(Debug, Default)]
struct RingState {
    tokens: BTreeMap<Token, Arc<str>>,
    /// Vnode count per peer address.
    nodes: HashMap<Arc<str>, usize>,
}

impl RingState {
    /// Place every vnode of `address`. On a token collision the smaller
    /// address wins, so placement does not depend on insertion order.
    fn place(&mut self, address: &Arc<str>, vnodes: usize) {
        for index in 0..vnodes {
            let vnode = VirtualNode::from_index(Arc::clone(address), index);
            self.tokens
                .entry(vnode.token)
                .and_modify(|owner| {
                    if vnode.owner < *owner {
                        *owner = Arc::clone(&vnode.owner);
                    }
                })
                .or_insert(vnode.owner);
        }
    }

    fn rebuild(&mut self) {
        self.tokens.clear();
        let nodes: Vec<(Arc<str>, usize)> = self
            .nodes
            .iter()
            .map(|(address, vnodes)| (Arc::clone(address), *vnodes))
            .collect();
        for (address, vnodes) in nodes {
            self.place(&address, vnodes);
        }
    }
}

/// Owner of `key` in a token map: the first token at or after the key's
/// token, wrapping around to the smallest.
pub(crate) fn owner_in(tokens: &BTreeMap<Token, Arc<str>>, key: &[u8]) -> Option<Arc<str>> {
    let token = Token::from_bytes(key);
    tokens
        .range(token..)
        .next()
        .or_else(|| tokens.iter().next())
        .map(|(_, owner)| Arc::clone(owner))
}

/// Consistent hash ring of peer addresses.
#[derive(Debug, Default)]
pub struct HashRing {
    state: RwLock<RingState>,
}

impl HashRing {
    /// Create an empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer with `vnodes` virtual nodes.
    ///
    /// Adding an address that is already present replaces its vnode count.
    pub fn add_node(&self, address: &str, vnodes: usize) {
        let mut state = self.state.write();
        let address: Arc<str> = Arc::from(address);
        let previous = state.nodes.insert(Arc::clone(&address), vnodes);
        match previous {
            // Fewer vnodes than before: stale tokens must go
            Some(previous) if previous > vnodes => state.rebuild(),
            _ => state.place(&address, vnodes),
        }
    }

    /// Remove a peer and all of its vnodes. Returns false if it was absent.
    pub fn remove_node(&self, address: &str) -> bool {
        let mut state = self.state.write();
        if state.nodes.remove(address).is_none() {
            return false;
        }
        // Rebuild so tokens lost to this peer in collisions come back
        state.rebuild();
        true
    }

    /// Owner of `key`, or `None` if the ring is empty.
    ///
    /// # Performance
    /// - **Time**: O(log n) where n = total vnodes
    pub fn lookup(&self, key: &[u8]) -> Option<Arc<str>> {
        owner_in(&self.state.read().tokens, key)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.state.read().nodes.contains_key(address)
    }

    /// Number of peers on the ring.
    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Number of tokens on the ring.
    pub fn token_count(&self) -> usize {
        self.state.read().tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    /// All peer addresses, sorted.
    pub fn nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self
            .state
            .read()
            .nodes
            .keys()
            .map(|address| address.to_string())
            .collect();
        nodes.sort();
        nodes
    }

    /// All vnodes in token order (for debugging and inspection).
    pub fn tokens(&self) -> Vec<VirtualNode> {
        self.state
            .read()
            .tokens
            .iter()
            .map(|(token, owner)| VirtualNode::new(*token, Arc::clone(owner)))
            .collect()
    }

    /// Consume the ring, keeping only its token map for lock-free reads.
    pub(crate) fn into_token_map(self) -> BTreeMap<Token, Arc<str>> {
        self.state.into_inner().tokens
    }
}

/// Builder for a `HashRing` with a default vnode count.
///
/// # Example
///
/// ```rust
/// use peer_ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_vnodes(8)
///     .add_node("10.0.0.1:8080")
///     .add_node_with_vnodes("10.0.0.2:8080", 16)
///     .build();
/// assert_eq!(ring.token_count(), 24);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder {
    vnodes: usize,
    nodes: Vec<(String, Option<usize>)>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            vnodes: DEFAULT_VNODES,
            nodes: Vec::new(),
        }
    }

    /// Vnode count for nodes added without an explicit one.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.vnodes = vnodes;
        self
    }

    pub fn add_node(mut self, address: impl Into<String>) -> Self {
        self.nodes.push((address.into(), None));
        self
    }

    pub fn add_node_with_vnodes(mut self, address: impl Into<String>, vnodes: usize) -> Self {
        self.nodes.push((address.into(), Some(vnodes)));
        self
    }

    pub fn build(self) -> HashRing {
        let ring = HashRing::new();
        for (address, vnodes) in self.nodes {
            ring.add_node(&address, vnodes.unwrap_or(self.vnodes));
        }
        ring
    }
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}
