//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each peer owns many tokens on the ring instead of one. This gives:
//!
//! 1. **Better Load Distribution**: more tokens, smoother key spread
//! 2. **Gradual Rebalancing**: when a peer joins or leaves only its share of
//!    keys moves
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(v) per peer where v = vnodes per peer
//! - **Lookup**: O(log n) where n = total vnodes

use std::fmt;
use std::sync::Arc;

use crate::token::Token;

/// A virtual node on the hash ring.
///
/// # Invariants
///
/// - The token of vnode `i` of peer `addr` is `hash("{addr}:{i}")`, so every
///   process places the same peer at the same positions
/// - Every `VirtualNode` belongs to exactly one peer address
///
/// # Example
///
/// ```rust
/// use peer_ring::VirtualNode;
///
/// let vnode = VirtualNode::from_index("10.0.0.1:8080", 0);
/// assert_eq!(vnode.owner(), "10.0.0.1:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    pub token: Token,
    /// Address of the peer that owns this vnode.
    pub owner: Arc<str>,
}

impl VirtualNode {
    #[inline]
    pub fn new(token: Token, owner: impl Into<Arc<str>>) -> Self {
        Self {
            token,
            owner: owner.into(),
        }
    }

    /// Create vnode number `vnode_index` for the peer at `address`.
    ///
    /// # Performance
    /// - **Time**: O(k) where k = length of "address:index"
    pub fn from_index(address: impl Into<Arc<str>>, vnode_index: usize) -> Self {
        let owner = address.into();
        let token = Token::from_key(&format!("{}:{}", owner, vnode_index));
        Self { token, owner }
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Clockwise distance to another virtual node.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> Token {
        self.token.distance_to(&other.token)
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(token={}, owner={})", self.token, self.owner)
    }
}
