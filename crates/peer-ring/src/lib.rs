//! Consistent-hash routing strategy for cache peers.
//!
//! This crate provides a `PeerRouter` backed by a consistent hash ring:
//! - Token hashing for keys and virtual nodes
//! - Virtual node placement
//! - The hash ring and its builder
//! - `RingRouter`, which maps ring owners to remote peers
//! - `RingConfig`, a JSON description of a static peer set

pub mod config;
pub mod error;
pub mod ring;
pub mod router;
pub mod token;
pub mod vnode;

pub use config::RingConfig;
pub use error::{Result, RingError};
pub use ring::{HashRing, RingBuilder, DEFAULT_VNODES, MAX_VNODES};
pub use router::RingRouter;
pub use token::Token;
pub use vnode::VirtualNode;
