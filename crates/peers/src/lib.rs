//! Peer coordination layer for a distributed cache.
//!
//! This crate provides the seam between a cache's local lookup path and the
//! routing strategy an operator plugs in:
//! - The `RemotePeer` contract a remote cache node must satisfy
//! - The `PeerRouter` contract deciding key ownership
//! - `NoPeers`, the always-local default router
//! - `Workspace`, the one-time registry for router factories
//! - Call contexts, peer messages and broadcast helpers

pub mod broadcast;
pub mod context;
pub mod error;
pub mod message;
pub mod peer;
pub mod router;
pub mod workspace;

pub use broadcast::{broadcast_remove, RemoveOutcome};
pub use context::CallContext;
pub use error::{Error, ErrorKind, PeerError, Result};
pub use message::{GetRequest, GetResponse, SetRequest};
pub use peer::RemotePeer;
pub use router::{no_peers, NoPeers, PeerRouter, Route};
pub use workspace::{
    register_per_group_router, register_router, resolve_router, GroupRouters, RouterFactory,
    Workspace,
};
