//! The contract a remote cache node must satisfy.

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::PeerError;
use crate::message::{GetRequest, GetResponse, SetRequest};

/// One addressable remote cache node.
///
/// Implemented by the transport layer. Routers hand out `Arc<dyn RemotePeer>`
/// and lookup code holds the reference for the duration of one call.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the same peer is called from many
/// concurrent lookups.
///
/// # Cancellation
///
/// Every call takes a [`CallContext`]. Implementations should wrap their I/O
/// in [`CallContext::run`] so cancellation fails the call promptly.
#[async_trait]
pub trait RemotePeer: Send + Sync + 'static {
    /// Fetch the value for a key from this peer.
    async fn get(&self, ctx: &CallContext, req: &GetRequest) -> Result<GetResponse, PeerError>;

    /// Invalidate a key in this peer's cache.
    async fn remove(&self, ctx: &CallContext, req: &GetRequest) -> Result<(), PeerError>;

    /// Push a value into this peer's cache.
    async fn set(&self, ctx: &CallContext, req: &SetRequest) -> Result<(), PeerError>;

    /// Stable address identifying this peer.
    fn address(&self) -> &str;
}
