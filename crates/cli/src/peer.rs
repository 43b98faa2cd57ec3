//! Address-only peers for routing inspection.

use std::sync::Arc;

use async_trait::async_trait;
use peers::{CallContext, GetRequest, GetResponse, PeerError, RemotePeer, SetRequest};

/// A peer known only by address. `peerctl` has no transport, so every call
/// fails with a transport error.
#[derive(Debug, Clone)]
pub struct AddressPeer {
    address: String,
}

impl AddressPeer {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Constructor shaped for `RingRouter::from_config`.
    pub fn connect(address: &str) -> Arc<dyn RemotePeer> {
        Arc::new(Self::new(address))
    }

    fn no_transport(&self) -> PeerError {
        PeerError::Transport(format!("no transport configured for {}", self.address))
    }
}

#[async_trait]
impl RemotePeer for AddressPeer {
    async fn get(&self, ctx: &CallContext, _req: &GetRequest) -> Result<GetResponse, PeerError> {
        ctx.run(async { Err(self.no_transport()) }).await
    }

    async fn remove(&self, ctx: &CallContext, _req: &GetRequest) -> Result<(), PeerError> {
        ctx.run(async { Err(self.no_transport()) }).await
    }

    async fn set(&self, ctx: &CallContext, _req: &SetRequest) -> Result<(), PeerError> {
        ctx.run(async { Err(self.no_transport()) }).await
    }

    fn address(&self) -> &str {
        &self.address
    }
}
