//! Key ownership routing.
//!
//! A `PeerRouter` decides, for every key, whether this process owns it or
//! which remote peer does. The routing algorithm itself (consistent hashing,
//! static tables, service discovery) lives in the implementation.

use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::peer::RemotePeer;

/// Ownership decision for one key.
///
/// A remote route always carries its peer and a local route never does, so
/// an inconsistent "remote without peer" answer cannot be expressed.
#[derive(Clone)]
pub enum Route {
    /// This process owns the key; handle it locally.
    Local,
    /// Forward the call to this peer.
    Remote(Arc<dyn RemotePeer>),
}

impl Route {
    pub fn is_remote(&self) -> bool {
        matches!(self, Route::Remote(_))
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Route::Local)
    }

    /// The owning peer, if the key is remote.
    pub fn peer(&self) -> Option<&Arc<dyn RemotePeer>> {
        match self {
            Route::Local => None,
            Route::Remote(peer) => Some(peer),
        }
    }

    /// Pair form: `(None, false)` for local, `(Some(peer), true)` for remote.
    pub fn into_parts(self) -> (Option<Arc<dyn RemotePeer>>, bool) {
        match self {
            Route::Local => (None, false),
            Route::Remote(peer) => (Some(peer), true),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Local => f.write_str("Local"),
            Route::Remote(peer) => f.debug_tuple("Remote").field(&peer.address()).finish(),
        }
    }
}

/// Locates the peer that owns a key.
///
/// # Thread Safety
///
/// Both operations are called concurrently from many lookups. They are
/// reads from the caller's point of view; implementations that change
/// membership over time must synchronize internally.
pub trait PeerRouter: Send + Sync + 'static {
    /// Decide who owns `key`. Deterministic for a given router instance and
    /// membership.
    fn route_for(&self, key: &str) -> Route;

    /// Every peer currently known, in no particular order.
    fn all_peers(&self) -> Vec<Arc<dyn RemotePeer>>;
}

/// A router with no peers: every key is owned locally.
///
/// This is the default when no strategy is registered, so a cache runs as a
/// self-contained single node without configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoPeers;

impl PeerRouter for NoPeers {
    fn route_for(&self, _key: &str) -> Route {
        Route::Local
    }

    fn all_peers(&self) -> Vec<Arc<dyn RemotePeer>> {
        Vec::new()
    }
}

static NO_PEERS: LazyLock<Arc<dyn PeerRouter>> = LazyLock::new(|| Arc::new(NoPeers));

/// Shared `NoPeers` instance.
pub fn no_peers() -> Arc<dyn PeerRouter> {
    Arc::clone(&NO_PEERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;
    use crate::error::PeerError;
    use crate::message::{GetRequest, GetResponse, SetRequest};
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl RemotePeer for Named {
        async fn get(&self, _: &CallContext, _: &GetRequest) -> Result<GetResponse, PeerError> {
            Err(PeerError::Transport("unused".into()))
        }

        async fn remove(&self, _: &CallContext, _: &GetRequest) -> Result<(), PeerError> {
            Ok(())
        }

        async fn set(&self, _: &CallContext, _: &SetRequest) -> Result<(), PeerError> {
            Ok(())
        }

        fn address(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_no_peers_is_always_local() {
        for key in ["", "k", "some/long/key", "ключ"] {
            let route = NoPeers.route_for(key);
            assert!(route.is_local());
            let (peer, remote) = route.into_parts();
            assert!(peer.is_none());
            assert!(!remote);
        }
        assert!(NoPeers.all_peers().is_empty());
    }

    #[test]
    fn test_no_peers_singleton_is_shared() {
        assert!(Arc::ptr_eq(&no_peers(), &no_peers()));
    }

    #[test]
    fn test_remote_route_parts() {
        let route = Route::Remote(Arc::new(Named("10.0.0.2:8080")));
        assert!(route.is_remote());
        assert_eq!(route.peer().map(|p| p.address()), Some("10.0.0.2:8080"));
        assert_eq!(format!("{:?}", route), "Remote(\"10.0.0.2:8080\")");

        let (peer, remote) = route.into_parts();
        assert!(remote);
        assert_eq!(peer.unwrap().address(), "10.0.0.2:8080");
    }
}
