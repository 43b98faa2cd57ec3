//! `PeerRouter` backed by a consistent hash ring.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use peers::{PeerRouter, RemotePeer, Route};
use tracing::{error, info, warn};

use crate::config::RingConfig;
use crate::error::Result;
use crate::ring::{owner_in, HashRing, MAX_VNODES};
use crate::token::Token;

/// Ring plus the peers its owners map to. Replaced as a whole on
/// membership changes so readers never see a half-updated view.
///
/// The token map is built from `peers` plus this process's address, so
/// every owner other than self has a peer.
struct Membership {
    tokens: BTreeMap<Token, Arc<str>>,
    peers: HashMap<String, Arc<dyn RemotePeer>>,
}

impl Membership {
    fn new(
        self_address: &str,
        vnodes: usize,
        peers: HashMap<String, Arc<dyn RemotePeer>>,
    ) -> Self {
        let ring = HashRing::new();
        ring.add_node(self_address, vnodes);
        for address in peers.keys() {
            ring.add_node(address, vnodes);
        }
        Self {
            tokens: ring.into_token_map(),
            peers,
        }
    }

    fn owner(&self, key: &str) -> Option<Arc<str>> {
        owner_in(&self.tokens, key.as_bytes())
    }
}

/// Routes keys over a consistent hash ring of peer addresses.
///
/// This process is always on the ring under its own address; keys that
/// land on it are `Local`. Every other owner maps to the `RemotePeer`
/// registered for that address.
///
/// # Example
///
/// ```rust,ignore
/// let router = Arc::new(RingRouter::new("10.0.0.1:8080", 64));
/// router.set_peers(vec![grpc_peer("10.0.0.2:8080"), grpc_peer("10.0.0.3:8080")]);
/// workspace.register_router(move || Some(router.clone() as Arc<dyn PeerRouter>))?;
/// ```
pub struct RingRouter {
    self_address: String,
    vnodes: usize,
    membership: RwLock<Arc<Membership>>,
}

impl RingRouter {
    /// A router that owns every key until peers are set. `vnodes` is
    /// clamped to `1..=MAX_VNODES`.
    pub fn new(self_address: impl Into<String>, vnodes: usize) -> Self {
        let self_address = self_address.into();
        let vnodes = vnodes.clamp(1, MAX_VNODES);
        let membership = Membership::new(&self_address, vnodes, HashMap::new());

        Self {
            self_address,
            vnodes,
            membership: RwLock::new(Arc::new(membership)),
        }
    }

    /// Build a router from a validated config, creating each remote peer
    /// with `connect`.
    pub fn from_config<F>(config: &RingConfig, connect: F) -> Result<Self>
    where
        F: Fn(&str) -> Arc<dyn RemotePeer>,
    {
        config.validate()?;
        let router = Self::new(config.self_address.clone(), config.vnodes);
        router.set_peers(
            config
                .peers
                .iter()
                .filter(|address| **address != config.self_address)
                .map(|address| connect(address.as_str())),
        );
        Ok(router)
    }

    pub fn self_address(&self) -> &str {
        &self.self_address
    }

    pub fn vnodes(&self) -> usize {
        self.vnodes
    }

    /// Replace the remote peer set.
    ///
    /// A peer whose address equals this process's address is ignored; for
    /// duplicate addresses the last peer wins.
    pub fn set_peers<I>(&self, peers: I)
    where
        I: IntoIterator<Item = Arc<dyn RemotePeer>>,
    {
        let mut by_address = HashMap::new();
        for peer in peers {
            let address = peer.address().to_string();
            if address == self.self_address {
                warn!(peer = %address, "ignoring peer with this process's own address");
                continue;
            }
            by_address.insert(address, peer);
        }

        info!(
            self_address = %self.self_address,
            peers = by_address.len(),
            vnodes = self.vnodes,
            "ring membership updated"
        );

        let membership = Membership::new(&self.self_address, self.vnodes, by_address);
        *self.membership.write() = Arc::new(membership);
    }

    /// Address of the owner of `key`; this process's own address for
    /// locally owned keys.
    pub fn owner(&self, key: &str) -> String {
        self.snapshot()
            .owner(key)
            .map(|owner| owner.to_string())
            .unwrap_or_else(|| self.self_address.clone())
    }

    /// Number of remote peers.
    pub fn peer_count(&self) -> usize {
        self.snapshot().peers.len()
    }

    fn snapshot(&self) -> Arc<Membership> {
        self.membership.read().clone()
    }
}

impl PeerRouter for RingRouter {
    fn route_for(&self, key: &str) -> Route {
        let membership = self.snapshot();
        let Some(owner) = membership.owner(key) else {
            return Route::Local;
        };
        if *owner == *self.self_address {
            return Route::Local;
        }

        debug_assert!(
            membership.peers.contains_key(&*owner),
            "ring owner {owner} has no peer"
        );
        match membership.peers.get(&*owner) {
            Some(peer) => Route::Remote(Arc::clone(peer)),
            None => {
                error!(key, owner = %owner, "ring owner has no peer, serving locally");
                Route::Local
            }
        }
    }

    fn all_peers(&self) -> Vec<Arc<dyn RemotePeer>> {
        self.snapshot().peers.values().cloned().collect()
    }
}

impl fmt::Debug for RingRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingRouter")
            .field("self_address", &self.self_address)
            .field("vnodes", &self.vnodes)
            .field("peers", &self.peer_count())
            .finish()
    }
}
