//! Tests for the hash ring and the ring-backed peer router.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: empty ring, add/lookup, remove
//! 2. **Multiple nodes**: distribution, consistency
//! 3. **Edge cases**: wraparound, single node, re-adding
//! 4. **Router**: local vs remote decisions, membership changes, workspace wiring
//! 5. **Properties**: determinism and minimal movement (proptest)

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use peer_ring::{HashRing, RingBuilder, RingConfig, RingRouter, Token};
use peers::{
    CallContext, GetRequest, GetResponse, PeerError, PeerRouter, RemotePeer, SetRequest,
    Workspace,
};
use proptest::prelude::*;

// ============================================================================
// Fixtures
// ============================================================================

/// Peer that only knows its address.
struct StubPeer(String);

#[async_trait]
impl RemotePeer for StubPeer {
    async fn get(&self, _: &CallContext, req: &GetRequest) -> Result<GetResponse, PeerError> {
        Ok(GetResponse::new(format!("{}:{}", self.0, req.key)))
    }

    async fn remove(&self, _: &CallContext, _: &GetRequest) -> Result<(), PeerError> {
        Ok(())
    }

    async fn set(&self, _: &CallContext, _: &SetRequest) -> Result<(), PeerError> {
        Ok(())
    }

    fn address(&self) -> &str {
        &self.0
    }
}

fn stub(address: &str) -> Arc<dyn RemotePeer> {
    Arc::new(StubPeer(address.to_string()))
}

fn three_node_router() -> RingRouter {
    let router = RingRouter::new("a:80", 32);
    router.set_peers(vec![stub("b:80"), stub("c:80")]);
    router
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = HashRing::new();
    assert_eq!(ring.lookup(b"key1"), None);
    assert_eq!(ring.node_count(), 0);
    assert_eq!(ring.token_count(), 0);
    assert!(ring.is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let ring = HashRing::new();
    ring.add_node("a:80", 4);

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 4);
    assert!(ring.contains("a:80"));

    let owner = ring.lookup(b"test-key").expect("Lookup should succeed after adding node");
    assert_eq!(&*owner, "a:80");
}

#[test]
fn test_remove_node() {
    let ring = HashRing::new();
    ring.add_node("a:80", 4);
    ring.add_node("b:80", 4);
    assert_eq!(ring.token_count(), 8);

    assert!(ring.remove_node("a:80"), "Should successfully remove node");
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 4);
    assert_eq!(ring.lookup(b"some-key").as_deref(), Some("b:80"));

    // Removing a missing node reports false
    assert!(!ring.remove_node("zzz:80"));
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_multiple_nodes_cover_all_owners() {
    let ring = RingBuilder::new()
        .with_vnodes(64)
        .add_node("a:80")
        .add_node("b:80")
        .add_node("c:80")
        .build();

    assert_eq!(ring.nodes(), vec!["a:80", "b:80", "c:80"]);

    let owners: HashSet<String> = (0..1_000)
        .filter_map(|i| ring.lookup(format!("key-{i}").as_bytes()))
        .map(|owner| owner.to_string())
        .collect();
    assert_eq!(owners.len(), 3, "With 64 vnodes each, all nodes should own keys");
}

#[test]
fn test_consistent_lookup() {
    let ring = RingBuilder::new().with_vnodes(8).add_node("a:80").add_node("b:80").build();

    let first = ring.lookup(b"consistent-key");
    for _ in 0..10 {
        assert_eq!(ring.lookup(b"consistent-key"), first);
    }
}

#[test]
fn test_ring_builder_default_vnodes() {
    let ring = RingBuilder::new().add_node("a:80").add_node("b:80").build();
    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 2 * peer_ring::DEFAULT_VNODES);
}

#[test]
fn test_ring_builder_mixed_vnodes() {
    let ring = RingBuilder::new()
        .with_vnodes(4)
        .add_node("a:80")
        .add_node_with_vnodes("b:80", 8)
        .build();

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 12);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_wraparound_goes_to_smallest_token() {
    let ring = HashRing::new();
    ring.add_node("a:80", 1);
    ring.add_node("b:80", 1);

    let tokens = ring.tokens();
    let first_owner = tokens[0].owner().to_string();
    let last = tokens[tokens.len() - 1].token();

    // Find a key hashing past the last token
    let key = (0..100_000)
        .map(|i| format!("wrap-{i}"))
        .find(|k| Token::from_key(k) > last)
        .expect("Some key should hash past the last token");
    assert_eq!(ring.lookup(key.as_bytes()).as_deref(), Some(first_owner.as_str()));
}

#[test]
fn test_single_node_owns_everything() {
    let ring = HashRing::new();
    ring.add_node("a:80", 4);
    for key in [&b"key1"[..], b"key2", b"", b"very-long-key-name"] {
        assert_eq!(ring.lookup(key).as_deref(), Some("a:80"));
    }
}

#[test]
fn test_add_remove_add() {
    let ring = HashRing::new();
    ring.add_node("a:80", 4);
    let before = ring.tokens();

    assert!(ring.remove_node("a:80"));
    assert!(ring.lookup(b"key").is_none());

    ring.add_node("a:80", 4);
    assert_eq!(ring.tokens(), before, "Same address lands on the same tokens");
}

#[test]
fn test_idempotent_add() {
    let ring = HashRing::new();
    ring.add_node("a:80", 4);
    ring.add_node("a:80", 4);
    assert_eq!(ring.token_count(), 4);
    assert_eq!(ring.node_count(), 1);
}

// ============================================================================
// Router Tests
// ============================================================================

#[test]
fn test_router_without_peers_is_all_local() {
    let router = RingRouter::new("a:80", 16);
    for i in 0..100 {
        assert!(router.route_for(&format!("k{i}")).is_local());
    }
    assert!(router.all_peers().is_empty());
}

#[test]
fn test_router_routes_match_owner() {
    let router = three_node_router();
    assert_eq!(router.peer_count(), 2);

    for i in 0..500 {
        let key = format!("key-{i}");
        let owner = router.owner(&key);
        let (peer, remote) = router.route_for(&key).into_parts();

        if owner == "a:80" {
            assert!(!remote && peer.is_none(), "Self-owned key {key} must be local");
        } else {
            assert!(remote, "Key {key} owned by {owner} must be remote");
            assert_eq!(peer.unwrap().address(), owner);
        }
    }
}

#[test]
fn test_router_all_peers_excludes_self() {
    let router = three_node_router();
    let mut addresses: Vec<String> = router
        .all_peers()
        .iter()
        .map(|p| p.address().to_string())
        .collect();
    addresses.sort();
    assert_eq!(addresses, vec!["b:80", "c:80"]);
}

#[test]
fn test_router_ignores_self_in_peer_list() {
    let router = RingRouter::new("a:80", 8);
    router.set_peers(vec![stub("a:80"), stub("b:80")]);
    assert_eq!(router.peer_count(), 1);
}

#[test]
fn test_router_membership_change_only_moves_removed_keys() {
    let router = three_node_router();
    let keys: Vec<String> = (0..500).map(|i| format!("key-{i}")).collect();
    let before: Vec<String> = keys.iter().map(|k| router.owner(k)).collect();

    router.set_peers(vec![stub("b:80")]);

    for (key, old_owner) in keys.iter().zip(&before) {
        let new_owner = router.owner(key);
        if old_owner != "c:80" {
            assert_eq!(&new_owner, old_owner, "Key {key} should not move");
        } else {
            assert_ne!(new_owner, "c:80");
        }
    }
}

#[test]
fn test_router_from_config() {
    let config = RingConfig::new("a:80").with_peers(["a:80", "b:80", "c:80"]).with_vnodes(16);
    let router = RingRouter::from_config(&config, stub).unwrap();

    assert_eq!(router.self_address(), "a:80");
    assert_eq!(router.vnodes(), 16);
    assert_eq!(router.peer_count(), 2);

    let bad = RingConfig::new("a:80").with_vnodes(0);
    assert!(RingRouter::from_config(&bad, stub).is_err());
}

#[test]
fn test_router_through_workspace() {
    let ws = Workspace::new("ring");
    let router = Arc::new(three_node_router());
    let shared = Arc::clone(&router);
    ws.register_router(move || Some(Arc::clone(&shared) as Arc<dyn PeerRouter>))
        .unwrap();

    let resolved = ws.resolve_router("users");
    for i in 0..100 {
        let key = format!("key-{i}");
        assert_eq!(
            resolved.route_for(&key).peer().map(|p| p.address().to_string()),
            router.route_for(&key).peer().map(|p| p.address().to_string())
        );
    }
}

#[tokio::test]
async fn test_router_dispatches_to_owner() {
    let router = three_node_router();
    let key = (0..1_000)
        .map(|i| format!("key-{i}"))
        .find(|k| router.route_for(k).is_remote())
        .expect("Some key should be remote");

    let peer = router.route_for(&key).peer().cloned().unwrap();
    let resp = peer
        .get(&CallContext::new(), &GetRequest::new("g", key.clone()))
        .await
        .unwrap();
    assert_eq!(resp.value, format!("{}:{}", router.owner(&key), key).into_bytes());
}

#[test]
fn test_router_concurrent_reads_during_membership_change() {
    let router = three_node_router();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for i in 0..2_000 {
                    let route = router.route_for(&format!("key-{i}"));
                    if let Some(peer) = route.peer() {
                        assert_ne!(peer.address(), "a:80");
                    }
                }
            });
        }
        s.spawn(|| {
            for round in 0..50 {
                if round % 2 == 0 {
                    router.set_peers(vec![stub("b:80")]);
                } else {
                    router.set_peers(vec![stub("b:80"), stub("c:80")]);
                }
            }
        });
    });
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_lookup_is_deterministic_and_known(key in ".*", vnodes in 1usize..32) {
        let ring = RingBuilder::new()
            .with_vnodes(vnodes)
            .add_node("a:80")
            .add_node("b:80")
            .add_node("c:80")
            .build();

        let owner = ring.lookup(key.as_bytes()).unwrap();
        prop_assert!(["a:80", "b:80", "c:80"].contains(&&*owner));
        prop_assert_eq!(ring.lookup(key.as_bytes()), Some(owner));
    }

    #[test]
    fn prop_adding_node_moves_keys_only_to_it(keys in prop::collection::vec(".*", 1..50)) {
        let ring = RingBuilder::new().with_vnodes(16).add_node("a:80").add_node("b:80").build();
        let before: Vec<_> = keys.iter().map(|k| ring.lookup(k.as_bytes())).collect();

        ring.add_node("c:80", 16);

        for (key, old) in keys.iter().zip(before) {
            let new = ring.lookup(key.as_bytes());
            prop_assert!(new == old || new.as_deref() == Some("c:80"));
        }
    }
}
