//! Cluster-wide operations over a router's peer set.

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::context::CallContext;
use crate::error::PeerError;
use crate::message::GetRequest;
use crate::router::PeerRouter;

/// Result of invalidating a key on one peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub address: String,
    pub result: Result<(), PeerError>,
}

/// Invalidate `req` on every peer known to `router`, concurrently.
///
/// Returns one outcome per peer in the order `all_peers` listed them.
/// Failures are reported, never retried. Dropping the returned future
/// aborts every remove still in flight.
///
/// # Panics
///
/// Panics if polled outside a tokio runtime while the router has peers.
pub async fn broadcast_remove(
    router: &dyn PeerRouter,
    ctx: &CallContext,
    req: &GetRequest,
) -> Vec<RemoveOutcome> {
    let peers = router.all_peers();
    if peers.is_empty() {
        return Vec::new();
    }

    debug!(group = %req.group, key = %req.key, peers = peers.len(), "broadcasting remove");

    let addresses: Vec<String> = peers.iter().map(|peer| peer.address().to_string()).collect();
    let mut calls = JoinSet::new();
    for (index, peer) in peers.into_iter().enumerate() {
        let ctx = ctx.clone();
        let req = req.clone();
        calls.spawn(async move { (index, peer.remove(&ctx, &req).await) });
    }

    let mut results: Vec<Option<Result<(), PeerError>>> = vec![None; addresses.len()];
    while let Some(joined) = calls.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            // The slot stays empty and is reported below
            Err(join_err) => debug!(error = %join_err, "remove task failed"),
        }
    }

    addresses
        .into_iter()
        .zip(results)
        .map(|(address, result)| {
            let result = result.unwrap_or_else(|| {
                Err(PeerError::Transport("remove task failed".to_string()))
            });
            if let Err(err) = &result {
                warn!(peer = %address, key = %req.key, error = %err, "remove failed on peer");
            }
            RemoveOutcome { address, result }
        })
        .collect()
}
