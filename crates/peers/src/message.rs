//! Messages exchanged with a remote peer.
//!
//! These are plain data shapes; how they travel over the wire is up to the
//! transport implementing `RemotePeer`.

use std::time::SystemTime;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identifies one key within one cache group.
///
/// Used by both `get` and `remove`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GetRequest {
    pub group: String,
    pub key: String,
}

impl GetRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }
}

/// A value served by a peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetResponse {
    pub value: Bytes,
    /// Requests per minute the owner has seen for this key; hot-key hint.
    #[serde(default)]
    pub minute_qps: f64,
    /// When the owner will stop serving the value, if it expires.
    #[serde(default)]
    pub expire: Option<SystemTime>,
}

impl GetResponse {
    pub fn new(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            minute_qps: 0.0,
            expire: None,
        }
    }

    pub fn with_expire(mut self, expire: SystemTime) -> Self {
        self.expire = Some(expire);
        self
    }

    /// True once `now` has reached the expiry time.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.expire.is_some_and(|at| now >= at)
    }
}

/// Pushes a value into a peer's cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRequest {
    pub group: String,
    pub key: String,
    pub value: Bytes,
    #[serde(default)]
    pub expire: Option<SystemTime>,
}

impl SetRequest {
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value: value.into(),
            expire: None,
        }
    }

    pub fn with_expire(mut self, expire: SystemTime) -> Self {
        self.expire = Some(expire);
        self
    }
}
