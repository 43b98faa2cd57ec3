//! Static ring configuration.
//!
//! ```json
//! {"self_address": "10.0.0.1:8080", "peers": ["10.0.0.2:8080"], "vnodes": 64}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RingError};
use crate::ring::{DEFAULT_VNODES, MAX_VNODES};

/// Description of a static peer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingConfig {
    /// Address of this process as other peers know it.
    pub self_address: String,
    /// Addresses of the other peers. May include `self_address`.
    #[serde(default)]
    pub peers: Vec<String>,
    /// Virtual nodes per peer.
    #[serde(default = "default_vnodes")]
    pub vnodes: usize,
}

fn default_vnodes() -> usize {
    DEFAULT_VNODES
}

impl RingConfig {
    pub fn new(self_address: impl Into<String>) -> Self {
        Self {
            self_address: self_address.into(),
            peers: Vec::new(),
            vnodes: DEFAULT_VNODES,
        }
    }

    pub fn with_peers<I, S>(mut self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peers = peers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.vnodes = vnodes;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.self_address.trim().is_empty() {
            return Err(RingError::InvalidConfig(
                "self_address must not be empty".to_string(),
            ));
        }
        if self.vnodes == 0 {
            return Err(RingError::InvalidConfig(
                "vnodes must be at least 1".to_string(),
            ));
        }
        if self.vnodes > MAX_VNODES {
            return Err(RingError::InvalidConfig(format!(
                "vnodes must be at most {MAX_VNODES}, got {}",
                self.vnodes
            )));
        }
        if let Some(peer) = self.peers.iter().find(|p| p.trim().is_empty()) {
            return Err(RingError::InvalidConfig(format!(
                "peer address {peer:?} is empty"
            )));
        }
        Ok(())
    }
}
