//! Command-line configuration for `peerctl`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use peer_ring::{RingConfig, DEFAULT_VNODES};

/// Inspect how cache keys route across peers.
#[derive(Debug, Parser)]
#[command(name = "peerctl", version)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Ring config file (JSON); takes precedence over the ring flags
    #[arg(long, global = true, env = "PEERCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address of this process on the ring
    #[arg(long = "self-addr", global = true, env = "PEERCTL_SELF_ADDR")]
    pub self_addr: Option<String>,

    /// Address of another peer (repeatable)
    #[arg(long = "peer", global = true)]
    pub peers: Vec<String>,

    /// Virtual nodes per peer
    #[arg(long, global = true, default_value_t = DEFAULT_VNODES)]
    pub vnodes: usize,

    /// Cache group to resolve the router for
    #[arg(long, global = true, default_value = "default")]
    pub group: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show which peer owns each key
    Route {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List the peers the group routes to
    Peers,
}

impl CliConfig {
    /// The ring description, from `--config` or from the flags.
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        if let Some(path) = &self.config {
            return RingConfig::load(path)
                .with_context(|| format!("loading ring config from {}", path.display()));
        }

        let self_addr = self
            .self_addr
            .clone()
            .context("either --config or --self-addr is required")?;
        let config = RingConfig::new(self_addr)
            .with_peers(self.peers.iter().cloned())
            .with_vnodes(self.vnodes);
        config.validate()?;
        Ok(config)
    }
}
