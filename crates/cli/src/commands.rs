//! Command execution.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use peer_ring::{RingConfig, RingRouter};
use peers::{PeerRouter, Route, Workspace};
use tracing::{debug, warn};

use crate::config::{CliConfig, Command};
use crate::peer::AddressPeer;

/// Output of one command, one line per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub lines: Vec<String>,
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

impl CliConfig {
    /// Run against the process-wide default workspace and print the result.
    pub fn run(self) -> anyhow::Result<()> {
        let result = self.run_in(Workspace::global())?;
        print!("{result}");
        Ok(())
    }

    /// Register a ring router on `workspace`, resolve the group and execute
    /// the command.
    pub fn run_in(&self, workspace: &Workspace) -> anyhow::Result<CommandResult> {
        let ring = self.ring_config()?;
        register_ring(workspace, ring).with_context(|| {
            format!("registering ring router on workspace {:?}", workspace.name())
        })?;

        let router = workspace.resolve_router(&self.group);
        Ok(self.command.execute(router.as_ref()))
    }
}

/// Install a per-group factory that builds one `RingRouter` per group from
/// `ring`.
pub fn register_ring(workspace: &Workspace, ring: RingConfig) -> peers::Result<()> {
    workspace.register_per_group_router(move |group| {
        debug!(group, self_address = %ring.self_address, "building ring router");
        match RingRouter::from_config(&ring, AddressPeer::connect) {
            Ok(router) => Some(Arc::new(router) as Arc<dyn PeerRouter>),
            Err(err) => {
                warn!(group, error = %err, "invalid ring config, group routes locally");
                None
            }
        }
    })
}

impl Command {
    pub fn execute(&self, router: &dyn PeerRouter) -> CommandResult {
        let lines = match self {
            Command::Route { keys } => keys
                .iter()
                .map(|key| match router.route_for(key) {
                    Route::Local => format!("{key} -> local"),
                    Route::Remote(peer) => format!("{key} -> {}", peer.address()),
                })
                .collect(),
            Command::Peers => {
                let mut addresses: Vec<String> = router
                    .all_peers()
                    .iter()
                    .map(|peer| peer.address().to_string())
                    .collect();
                addresses.sort();
                if addresses.is_empty() {
                    vec!["(no peers)".to_string()]
                } else {
                    addresses
                }
            }
        };
        CommandResult { lines }
    }
}
