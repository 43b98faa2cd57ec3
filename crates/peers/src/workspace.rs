//! Router registration and resolution.
//!
//! A `Workspace` holds at most one router factory. An operator installs it
//! once at startup; cache groups then resolve their router through it,
//! usually once per group at creation time.
//!
//! # Lifecycle
//!
//! ```text
//! Empty --register_router / register_per_group_router--> Registered
//! Registered --any further registration--> Err(ConfigurationConflict)
//! ```
//!
//! There is no way back to `Empty`. Installation is an exclusive
//! check-and-set, so under concurrent registration exactly one call wins.

use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use dashmap::DashMap;
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::router::{no_peers, PeerRouter};

/// Builds the router for a group. Returning `None` means "no routing for
/// this group" and resolves to `NoPeers`.
pub type RouterFactory = Arc<dyn Fn(&str) -> Option<Arc<dyn PeerRouter>> + Send + Sync>;

static DEFAULT_WORKSPACE: LazyLock<Workspace> = LazyLock::new(|| Workspace::new("default"));

/// Scoped registry for the router factory of a set of cache groups.
pub struct Workspace {
    name: String,
    factory: OnceLock<RouterFactory>,
}

impl Workspace {
    /// Create an empty workspace. `name` only shows up in logs and errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factory: OnceLock::new(),
        }
    }

    /// The process-wide default workspace used by the free functions.
    pub fn global() -> &'static Workspace {
        &DEFAULT_WORKSPACE
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once a factory has been installed.
    pub fn is_registered(&self) -> bool {
        self.factory.get().is_some()
    }

    /// Register one router factory shared by every group.
    ///
    /// Fails with `ConfigurationConflict` if any factory is already
    /// installed; the existing one is kept.
    pub fn register_router<F>(&self, factory: F) -> Result<()>
    where
        F: Fn() -> Option<Arc<dyn PeerRouter>> + Send + Sync + 'static,
    {
        self.install(Arc::new(move |_group: &str| factory()), "uniform")
    }

    /// Register a router factory that receives the group name, so each group
    /// can route differently.
    ///
    /// Fails with `ConfigurationConflict` if any factory is already
    /// installed; the existing one is kept.
    pub fn register_per_group_router<F>(&self, factory: F) -> Result<()>
    where
        F: Fn(&str) -> Option<Arc<dyn PeerRouter>> + Send + Sync + 'static,
    {
        self.install(Arc::new(factory), "per-group")
    }

    fn install(&self, factory: RouterFactory, shape: &'static str) -> Result<()> {
        match self.factory.set(factory) {
            Ok(()) => {
                info!(workspace = %self.name, shape, "peer router registered");
                Ok(())
            }
            Err(_) => {
                error!(
                    workspace = %self.name,
                    shape,
                    "peer router registered more than once"
                );
                Err(Error::ConfigurationConflict {
                    workspace: self.name.clone(),
                })
            }
        }
    }

    /// Resolve the router for `group`.
    ///
    /// Never fails: without a registered factory, or when the factory yields
    /// nothing for this group, the shared `NoPeers` router is returned.
    /// Nothing is cached here; every call invokes the factory.
    pub fn resolve_router(&self, group: &str) -> Arc<dyn PeerRouter> {
        let Some(factory) = self.factory.get() else {
            return no_peers();
        };

        match factory(group) {
            Some(router) => router,
            None => {
                debug!(workspace = %self.name, group, "factory returned no router, using NoPeers");
                no_peers()
            }
        }
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("name", &self.name)
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Register a uniform router factory on the default workspace.
pub fn register_router<F>(factory: F) -> Result<()>
where
    F: Fn() -> Option<Arc<dyn PeerRouter>> + Send + Sync + 'static,
{
    Workspace::global().register_router(factory)
}

/// Register a per-group router factory on the default workspace.
pub fn register_per_group_router<F>(factory: F) -> Result<()>
where
    F: Fn(&str) -> Option<Arc<dyn PeerRouter>> + Send + Sync + 'static,
{
    Workspace::global().register_per_group_router(factory)
}

/// Resolve the router for `group` on `workspace`.
pub fn resolve_router(workspace: &Workspace, group: &str) -> Arc<dyn PeerRouter> {
    workspace.resolve_router(group)
}

/// Caller-side memo of resolved routers, one per group name.
///
/// Each group is resolved at most once, even when several lookups hit a new
/// group at the same time.
///
/// The factory runs while a write lock on one internal shard is held: it
/// must not call back into the same `GroupRouters`, and while it runs,
/// lookups of other groups that hash to that shard wait for it.
pub struct GroupRouters<'w> {
    workspace: &'w Workspace,
    routers: DashMap<String, Arc<dyn PeerRouter>>,
}

impl<'w> GroupRouters<'w> {
    pub fn new(workspace: &'w Workspace) -> Self {
        Self {
            workspace,
            routers: DashMap::new(),
        }
    }

    /// The router for `group`, resolving it on first use.
    pub fn get(&self, group: &str) -> Arc<dyn PeerRouter> {
        if let Some(router) = self.routers.get(group) {
            return Arc::clone(router.value());
        }

        let router = self
            .routers
            .entry(group.to_string())
            .or_insert_with(|| {
                debug!(workspace = %self.workspace.name, group, "resolving router for group");
                self.workspace.resolve_router(group)
            });
        Arc::clone(router.value())
    }

    /// Number of groups resolved so far.
    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}
