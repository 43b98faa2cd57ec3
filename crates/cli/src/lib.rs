//! CLI tool for inspecting cache peer routing.
//!
//! Provides commands for:
//! - Showing which peer owns a key
//! - Listing the peer set a group routes to

pub mod commands;
pub mod config;
pub mod peer;

pub use commands::CommandResult;
pub use config::{CliConfig, Command};
pub use peer::AddressPeer;
