use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use backoffice::gateway::HttpGateway;
use backoffice::model::ConsoleConfig;

use crate::cli_runtime::load_config;
use crate::{Commands, ConfigCommands};

mod config;
mod dispatch;
mod mutations;
mod output;
mod resources;

pub(super) fn handle_command(
    runtime: &Runtime,
    config_path: &Path,
    command: Option<Commands>,
) -> Result<()> {
    dispatch::handle_command(runtime, config_path, command)
}

/// Effective config and a gateway built from it.
fn connect(config_path: &Path) -> Result<(ConsoleConfig, Arc<HttpGateway>)> {
    let cfg = load_config(config_path)?;
    let gateway = HttpGateway::from_config(cfg.require_gateway()?)
        .with_context(|| format!("gateway from {}", config_path.display()))?;
    Ok((cfg, Arc::new(gateway)))
}
