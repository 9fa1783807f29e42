use anyhow::Result;
use tokio::runtime::Handle;

use crate::model::{ConsoleConfig, ResourceKind};

#[derive(Clone, Debug)]
pub struct TuiRunOptions {
    /// Resource view shown first.
    pub resource: ResourceKind,
    pub config: ConsoleConfig,
}

/// Runs the interactive browser until the user quits. Gateway requests are
/// spawned on `handle`; the terminal loop itself stays on this thread.
pub fn run_with_options(handle: Handle, opts: TuiRunOptions) -> Result<()> {
    crate::tui_shell::run(handle, opts)
}
