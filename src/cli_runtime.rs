use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use backoffice::logging::{LogConfig, LogFormat, init_logging};
use backoffice::model::ConsoleConfig;

use crate::Commands;

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(about = "Back-office console for the resource API", long_about = None)]
pub(crate) struct Cli {
    /// More logging (-v debug, -vv trace); RUST_LOG wins when set
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    log_format: LogFormat,

    /// Append logs to this file (the TUI logs nowhere without it)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Config file (defaults to $BACKOFFICE_CONFIG or ~/.config/backoffice/config.json)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

pub(crate) fn run() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal; stderr output would tear the screen.
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui(_)));
    let log = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_log_file(cli.log_file)
        .with_quiet_stderr(tui_mode);
    init_logging(&log)?;

    let config_path = match cli.config {
        Some(p) => p,
        None => ConsoleConfig::default_path()?,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    crate::cli_exec::handle_command(&runtime, &config_path, cli.command)
}

/// Loads the config file with `BACKOFFICE_URL` / `BACKOFFICE_TOKEN` applied.
pub(crate) fn load_config(path: &std::path::Path) -> Result<ConsoleConfig> {
    Ok(ConsoleConfig::load(path)?.with_env_overrides())
}
