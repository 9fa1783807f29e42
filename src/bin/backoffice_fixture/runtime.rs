use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use backoffice::logging::{LogConfig, LogFormat, init_logging};

use super::routes::authed_router;
use super::seed::load_seed;
use super::*;

#[derive(Parser)]
#[command(name = "backoffice-fixture")]
#[command(about = "In-memory back-office API for development and tests", long_about = None)]
pub(super) struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8090")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Bearer token accepted on /api routes
    #[arg(long, default_value = "dev")]
    dev_token: String,

    /// JSON file with initial records keyed by resource (built-in data otherwise)
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

pub(super) async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&LogConfig::from_verbosity(args.verbose).with_format(args.log_format))?;

    let seed = load_seed(args.seed.as_deref())?;
    let store = Store::from_seed(seed).context("load seed")?;
    let state = Arc::new(AppState {
        dev_token: args.dev_token.clone(),
        store: RwLock::new(store),
    });

    let authed = authed_router(state.clone());
    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(authed)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("bind {}", args.addr))?;

    let local_addr = listener.local_addr().context("read listener local addr")?;
    eprintln!("backoffice-fixture listening on {}", local_addr);

    if let Some(addr_file) = &args.addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
