use std::path::PathBuf;

use clap::Args;

use backoffice::model::{EntityId, ResourceKind};

#[derive(Args)]
pub(crate) struct ListArgs {
    /// Resource to list (orders, plans, promo-codes, teams, ...)
    pub(crate) resource: ResourceKind,
    /// Filter as key=value; repeatable. `unset` clears a key
    #[arg(short = 'f', long = "filter", value_name = "KEY=VALUE")]
    pub(crate) filters: Vec<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
    /// Defaults to list.page_size from the config
    #[arg(long)]
    pub(crate) page_size: Option<u32>,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct ShowArgs {
    pub(crate) resource: ResourceKind,
    pub(crate) id: EntityId,
    /// Also load one detail tab (e.g. members, orders, logs)
    #[arg(long)]
    pub(crate) tab: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) tab_page: u32,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct MutateArgs {
    pub(crate) resource: ResourceKind,
    /// Command name understood by the remote (create, update, delete, ...)
    pub(crate) command: String,
    /// Target record
    #[arg(long)]
    pub(crate) id: Option<EntityId>,
    /// JSON object sent as the command payload
    #[arg(long, value_name = "JSON")]
    pub(crate) payload: Option<String>,
    /// Required for delete, cancel, revoke and suspend
    #[arg(long)]
    pub(crate) confirm: bool,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    pub(crate) resource: ResourceKind,
    pub(crate) id: EntityId,
    pub(crate) file: PathBuf,
    /// Emit JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct TuiArgs {
    /// Resource shown first (defaults to orders)
    pub(crate) resource: Option<ResourceKind>,
}
