use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show the effective config (file plus environment overrides)
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the config file
    Set {
        /// Gateway base URL, e.g. http://127.0.0.1:8080
        #[arg(long)]
        url: Option<String>,
        /// Bearer token sent with every request
        #[arg(long)]
        token: Option<String>,
        /// Drop the stored token
        #[arg(long, conflicts_with = "token")]
        clear_token: bool,
        /// Page size for list views
        #[arg(long)]
        page_size: Option<u32>,
        /// Page size for picker searches
        #[arg(long)]
        picker_page_size: Option<u32>,
    },
}
