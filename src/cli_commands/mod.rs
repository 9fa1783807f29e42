use clap::Subcommand;

use crate::ConfigCommands;

pub(crate) mod resources;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List one page of a resource
    List(resources::ListArgs),

    /// Show one record, optionally with one of its tabs
    Show(resources::ShowArgs),

    /// Send a mutation command (create, update, delete, ...)
    Mutate(resources::MutateArgs),

    /// Attach a file to a record
    Upload(resources::UploadArgs),

    /// Browse interactively in the terminal (default without a subcommand)
    Tui(resources::TuiArgs),

    /// Show or change the console config
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}
