use backoffice::model::ResourceKind;
use backoffice::tui::TuiRunOptions;

use super::config::handle_config_command;
use super::mutations::{handle_mutate_command, handle_upload_command};
use super::resources::{handle_list_command, handle_show_command};
use super::*;

pub(super) fn handle_command(
    runtime: &Runtime,
    config_path: &Path,
    command: Option<Commands>,
) -> Result<()> {
    match command {
        None => handle_tui_command(runtime, config_path, None)?,
        Some(Commands::Tui(args)) => handle_tui_command(runtime, config_path, args.resource)?,
        Some(Commands::List(args)) => {
            let (cfg, gateway) = connect(config_path)?;
            runtime.block_on(handle_list_command(&cfg, gateway, args))?
        }
        Some(Commands::Show(args)) => {
            let (_, gateway) = connect(config_path)?;
            runtime.block_on(handle_show_command(gateway, args))?
        }
        Some(Commands::Mutate(args)) => {
            let (_, gateway) = connect(config_path)?;
            runtime.block_on(handle_mutate_command(gateway, args))?
        }
        Some(Commands::Upload(args)) => {
            let (_, gateway) = connect(config_path)?;
            runtime.block_on(handle_upload_command(gateway, args))?
        }
        Some(Commands::Config { command }) => handle_config_command(config_path, command)?,
    }
    Ok(())
}

fn handle_tui_command(
    runtime: &Runtime,
    config_path: &Path,
    resource: Option<ResourceKind>,
) -> Result<()> {
    let resource = resource.unwrap_or(ResourceKind::BROWSABLE[0]);
    if !ResourceKind::BROWSABLE.contains(&resource) {
        let names: Vec<&str> = ResourceKind::BROWSABLE.iter().map(|k| k.as_str()).collect();
        anyhow::bail!(
            "{} has no view of its own (choose one of: {})",
            resource,
            names.join(", ")
        );
    }
    let config = load_config(config_path)?;
    backoffice::tui::run_with_options(
        runtime.handle().clone(),
        TuiRunOptions { resource, config },
    )
}
