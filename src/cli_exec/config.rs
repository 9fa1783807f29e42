use backoffice::model::{GatewayConfig, TimestampMode};

use super::*;

const MAX_PAGE_SIZE: u32 = 100;

fn checked_page_size(flag: &str, n: u32) -> Result<u32> {
    if n == 0 || n > MAX_PAGE_SIZE {
        anyhow::bail!("{} must be between 1 and {}", flag, MAX_PAGE_SIZE);
    }
    Ok(n)
}

pub(super) fn handle_config_command(path: &Path, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { json } => {
            let mut cfg = load_config(path)?;
            if json {
                if let Some(gw) = cfg.gateway.as_mut()
                    && gw.token.is_some()
                {
                    gw.token = Some("<redacted>".to_string());
                }
                println!(
                    "{}",
                    serde_json::to_string_pretty(&cfg).context("serialize config json")?
                );
                return Ok(());
            }
            println!("path: {}", path.display());
            match &cfg.gateway {
                Some(gw) => {
                    println!("url: {}", gw.base_url);
                    println!(
                        "token: {}",
                        if gw.token.is_some() { "(set)" } else { "(none)" }
                    );
                }
                None => println!("No gateway configured"),
            }
            println!("list.page_size: {}", cfg.list.page_size);
            println!("picker.page_size: {}", cfg.picker.page_size);
            let ts = match cfg.timestamps {
                TimestampMode::Relative => "relative",
                TimestampMode::Absolute => "absolute",
            };
            println!("timestamps: {}", ts);
        }
        ConfigCommands::Set {
            url,
            token,
            clear_token,
            page_size,
            picker_page_size,
        } => {
            if url.is_none()
                && token.is_none()
                && !clear_token
                && page_size.is_none()
                && picker_page_size.is_none()
            {
                anyhow::bail!("nothing to set (pass --url, --token, --page-size ...)");
            }

            // Only the file is rewritten; environment overrides stay out of it.
            let mut cfg = ConsoleConfig::load(path)?;
            if let Some(url) = url {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    anyhow::bail!("--url must start with http:// or https:// (got {:?})", url);
                }
                match cfg.gateway.as_mut() {
                    Some(gw) => gw.base_url = url,
                    None => {
                        cfg.gateway = Some(GatewayConfig {
                            base_url: url,
                            token: None,
                        })
                    }
                }
            }
            if token.is_some() || clear_token {
                let gw = cfg
                    .gateway
                    .as_mut()
                    .context("no gateway configured (pass --url together with --token)")?;
                gw.token = token;
            }
            if let Some(n) = page_size {
                cfg.list.page_size = checked_page_size("--page-size", n)?;
            }
            if let Some(n) = picker_page_size {
                cfg.picker.page_size = checked_page_size("--picker-page-size", n)?;
            }
            cfg.save(path)?;
            tracing::info!(path = %path.display(), "config written");
            println!("Config written to {}", path.display());
        }
    }
    Ok(())
}
