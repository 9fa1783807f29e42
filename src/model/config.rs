use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::DEFAULT_PAGE_SIZE;

pub const CONFIG_VERSION: u32 = 1;
pub const CONFIG_ENV: &str = "BACKOFFICE_CONFIG";
pub const URL_ENV: &str = "BACKOFFICE_URL";
pub const TOKEN_ENV: &str = "BACKOFFICE_TOKEN";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: Option<GatewayConfig>,

    #[serde(default)]
    pub list: ListConfig,

    #[serde(default)]
    pub picker: PickerConfig,

    #[serde(default)]
    pub timestamps: TimestampMode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListConfig {
    /// Page size used when a list view mounts.
    pub page_size: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Number of options fetched per picker search.
    pub page_size: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    #[default]
    Relative,
    Absolute,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            gateway: None,
            list: ListConfig::default(),
            picker: PickerConfig::default(),
            timestamps: TimestampMode::default(),
        }
    }
}

impl ConsoleConfig {
    /// `$BACKOFFICE_CONFIG`, else `$XDG_CONFIG_HOME/backoffice/config.json`,
    /// else `$HOME/.config/backoffice/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(p) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(p));
        }
        let base = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => {
                let home = std::env::var_os("HOME").context("HOME is not set")?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("backoffice").join("config.json"))
    }

    /// Reads the config file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read {}", path.display()));
            }
        };
        let cfg: ConsoleConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        if cfg.version != CONFIG_VERSION {
            anyhow::bail!(
                "unsupported config version {} in {}",
                cfg.version,
                path.display()
            );
        }
        Ok(cfg)
    }

    /// Writes via a temp file and rename so a crash never leaves a torn file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create {}", dir.display()))?;
        }
        let bytes = serde_json::to_vec_pretty(self).context("serialize config")?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
        Ok(())
    }

    /// Applies `BACKOFFICE_URL` / `BACKOFFICE_TOKEN` on top of the file.
    pub fn with_env_overrides(mut self) -> Self {
        let url = std::env::var(URL_ENV).ok().filter(|s| !s.trim().is_empty());
        let token = std::env::var(TOKEN_ENV).ok().filter(|s| !s.trim().is_empty());
        self.apply_overrides(url, token);
        self
    }

    pub fn apply_overrides(&mut self, url: Option<String>, token: Option<String>) {
        match (&mut self.gateway, url) {
            (Some(gw), Some(url)) => gw.base_url = url,
            (None, Some(url)) => {
                self.gateway = Some(GatewayConfig {
                    base_url: url,
                    token: None,
                })
            }
            _ => {}
        }
        if let (Some(gw), Some(token)) = (&mut self.gateway, token) {
            gw.token = Some(token);
        }
    }

    pub fn require_gateway(&self) -> Result<&GatewayConfig> {
        self.gateway.as_ref().context(
            "no gateway configured (run `backoffice config set --url ...` or set BACKOFFICE_URL)",
        )
    }
}

#[cfg(test)]
#[path = "../tests/model/config_tests.rs"]
mod tests;
