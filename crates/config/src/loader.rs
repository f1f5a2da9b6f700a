use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::TougaoConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["tougao.toml", "tougao.yaml", "tougao.yml", "tougao.json"];

/// Bot token variable.
pub const TOKEN_ENV: &str = "TELEGRAM_TOKEN";
/// Overrides `publish.channel_id`.
pub const CHANNEL_ENV: &str = "TOUGAO_CHANNEL_ID";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<TougaoConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tougao.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tougao/tougao.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TougaoConfig::default()` if no config file is found or the file
/// fails to parse.
pub fn discover_and_load() -> TougaoConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    TougaoConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    if let Some(p) = first_existing(Path::new(".")) {
        return Some(p);
    }
    config_dir().and_then(|dir| first_existing(&dir))
}

fn first_existing(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/tougao/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tougao").map(|d| d.config_dir().to_path_buf())
}

/// Apply `TELEGRAM_TOKEN` and `TOUGAO_CHANNEL_ID` from the environment.
pub fn apply_env_overrides(config: &mut TougaoConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(config: &mut TougaoConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        debug!("telegram token taken from {TOKEN_ENV}");
        config.telegram.token = Secret::new(token);
    }
    if let Some(channel) = lookup(CHANNEL_ENV).filter(|c| !c.trim().is_empty()) {
        debug!(channel_id = %channel, "publish channel taken from {CHANNEL_ENV}");
        config.publish.channel_id = channel.trim().to_string();
    }
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<TougaoConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
