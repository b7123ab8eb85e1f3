//! Profile configuration in `~/.gitboard/config.toml`.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    pub server: Option<String>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("GITBOARD_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".gitboard"),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_all() -> Result<ConfigFile> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(&path)?;
    let cfg: ConfigFile = toml::from_str(&content)?;
    Ok(cfg)
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let mut all = load_all()?;
    Ok(all.remove(profile).unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all()?;
    all.insert(
        profile.to_string(),
        ProfileConfig {
            server: config.server.clone(),
        },
    );
    let content = toml::to_string_pretty(&all)?;
    fs::write(config_path()?, content)?;
    Ok(())
}

/// Resolution order: `--server` flag / `GITBOARD_URL` env, then the profile
/// config, then the server recorded with stored credentials.
pub fn resolve_server(cli_server: &Option<String>, profile: &str) -> Result<String> {
    if let Some(s) = cli_server {
        return Ok(s.clone());
    }
    let cfg = load_profile(profile)?;
    if let Some(s) = cfg.server {
        return Ok(s);
    }
    if let Ok(Some(creds)) = crate::auth::load_credentials(profile) {
        return Ok(creds.server);
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set GITBOARD_URL, or run: gitboard config set server <url>"
    )
}
