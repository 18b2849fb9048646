//! Gateway config loader (strict parsing + environment overrides).
//!
//! Resolution order: built-in defaults, then the YAML file (`TALLY_CONFIG`,
//! or `tally.yaml` when present), then `PORT` / `REDIS_URL` / `TALLY_STORE`.

pub mod schema;

use std::fs;
use std::path::Path;

use tally_core::error::{Result, TallyError};

pub use schema::{ServerSection, StoreBackend, StoreSection, TallyConfig};

const DEFAULT_CONFIG_PATH: &str = "tally.yaml";

/// Load config from the process environment.
pub fn load() -> Result<TallyConfig> {
    load_with(|name| std::env::var(name).ok())
}

/// Load config using `env` as the variable lookup.
pub fn load_with<F>(env: F) -> Result<TallyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match env("TALLY_CONFIG") {
        Some(path) => parse_file(&path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => parse_file(DEFAULT_CONFIG_PATH)?,
        None => TallyConfig::default(),
    };
    apply_env(&mut cfg, env)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<TallyConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<TallyConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_file(path: &str) -> Result<TallyConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TallyError::InvalidConfig(format!("read {path} failed: {e}")))?;
    parse_str(&s)
}

fn parse_str(s: &str) -> Result<TallyConfig> {
    serde_yaml::from_str(s).map_err(|e| TallyError::InvalidConfig(format!("invalid yaml: {e}")))
}

/// Apply environment overrides on top of a parsed config.
pub fn apply_env<F>(cfg: &mut TallyConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = env("PORT") {
        cfg.server.port = port
            .trim()
            .parse()
            .map_err(|e| TallyError::InvalidConfig(format!("PORT={port}: {e}")))?;
    }
    if let Some(url) = env("REDIS_URL") {
        cfg.store.url = url;
    }
    if let Some(backend) = env("TALLY_STORE") {
        cfg.store.backend = backend.parse()?;
    }
    Ok(())
}
