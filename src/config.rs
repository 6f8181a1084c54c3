use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::vm::DEFAULT_MAX_CALL_DEPTH;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Colored diagnostics on stderr.
    pub color: bool,
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config { color: true, max_call_depth: DEFAULT_MAX_CALL_DEPTH }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    // ~/.minicpp/config.toml
    dirs_next::home_dir().map(|h| h.join(".minicpp").join("config.toml"))
}

pub fn resolve_config_path(cli_path: &Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = cli_path {
        return Some(p.clone());
    }
    default_config_path()
}

/// Reads the config at `path`; a missing file yields the defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Read config {}", path.display()))?;
    parse(&text).with_context(|| format!("Parse config {}", path.display()))
}

pub fn parse(text: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(text)?;
    if cfg.max_call_depth == 0 {
        anyhow::bail!("max_call_depth must be at least 1");
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        assert_eq!(parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let cfg = parse("color = false").unwrap();
        assert!(!cfg.color);
        assert_eq!(cfg.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
    }

    #[test]
    fn zero_depth_rejected() {
        assert!(parse("max_call_depth = 0").is_err());
    }

    #[test]
    fn cli_flag_wins() {
        let p = PathBuf::from("custom.toml");
        assert_eq!(resolve_config_path(&Some(p.clone())), Some(p));
    }
}
