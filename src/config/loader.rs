use std::path::Path;

use anyhow::{Context, Result};

use super::types::Config;

/// Name of the config file looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = ".checkrun.yaml";

/// Load config from `.checkrun.yaml` in the given directory.
///
/// A missing file yields [`Config::default`].
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load_from(&path)
}

/// Load config from an explicit path. The file must exist.
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), checks = config.checks.len(), "loaded config");
    Ok(config)
}
