use std::path::Path;

use anyhow::{Context, Result};

use super::types::Config;

/// File looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = ".modelpack.yaml";

/// Load config from a `.modelpack.yaml` file in the given directory.
///
/// A missing file yields the defaults.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_file(&path)
}

/// Load config from an explicit path. The file must exist.
pub fn load_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    // An empty file parses as YAML null rather than an empty mapping.
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}
