//! YAML configuration files. Missing keys take their defaults.

use std::fs;
use std::path::Path;

use cm_core::MonitorConfig;

use crate::{IoError, IoResult};

pub fn load_config(path: &Path) -> IoResult<MonitorConfig> {
    let content = fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: MonitorConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: &Path, config: &MonitorConfig) -> IoResult<()> {
    let content = config_to_yaml(config)?;
    fs::write(path, content).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn config_to_yaml(config: &MonitorConfig) -> IoResult<String> {
    config.validate()?;
    Ok(serde_yaml::to_string(config)?)
}
