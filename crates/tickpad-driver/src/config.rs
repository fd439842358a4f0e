use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to encode driver config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to write driver config: {0}")]
    Io(#[from] std::io::Error),
}

/// Cycles per simulated instruction when neither the script nor the command
/// line says otherwise.
pub const DEFAULT_STEP_CYCLES: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub step_cycles: u16,
    pub haptics: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            step_cycles: DEFAULT_STEP_CYCLES,
            haptics: false,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("tickpad").join("driver.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("tickpad").join("driver.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("tickpad")
            .join("driver.toml");
    }

    PathBuf::from("driver.toml")
}

pub fn load_from_file(path: &Path) -> DriverConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return DriverConfig::default(),
    };

    match toml::from_str::<DriverConfig>(&text) {
        Ok(cfg) if cfg.step_cycles == 0 => {
            warn!(
                "Driver config {} sets step_cycles = 0; using {DEFAULT_STEP_CYCLES}",
                path.display()
            );
            DriverConfig {
                step_cycles: DEFAULT_STEP_CYCLES,
                ..cfg
            }
        }
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse driver config {}: {e}; using defaults",
                path.display()
            );
            DriverConfig::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &DriverConfig) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}
