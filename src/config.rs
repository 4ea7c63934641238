use anyhow::{Context, Result};
use directories::ProjectDirs;
use fingerset_engine::Operation;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(
        option_env!("FINGERSET_CONFIG_PATH").unwrap_or("/usr/local/etc/fingerset/config.toml"),
    )
});

/// Default location of the packed template set.
pub static SNAPSHOT_PATH: Lazy<PathBuf> = Lazy::new(|| {
    if let Some(path) = option_env!("FINGERSET_SNAPSHOT_PATH") {
        return PathBuf::from(path);
    }
    ProjectDirs::from("", "", "fingerset")
        .map(|dirs| dirs.data_dir().join("templates.bin"))
        .unwrap_or_else(|| PathBuf::from("/usr/local/var/fingerset/templates.bin"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transport passed to device enumeration.
    pub transport: String,
    /// Device index to use when more than one is found.
    pub device: Option<usize>,
    /// How long interactive operations wait for a finger.
    pub timeout_ms: u64,
    pub low_latency_callback: bool,
    /// Directory scanned for template files.
    pub enroll_dir: PathBuf,
    pub template_extension: String,
    /// Template whose payload the simulated sensor reports as the finger.
    pub probe: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: "usb".to_string(),
            device: None,
            timeout_ms: 60_000,
            low_latency_callback: true,
            enroll_dir: PathBuf::from("./Enrolling"),
            template_extension: "fing".to_string(),
            probe: None,
        }
    }
}

impl Config {
    pub fn operation(&self) -> Operation {
        Operation {
            timeout: Duration::from_millis(self.timeout_ms),
            low_latency_callback: self.low_latency_callback,
            ..Operation::default()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
