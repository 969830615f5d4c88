use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::pacing::DEFAULT_PACING_THRESHOLD;

pub const APP_DIR_NAME: &str = "genesis_engine";
const CONFIG_FILE: &str = "engine_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of an OpenAI-compatible API, without the trailing `/chat/completions`.
    pub api_base: String,
    pub model: String,
    pub temperature: f32,

    /// Turns spent in one scene before the pacing directive is sent.
    pub pacing_threshold: u32,

    /// Replacement storyteller prompt. The built-in one is used when unset.
    pub prompt_path: Option<PathBuf>,
    /// Where save slots live. Defaults to the app config directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:1234/v1".into(),
            model: "local-model".into(),
            temperature: 0.7,
            pacing_threshold: DEFAULT_PACING_THRESHOLD,
            prompt_path: None,
            data_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(app_dir)
    }
}

/// `<config dir>/genesis_engine`, falling back to the working directory.
pub fn app_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR_NAME);
    path
}

pub fn load_engine_config() -> EngineConfig {
    let path = app_dir().join(CONFIG_FILE);
    match read_config(&path) {
        Ok(Some(config)) => {
            info!("loaded engine config from {}", path.display());
            config
        }
        Ok(None) => EngineConfig::default(),
        Err(err) => {
            warn!("ignoring engine config: {err:#}");
            EngineConfig::default()
        }
    }
}

pub fn read_config(path: &Path) -> anyhow::Result<Option<EngineConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(config))
}
