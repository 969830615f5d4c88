use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::engine::config::app_dir;
use crate::ui::settings::UiSettings;

fn settings_path() -> PathBuf {
    app_dir().join("ui_settings.json")
}

pub fn load_settings() -> UiSettings {
    let path = settings_path();
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_settings(settings: &UiSettings) {
    let path = settings_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(err) = fs::write(&path, json) {
                warn!("could not write {}: {err}", path.display());
            }
        }
        Err(err) => warn!("could not serialize UI settings: {err}"),
    }
}
