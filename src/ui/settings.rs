use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    /// Shows the raw model reply under the scene.
    pub dev_mode: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            dev_mode: false,
        }
    }
}

impl UiSettings {
    pub fn clamped_scale(&self) -> f32 {
        self.ui_scale.clamp(0.75, 2.0)
    }
}
