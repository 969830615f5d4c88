use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::message::ConversationHistory;
use crate::model::scene::SceneState;

/// Everything needed to resume a session. Written to the single save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub game_state: SceneState,
    pub conversation_history: ConversationHistory,
    pub turns_in_current_scene: u32,
    pub total_choices: u32,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub session_start_time: DateTime<Utc>,

    /// Stamped by the save store; zero until the snapshot has been written.
    #[serde(default)]
    pub save_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// "Act - Scene" line shown next to the continue button.
    pub fn chapter_info(&self) -> String {
        format!(
            "{} - {}",
            self.game_state.act_title.as_deref().unwrap_or("Chapter 1"),
            self.game_state.scene_title.as_deref().unwrap_or("Unknown Scene"),
        )
    }
}
