use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const RETRY_CHOICE_ID: &str = "retry";
pub const MAIN_MENU_CHOICE_ID: &str = "main-menu";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// One scene as described by the model. Rebuilt from scratch every turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneState {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub choices: Vec<Choice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_title: Option<String>,

    #[serde(default)]
    pub is_scene_end: bool,
    #[serde(default)]
    pub is_micro_arc_end: bool,
    #[serde(default)]
    pub is_chapter_end: bool,
    #[serde(default)]
    pub is_game_won: bool,
    #[serde(default)]
    pub is_player_defeated: bool,

    /// Free-form world facts the model chooses to track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_state: Option<Map<String, Value>>,
    /// Name, inventory, skills and whatever core metric the story uses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_state: Option<Map<String, Value>>,
}

impl SceneState {
    pub fn is_terminal(&self) -> bool {
        self.is_game_won || self.is_player_defeated
    }

    /// Shown after a failed turn so the player can retry or bail out.
    pub fn recovery(message: impl Into<String>) -> Self {
        Self {
            description: message.into(),
            choices: vec![
                Choice::new(RETRY_CHOICE_ID, "Try Again"),
                Choice::new(MAIN_MENU_CHOICE_ID, "Return to Main Menu"),
            ],
            scene_title: Some("Something went wrong".into()),
            ..Default::default()
        }
    }

    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}
