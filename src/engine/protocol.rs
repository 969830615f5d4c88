use crate::engine::credential::Credential;
use crate::engine::save_store::SaveInfo;
use crate::engine::session::SessionPhase;
use crate::model::scene::SceneState;

pub enum EngineCommand {
    SetCredential(Credential),
    /// Refresh the main menu's save information.
    QueryMenu,
    NewGame,
    ContinueGame,
    Choose(usize),
    Save,
    ReturnToMenu,
}

/// What the game view needs to draw one frame of the session.
#[derive(Debug, Clone)]
pub struct SceneView {
    pub phase: SessionPhase,
    pub scene: Option<SceneState>,
    pub error: Option<String>,
    pub raw_reply: Option<String>,
    pub turns_in_current_scene: u32,
    pub total_choices: u32,
}

pub enum EngineResponse {
    MenuInfo(Option<SaveInfo>),
    Loading,
    Scene(SceneView),
    /// `Err` carries the text to show next to the save button.
    Saved(Result<(), String>),
    ContinueUnavailable,
    ExitToMenu,
}
