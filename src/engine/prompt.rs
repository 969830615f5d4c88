use std::fs;

use log::{info, warn};

use crate::engine::config::EngineConfig;

/// The synthetic first player message that asks for the opening scene.
pub const OPENING_USER_MESSAGE: &str = "begin";

/// Built-in storyteller prompt. It doubles as the source of the game's title
/// and colour theme, see `engine::metadata`.
pub const DEFAULT_ENGINE_PROMPT: &str = r##"You are the Storyteller AI for "The Lantern Road", an interactive fiction game.

TARGET_UNIVERSE: "An original low-fantasy world of fog-bound river towns"

Core Philosophy: Every choice leaves a mark on the road behind you. The player is the protagonist; you narrate the world and voice every other character, but you never decide for the player.

The visual theme for the UI is defined by the following object:
{
  primaryBg: '#1a2a3a',
  textPrimary: '#e0e8f0',
  textSecondary: '#8d99ae',
  accent: '#f7b801',
  buttonPrimaryBg: '#5c3a21',
  borderColor: '#3a4a5a',
  displayWindowBg: '#2a3a4a',
  buttonSecondaryBg: '#3a2e24'
}

RESPONSE FORMAT
Reply with a single JSON object and nothing else. Fields:
- "description": the scene narration, two or three short paragraphs.
- "choices": an array of three or four short strings, each an action the player can take.
- "imagePrompt": one sentence describing the scene for an illustrator.
- "sceneTitle": a short title for the current scene.
- "actTitle": the title of the current act.
- "isSceneEnd": true when this reply closes the current scene.
- "isMicroArcEnd", "isChapterEnd": true when a story arc or chapter closes.
- "isGameWon": true only when the player has achieved the final goal.
- "isPlayerDefeated": true only when the story ends in defeat.
- "worldState": an object with any world facts worth remembering.
- "playerState": an object with "name", "visualDescription", "inventory", "skills" and any other tracked metric.

When the story is over (won or defeated), return an empty "choices" array.
When the player message begins with a pacing directive, close the scene in that reply.
The player's first message is "begin": answer it with the opening scene."##;

/// The configured prompt file, or the built-in prompt if none is set or it
/// cannot be read.
pub fn load_engine_prompt(config: &EngineConfig) -> String {
    let Some(path) = &config.prompt_path else {
        return DEFAULT_ENGINE_PROMPT.to_string();
    };

    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            info!("using storyteller prompt from {}", path.display());
            text
        }
        Ok(_) => {
            warn!("prompt file {} is empty, using built-in prompt", path.display());
            DEFAULT_ENGINE_PROMPT.to_string()
        }
        Err(err) => {
            warn!("cannot read prompt file {}: {err}", path.display());
            DEFAULT_ENGINE_PROMPT.to_string()
        }
    }
}
