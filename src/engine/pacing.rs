//! Scene pacing: nudges the model to wrap a scene up after too many turns.

pub const DEFAULT_PACING_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    threshold: u32,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_THRESHOLD)
    }
}

impl PacingPolicy {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn should_inject_directive(&self, turns_in_current_scene: u32) -> bool {
        turns_in_current_scene >= self.threshold
    }

    /// The outgoing user message, prefixed with the directive when the scene
    /// has dragged on long enough.
    pub fn apply(&self, turns_in_current_scene: u32, player_text: &str) -> String {
        if self.should_inject_directive(turns_in_current_scene) {
            format!("{}\n{}", directive(turns_in_current_scene), player_text)
        } else {
            player_text.to_string()
        }
    }
}

pub fn directive(turns_in_current_scene: u32) -> String {
    format!(
        "[URGENT PACING DIRECTIVE: The player has been in this scene for {turns_in_current_scene} turns. \
         You MUST trigger 'isSceneEnd: true' in your next response.]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_at_and_after_threshold() {
        let policy = PacingPolicy::new(3);

        assert!(!policy.should_inject_directive(0));
        assert!(!policy.should_inject_directive(2));
        assert!(policy.should_inject_directive(3));
        assert!(policy.should_inject_directive(7));
    }

    #[test]
    fn apply_prefixes_directive_on_its_own_line() {
        let policy = PacingPolicy::default();

        assert_eq!(policy.apply(1, "Open door"), "Open door");

        let nudged = policy.apply(3, "Open door");
        assert!(nudged.starts_with("[URGENT PACING DIRECTIVE: The player has been in this scene for 3 turns."));
        assert!(nudged.ends_with("]\nOpen door"));
    }

    #[test]
    fn zero_threshold_always_fires() {
        assert!(PacingPolicy::new(0).should_inject_directive(0));
    }
}
