use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::engine::config::EngineConfig;
use crate::engine::error::SessionError;
use crate::engine::llm_client::{ModelError, NarrativeModel};
use crate::engine::logutil::preview;
use crate::engine::pacing::PacingPolicy;
use crate::engine::prompt::OPENING_USER_MESSAGE;
use crate::engine::response_parser::parse_scene;
use crate::engine::save_store::{SaveInfo, SaveStore};
use crate::model::message::{ConversationHistory, Message};
use crate::model::scene::{SceneState, MAIN_MENU_CHOICE_ID, RETRY_CHOICE_ID};
use crate::model::session_snapshot::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing has been generated or loaded yet.
    Uninitialized,
    /// A model request is in flight; choices are locked.
    Loading,
    /// A scene (or a recovery scene) is on screen and choices are open.
    Ready,
    /// The story was won or lost. No more turns.
    Terminal,
}

#[derive(Debug)]
pub enum TurnOutcome {
    /// The request was not valid in the current phase and nothing happened.
    Ignored,
    Ready,
    Terminal,
    /// The turn failed; a recovery scene is showing and the session goes on.
    Failed(SessionError),
    /// The player picked "Return to Main Menu" on a recovery scene.
    ExitRequested,
}

#[derive(Debug, Clone, PartialEq)]
enum TurnKind {
    Opening,
    Choice { player_text: String },
}

/// A turn that has been sent (or is about to be sent) to the model.
#[derive(Debug)]
pub struct TurnRequest {
    kind: TurnKind,
    outgoing: ConversationHistory,
}

impl TurnRequest {
    /// Full conversation for the model, ending with this turn's user message.
    pub fn messages(&self) -> &[Message] {
        self.outgoing.messages()
    }
}

/// Owns one play-through: the conversation, the current scene and the
/// counters that are written to the save slot.
pub struct SessionController {
    pacing: PacingPolicy,
    engine_prompt: String,
    model: Box<dyn NarrativeModel>,
    store: SaveStore,

    phase: SessionPhase,
    scene: Option<SceneState>,
    recovery: Option<SceneState>,
    retry: Option<TurnKind>,
    history: ConversationHistory,
    turns_in_current_scene: u32,
    total_choices: u32,
    session_start_time: DateTime<Utc>,
    last_raw_reply: Option<String>,
}

impl SessionController {
    pub fn new(
        config: &EngineConfig,
        engine_prompt: String,
        model: Box<dyn NarrativeModel>,
        store: SaveStore,
    ) -> Self {
        Self {
            pacing: PacingPolicy::new(config.pacing_threshold),
            engine_prompt,
            model,
            store,
            phase: SessionPhase::Uninitialized,
            scene: None,
            recovery: None,
            retry: None,
            history: ConversationHistory::new(),
            turns_in_current_scene: 0,
            total_choices: 0,
            session_start_time: Utc::now(),
            last_raw_reply: None,
        }
    }

    pub fn set_model(&mut self, model: Box<dyn NarrativeModel>) {
        self.model = model;
    }

    /* =========================
       Turn driving
       ========================= */

    /// Ask the model for the opening scene.
    pub fn start(&mut self) -> TurnOutcome {
        match self.begin_start() {
            Some(request) => self.run(request),
            None => TurnOutcome::Ignored,
        }
    }

    /// Play `choice_text` as the player's next move.
    pub fn advance(&mut self, choice_text: &str) -> TurnOutcome {
        match self.begin_turn(choice_text) {
            Some(request) => self.run(request),
            None => TurnOutcome::Ignored,
        }
    }

    /// Play the choice at `index` of the scene on screen. On a recovery scene
    /// this retries the failed turn or asks to leave.
    pub fn advance_index(&mut self, index: usize) -> TurnOutcome {
        if self.phase != SessionPhase::Ready {
            return TurnOutcome::Ignored;
        }
        let Some(choice) = self.current_scene().and_then(|s| s.choice(index)).cloned() else {
            debug!("choice {index} does not exist, ignoring");
            return TurnOutcome::Ignored;
        };

        if self.recovery.is_some() {
            match choice.id.as_str() {
                RETRY_CHOICE_ID => return self.retry(),
                MAIN_MENU_CHOICE_ID => return TurnOutcome::ExitRequested,
                _ => {}
            }
        }

        self.advance(&choice.text)
    }

    fn retry(&mut self) -> TurnOutcome {
        match self.retry.clone() {
            Some(TurnKind::Opening) => self.start(),
            Some(TurnKind::Choice { player_text }) => match self.begin_choice(&player_text) {
                Some(request) => self.run(request),
                None => TurnOutcome::Ignored,
            },
            None => TurnOutcome::Ignored,
        }
    }

    fn run(&mut self, request: TurnRequest) -> TurnOutcome {
        let result = self.model.complete(request.messages());
        self.complete_turn(request, result)
    }

    /// First half of `start`: locks the session and builds the opening request.
    /// Returns `None` once the story has begun.
    pub fn begin_start(&mut self) -> Option<TurnRequest> {
        let failed_opening =
            self.phase == SessionPhase::Ready && self.retry == Some(TurnKind::Opening);
        if self.phase != SessionPhase::Uninitialized && !failed_opening {
            debug!("start ignored in phase {:?}", self.phase);
            return None;
        }

        self.session_start_time = Utc::now();
        self.phase = SessionPhase::Loading;

        let outgoing = ConversationHistory::new()
            .append(Message::system(self.engine_prompt.clone()))
            .append(Message::user(OPENING_USER_MESSAGE));

        Some(TurnRequest { kind: TurnKind::Opening, outgoing })
    }

    /// First half of `advance`: locks the session and builds the request,
    /// adding the pacing directive when the scene has run long.
    /// Returns `None` unless the session is `Ready` on a scene from the model;
    /// a recovery scene only answers to `advance_index`.
    pub fn begin_turn(&mut self, choice_text: &str) -> Option<TurnRequest> {
        if self.recovery.is_some() {
            debug!("choice {choice_text:?} ignored on a recovery scene");
            return None;
        }
        self.begin_choice(choice_text)
    }

    fn begin_choice(&mut self, choice_text: &str) -> Option<TurnRequest> {
        if self.phase != SessionPhase::Ready {
            debug!("choice ignored in phase {:?}", self.phase);
            return None;
        }
        if self.scene.is_none() {
            debug!("choice ignored before the opening scene");
            return None;
        }

        if self.pacing.should_inject_directive(self.turns_in_current_scene) {
            info!(
                "pacing directive injected after {} turns (threshold {})",
                self.turns_in_current_scene,
                self.pacing.threshold()
            );
        }
        let content = self.pacing.apply(self.turns_in_current_scene, choice_text);

        self.phase = SessionPhase::Loading;
        Some(TurnRequest {
            kind: TurnKind::Choice { player_text: choice_text.to_string() },
            outgoing: self.history.append(Message::user(content)),
        })
    }

    /// Second half of a turn: feed the model's answer back in.
    pub fn complete_turn(
        &mut self,
        request: TurnRequest,
        result: Result<String, ModelError>,
    ) -> TurnOutcome {
        if self.phase != SessionPhase::Loading {
            warn!("dropping model reply received in phase {:?}", self.phase);
            return TurnOutcome::Ignored;
        }

        let parsed = result.map_err(SessionError::from).and_then(|raw| {
            debug!("model reply: {}", preview(&raw));
            self.last_raw_reply = Some(raw.clone());
            let scene = parse_scene(&raw)?;
            Ok((raw, scene))
        });

        match parsed {
            Ok((raw, scene)) => self.apply_scene(request, raw, scene),
            Err(err) => self.fail(request.kind, err),
        }
    }

    fn apply_scene(&mut self, request: TurnRequest, raw: String, scene: SceneState) -> TurnOutcome {
        match request.kind {
            TurnKind::Opening => {
                // Only [system, "begin"] is kept. The opening reply lives on as
                // `self.scene`, so the next request does not show the model the
                // text it opened with.
                self.history = request.outgoing;
                self.turns_in_current_scene = 0;
            }
            TurnKind::Choice { .. } => {
                self.history = request.outgoing.append(Message::assistant(raw));
                self.turns_in_current_scene = if scene.is_scene_end {
                    0
                } else {
                    self.turns_in_current_scene + 1
                };
                self.total_choices += 1;
            }
        }

        self.recovery = None;
        self.retry = None;

        let terminal = scene.is_terminal();
        info!(
            "scene {:?}: {} choices, {} turns in scene, {} total",
            scene.scene_title.as_deref().unwrap_or("untitled"),
            scene.choices.len(),
            self.turns_in_current_scene,
            self.total_choices
        );
        self.scene = Some(scene);

        if terminal {
            info!("story finished, clearing save slot");
            self.store.delete();
            self.phase = SessionPhase::Terminal;
            TurnOutcome::Terminal
        } else {
            self.phase = SessionPhase::Ready;
            TurnOutcome::Ready
        }
    }

    fn fail(&mut self, kind: TurnKind, err: SessionError) -> TurnOutcome {
        warn!("turn failed: {err}");
        if let SessionError::MalformedResponse(parse) = &err {
            debug!("unparsable reply: {}", preview(parse.raw()));
        }
        self.recovery = Some(SceneState::recovery(err.user_message()));
        self.retry = Some(kind);
        self.phase = SessionPhase::Ready;
        TurnOutcome::Failed(err)
    }

    /* =========================
       Save / continue
       ========================= */

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let scene = self.scene.clone()?;
        Some(SessionSnapshot {
            game_state: scene,
            conversation_history: self.history.clone(),
            turns_in_current_scene: self.turns_in_current_scene,
            total_choices: self.total_choices,
            session_start_time: self.session_start_time,
            save_version: 0,
            last_saved: None,
        })
    }

    /// Write the current session to the save slot. Only possible while `Ready`
    /// with a scene from the model.
    pub fn save(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Ready {
            debug!("save refused in phase {:?}", self.phase);
            return Err(SessionError::NothingToSave);
        }
        let snapshot = self.snapshot().ok_or(SessionError::NothingToSave)?;
        if self.store.save(&snapshot) {
            Ok(())
        } else {
            Err(SessionError::StorageUnavailable)
        }
    }

    /// Resume from `snapshot`, skipping the opening request. A finished story
    /// lands in `Terminal` and its slot is cleared.
    pub fn load_from_snapshot(&mut self, snapshot: SessionSnapshot) -> bool {
        if self.phase != SessionPhase::Uninitialized {
            warn!("cannot load a save into a running session");
            return false;
        }

        self.history = snapshot.conversation_history;
        self.turns_in_current_scene = snapshot.turns_in_current_scene;
        self.total_choices = snapshot.total_choices;
        self.session_start_time = snapshot.session_start_time;
        self.phase = if snapshot.game_state.is_terminal() {
            info!("save holds a finished story, clearing save slot");
            self.store.delete();
            SessionPhase::Terminal
        } else {
            SessionPhase::Ready
        };
        self.scene = Some(snapshot.game_state);
        info!(
            "resumed session with {} messages and {} choices",
            self.history.len(),
            self.total_choices
        );
        true
    }

    /// Load the save slot and resume from it.
    pub fn continue_saved(&mut self) -> bool {
        match self.store.load() {
            Some(snapshot) => self.load_from_snapshot(snapshot),
            None => false,
        }
    }

    pub fn has_save(&self) -> bool {
        self.store.exists()
    }

    pub fn save_info(&mut self) -> Option<SaveInfo> {
        self.store.save_info()
    }

    /// Drop the current play-through and go back to `Uninitialized`.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Uninitialized;
        self.scene = None;
        self.recovery = None;
        self.retry = None;
        self.history = ConversationHistory::new();
        self.turns_in_current_scene = 0;
        self.total_choices = 0;
        self.session_start_time = Utc::now();
        self.last_raw_reply = None;
    }

    /* =========================
       Accessors
       ========================= */

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The scene to show: the recovery scene after a failure, otherwise the
    /// latest scene from the model.
    pub fn current_scene(&self) -> Option<&SceneState> {
        self.recovery.as_ref().or(self.scene.as_ref())
    }

    /// Latest scene produced by the model, ignoring any recovery scene.
    pub fn story_scene(&self) -> Option<&SceneState> {
        self.scene.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.recovery.as_ref().map(|s| s.description.as_str())
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn turns_in_current_scene(&self) -> u32 {
        self.turns_in_current_scene
    }

    pub fn total_choices(&self) -> u32 {
        self.total_choices
    }

    pub fn session_start_time(&self) -> DateTime<Utc> {
        self.session_start_time
    }

    pub fn last_raw_reply(&self) -> Option<&str> {
        self.last_raw_reply.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::engine::save_store::{MemorySlotStorage, SlotStorage, SAVE_KEY};
    use crate::model::message::Role;
    use crate::model::scene::Choice;

    type Sent = Arc<Mutex<Vec<Vec<Message>>>>;

    /// Replays canned replies and records every conversation it was sent.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, ModelError>>>,
        sent: Sent,
    }

    impl NarrativeModel for ScriptedModel {
        fn complete(&self, messages: &[Message]) -> Result<String, ModelError> {
            self.sent.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(scene_json("More road.", false)))
        }
    }

    fn scene_json(description: &str, scene_end: bool) -> String {
        format!(
            r#"{{"description":"{description}","choices":["Left","Right"],"sceneTitle":"Road","isSceneEnd":{scene_end}}}"#
        )
    }

    fn controller(
        replies: Vec<Result<String, ModelError>>,
    ) -> (SessionController, Sent, MemorySlotStorage) {
        let sent: Sent = Arc::default();
        let model = ScriptedModel { replies: Mutex::new(replies.into()), sent: sent.clone() };
        let storage = MemorySlotStorage::new();
        let controller = SessionController::new(
            &EngineConfig::default(),
            "You are the Storyteller AI for \"Test\"".into(),
            Box::new(model),
            SaveStore::new(Box::new(storage.clone())),
        );
        (controller, sent, storage)
    }

    #[test]
    fn start_seeds_system_and_begin() {
        let (mut session, sent, _) = controller(vec![]);

        assert!(matches!(session.start(), TurnOutcome::Ready));
        assert_eq!(session.phase(), SessionPhase::Ready);

        let first = &sent.lock().unwrap()[0];
        assert_eq!(first[0].role, Role::System);
        assert_eq!(first[1], Message::user("begin"));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.current_scene().unwrap().choices.len(), 2);

        assert!(matches!(session.start(), TurnOutcome::Ignored));
    }

    #[test]
    fn history_grows_by_two_per_turn() {
        let (mut session, _, _) = controller(vec![]);
        session.start();

        for n in 1..=4 {
            assert!(matches!(session.advance("Left"), TurnOutcome::Ready));
            assert_eq!(session.history().len(), 2 + 2 * n);
        }
        let last = session.history().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(session.total_choices(), 4);
    }

    #[test]
    fn scene_counter_resets_only_on_scene_end() {
        let (mut session, _, _) = controller(vec![
            Ok(scene_json("Opening", false)),
            Ok(scene_json("a", false)),
            Ok(scene_json("b", false)),
            Ok(scene_json("c", true)),
            Ok(scene_json("d", false)),
        ]);
        session.start();
        assert_eq!(session.turns_in_current_scene(), 0);

        let expected = [1, 2, 0, 1];
        for want in expected {
            session.advance("Right");
            assert_eq!(session.turns_in_current_scene(), want);
        }
    }

    #[test]
    fn pacing_directive_prefixes_outgoing_message() {
        let (mut session, sent, _) = controller(vec![]);
        session.start();
        for _ in 0..3 {
            session.advance("Wait");
        }
        assert_eq!(session.turns_in_current_scene(), 3);

        session.advance("Open door");

        let sent = sent.lock().unwrap();
        let outgoing = sent.last().unwrap().last().unwrap();
        assert_eq!(outgoing.role, Role::User);
        assert!(outgoing.content.starts_with("[URGENT PACING DIRECTIVE:"));
        assert!(outgoing.content.ends_with("\nOpen door"));
    }

    #[test]
    fn below_threshold_sends_plain_choice() {
        let (mut session, sent, _) = controller(vec![]);
        session.start();
        session.advance("Open door");

        let sent = sent.lock().unwrap();
        assert_eq!(sent.last().unwrap().last().unwrap().content, "Open door");
    }

    #[test]
    fn second_turn_while_loading_is_ignored() {
        let (mut session, sent, _) = controller(vec![]);
        session.start();

        let request = session.begin_turn("Left").unwrap();
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.begin_turn("Right").is_none());
        assert!(matches!(session.advance("Right"), TurnOutcome::Ignored));
        assert!(session.save().is_err());

        let outcome = session.complete_turn(request, Ok(scene_json("x", false)));
        assert!(matches!(outcome, TurnOutcome::Ready));
        assert_eq!(session.total_choices(), 1);
        // Only the opening request reached the model.
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn win_deletes_save_and_locks_session() {
        let (mut session, sent, storage) = controller(vec![
            Ok(scene_json("Opening", false)),
            Ok(r#"{"description":"You made it.","choices":[],"isGameWon":true}"#.into()),
        ]);
        session.start();
        assert!(session.save().is_ok());
        assert!(storage.read(SAVE_KEY).unwrap().is_some());

        assert!(matches!(session.advance("Cross the bridge"), TurnOutcome::Terminal));
        assert_eq!(session.phase(), SessionPhase::Terminal);
        assert!(storage.read(SAVE_KEY).unwrap().is_none());

        assert!(matches!(session.advance("Again"), TurnOutcome::Ignored));
        assert!(session.save().is_err());
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn failed_turn_is_recoverable_and_not_counted() {
        let (mut session, sent, _) = controller(vec![
            Ok(scene_json("Opening", false)),
            Err(ModelError::RateLimited),
            Ok("not json at all".into()),
            Ok(scene_json("Recovered", false)),
        ]);
        session.start();

        let outcome = session.advance("Left");
        assert!(matches!(outcome, TurnOutcome::Failed(SessionError::TransportFailure(_))));
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.last_error(), Some("Rate limit exceeded. Please wait a moment."));
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.total_choices(), 0);
        assert_eq!(session.turns_in_current_scene(), 0);
        // The real scene survives behind the recovery scene.
        assert_eq!(session.story_scene().unwrap().description, "Opening");

        // "Try Again" resends the same choice; this time the reply is garbage.
        let outcome = session.advance_index(0);
        assert!(matches!(outcome, TurnOutcome::Failed(SessionError::MalformedResponse(_))));
        assert_eq!(session.last_raw_reply(), Some("not json at all"));

        assert!(matches!(session.advance_index(0), TurnOutcome::Ready));
        assert!(session.last_error().is_none());
        assert_eq!(session.total_choices(), 1);
        assert_eq!(session.history().len(), 4);

        let sent = sent.lock().unwrap();
        assert_eq!(sent[1].last().unwrap().content, "Left");
        assert_eq!(sent[3].last().unwrap().content, "Left");
    }

    #[test]
    fn missing_credential_is_reported_without_ending_session() {
        let (mut session, _, _) = controller(vec![Err(ModelError::MissingCredential)]);

        let outcome = session.start();
        assert!(matches!(outcome, TurnOutcome::Failed(SessionError::MissingCredential)));
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert!(session.history().is_empty());
        assert!(session.snapshot().is_none());

        // Retrying the opening turn runs `start` again.
        assert!(matches!(session.advance_index(0), TurnOutcome::Ready));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn free_text_before_opening_scene_is_ignored() {
        let (mut session, sent, _) = controller(vec![Err(ModelError::RateLimited)]);
        session.start();

        assert!(matches!(session.advance("Look around"), TurnOutcome::Ignored));
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert!(session.history().is_empty());
        assert_eq!(session.total_choices(), 0);
        assert_eq!(sent.lock().unwrap().len(), 1);

        // The retry button still reopens the story with the system prompt.
        assert!(matches!(session.advance_index(0), TurnOutcome::Ready));
        let sent = sent.lock().unwrap();
        assert_eq!(sent[1][0].role, Role::System);
        assert_eq!(sent[1][1], Message::user("begin"));
    }

    #[test]
    fn recovery_scene_ignores_free_text() {
        let (mut session, sent, _) = controller(vec![
            Ok(scene_json("Opening", false)),
            Err(ModelError::RateLimited),
        ]);
        session.start();
        session.advance("Left");

        assert!(matches!(session.advance("Try Again"), TurnOutcome::Ignored));
        assert!(session.begin_turn("Return to Main Menu").is_none());
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(sent.lock().unwrap().len(), 2);

        assert!(matches!(session.advance_index(0), TurnOutcome::Ready));
        let sent = sent.lock().unwrap();
        assert_eq!(sent[2].last().unwrap().content, "Left");
        assert_eq!(session.history().len(), 4);
    }

    #[test]
    fn finished_save_loads_as_terminal() {
        let (mut session, sent, storage) = controller(vec![]);
        let mut slot = storage.clone();
        slot.write(SAVE_KEY, "{}").unwrap();

        let snapshot = SessionSnapshot {
            game_state: SceneState {
                description: "The road ends at the sea.".into(),
                choices: vec![Choice::new("choice-0", "Walk on")],
                is_game_won: true,
                ..Default::default()
            },
            conversation_history: ConversationHistory::new()
                .append(Message::system("prompt"))
                .append(Message::user("begin")),
            turns_in_current_scene: 1,
            total_choices: 9,
            session_start_time: Utc::now(),
            save_version: 1,
            last_saved: None,
        };

        assert!(session.load_from_snapshot(snapshot));
        assert_eq!(session.phase(), SessionPhase::Terminal);
        assert!(storage.read(SAVE_KEY).unwrap().is_none());

        assert!(matches!(session.advance("Again"), TurnOutcome::Ignored));
        assert!(matches!(session.advance_index(0), TurnOutcome::Ignored));
        assert!(matches!(session.save(), Err(SessionError::NothingToSave)));
        assert!(sent.lock().unwrap().is_empty());
    }

    struct ReadOnlySlots;

    impl SlotStorage for ReadOnlySlots {
        fn read(&self, _: &str) -> io::Result<Option<String>> {
            Ok(None)
        }
        fn write(&mut self, _: &str, _: &str) -> io::Result<()> {
            Err(io::Error::other("read-only volume"))
        }
        fn remove(&mut self, _: &str) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn save_reports_why_it_failed() {
        let sent: Sent = Arc::default();
        let model = ScriptedModel { replies: Mutex::new(VecDeque::new()), sent };
        let mut session = SessionController::new(
            &EngineConfig::default(),
            "prompt".into(),
            Box::new(model),
            SaveStore::new(Box::new(ReadOnlySlots)),
        );

        assert!(matches!(session.save(), Err(SessionError::NothingToSave)));

        session.start();
        let err = session.save().unwrap_err();
        assert!(matches!(err, SessionError::StorageUnavailable));
        assert_eq!(
            err.user_message(),
            "Saving is unavailable right now. Your story continues."
        );
        assert_eq!(session.phase(), SessionPhase::Ready);
    }

    #[test]
    fn main_menu_choice_requests_exit() {
        let (mut session, _, _) = controller(vec![Err(ModelError::RateLimited)]);
        session.start();

        assert!(matches!(session.advance_index(1), TurnOutcome::ExitRequested));
        assert!(matches!(session.advance_index(7), TurnOutcome::Ignored));
    }

    #[test]
    fn snapshot_restores_counters_verbatim() {
        let (mut first, _, storage) = controller(vec![]);
        first.start();
        first.advance("Left");
        first.advance("Right");
        assert!(first.save().is_ok());

        let (mut second, sent, _) = controller(vec![]);
        let mut store = SaveStore::new(Box::new(storage));
        let snapshot = store.load().unwrap();
        assert!(second.load_from_snapshot(snapshot));

        assert_eq!(second.phase(), SessionPhase::Ready);
        assert_eq!(second.total_choices(), 2);
        assert_eq!(second.turns_in_current_scene(), first.turns_in_current_scene());
        assert_eq!(second.history(), first.history());
        assert_eq!(
            second.session_start_time().timestamp_millis(),
            first.session_start_time().timestamp_millis()
        );
        assert!(sent.lock().unwrap().is_empty());

        // A running session cannot be overwritten by a save.
        let again = first.snapshot().unwrap();
        assert!(!second.load_from_snapshot(again));
    }

    #[test]
    fn continue_saved_without_save_stays_uninitialized() {
        let (mut session, _, _) = controller(vec![]);

        assert!(!session.has_save());
        assert!(!session.continue_saved());
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
    }

    #[test]
    fn reset_allows_a_new_story() {
        let (mut session, _, _) = controller(vec![]);
        session.start();
        session.advance("Left");

        session.reset();
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert!(matches!(session.start(), TurnOutcome::Ready));
        assert_eq!(session.total_choices(), 0);
    }
}
