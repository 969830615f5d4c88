use std::sync::mpsc::{Receiver, Sender};

use log::{debug, info, warn};

use crate::engine::config::EngineConfig;
use crate::engine::llm_client::ChatCompletionsClient;
use crate::engine::protocol::{EngineCommand, EngineResponse, SceneView};
use crate::engine::session::{SessionController, TurnOutcome};

/// Runs on its own thread so the UI never blocks on the model.
/// Commands are handled one at a time, in order.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    config: EngineConfig,
    session: SessionController,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        config: EngineConfig,
        session: SessionController,
    ) -> Self {
        Self { rx, tx, config, session }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::SetCredential(credential) => {
                    info!("API key updated");
                    let client = ChatCompletionsClient::new(&self.config, Some(credential));
                    // The check must not block the command loop.
                    let check_client = client.clone();
                    std::thread::spawn(move || match check_client.test_connection() {
                        Ok(status) => info!("{status}"),
                        Err(err) => warn!("connection check failed: {err}"),
                    });
                    self.session.set_model(Box::new(client));
                }

                EngineCommand::QueryMenu => self.send_menu_info(),

                EngineCommand::NewGame => {
                    self.session.reset();
                    self.send(EngineResponse::Loading);
                    let outcome = self.session.start();
                    self.report(outcome);
                }

                EngineCommand::ContinueGame => {
                    self.session.reset();
                    if self.session.continue_saved() {
                        self.send_scene();
                    } else {
                        self.send(EngineResponse::ContinueUnavailable);
                        self.send_menu_info();
                    }
                }

                EngineCommand::Choose(index) => {
                    self.send(EngineResponse::Loading);
                    let outcome = self.session.advance_index(index);
                    self.report(outcome);
                }

                EngineCommand::Save => {
                    let saved = self.session.save().map_err(|err| err.user_message());
                    self.send(EngineResponse::Saved(saved));
                }

                EngineCommand::ReturnToMenu => {
                    self.session.reset();
                    self.send(EngineResponse::ExitToMenu);
                    self.send_menu_info();
                }
            }
        }
        debug!("engine channel closed, worker exiting");
    }

    fn report(&mut self, outcome: TurnOutcome) {
        match outcome {
            TurnOutcome::ExitRequested => {
                self.session.reset();
                self.send(EngineResponse::ExitToMenu);
                self.send_menu_info();
            }
            // Ignored turns still refresh the view so the UI drops its spinner.
            _ => self.send_scene(),
        }
    }

    fn send_scene(&self) {
        let view = SceneView {
            phase: self.session.phase(),
            scene: self.session.current_scene().cloned(),
            error: self.session.last_error().map(str::to_string),
            raw_reply: self.session.last_raw_reply().map(str::to_string),
            turns_in_current_scene: self.session.turns_in_current_scene(),
            total_choices: self.session.total_choices(),
        };
        self.send(EngineResponse::Scene(view));
    }

    fn send_menu_info(&mut self) {
        let info = self.session.save_info();
        self.send(EngineResponse::MenuInfo(info));
    }

    fn send(&self, response: EngineResponse) {
        let _ = self.tx.send(response);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::engine::credential::Credential;
    use crate::engine::llm_client::{ModelError, NarrativeModel};
    use crate::engine::save_store::{MemorySlotStorage, SaveStore};
    use crate::engine::session::SessionPhase;
    use crate::model::message::Message;

    struct FixedModel;

    impl NarrativeModel for FixedModel {
        fn complete(&self, _: &[Message]) -> Result<String, ModelError> {
            Ok(r#"{"description":"Fog.","choices":["Wait"],"sceneTitle":"Pier"}"#.into())
        }
    }

    fn spawn() -> (mpsc::Sender<EngineCommand>, mpsc::Receiver<EngineResponse>) {
        spawn_with(EngineConfig::default())
    }

    fn spawn_with(
        config: EngineConfig,
    ) -> (mpsc::Sender<EngineCommand>, mpsc::Receiver<EngineResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let session = SessionController::new(
            &config,
            "prompt".into(),
            Box::new(FixedModel),
            SaveStore::new(Box::new(MemorySlotStorage::new())),
        );

        std::thread::spawn(move || {
            Engine::new(cmd_rx, resp_tx, config, session).run();
        });
        (cmd_tx, resp_rx)
    }

    fn next_scene(rx: &mpsc::Receiver<EngineResponse>) -> SceneView {
        loop {
            match rx.recv().unwrap() {
                EngineResponse::Scene(view) => return view,
                EngineResponse::Loading => continue,
                _ => panic!("unexpected response"),
            }
        }
    }

    #[test]
    fn new_game_then_choice_then_save() {
        let (tx, rx) = spawn();

        tx.send(EngineCommand::NewGame).unwrap();
        let view = next_scene(&rx);
        assert_eq!(view.phase, SessionPhase::Ready);
        assert_eq!(view.scene.unwrap().description, "Fog.");

        tx.send(EngineCommand::Choose(0)).unwrap();
        let view = next_scene(&rx);
        assert_eq!(view.total_choices, 1);
        assert_eq!(view.turns_in_current_scene, 1);

        tx.send(EngineCommand::Save).unwrap();
        assert!(matches!(rx.recv().unwrap(), EngineResponse::Saved(Ok(()))));

        tx.send(EngineCommand::QueryMenu).unwrap();
        match rx.recv().unwrap() {
            EngineResponse::MenuInfo(Some(info)) => {
                assert_eq!(info.chapter_info, "Chapter 1 - Pier")
            }
            _ => panic!("expected save info"),
        }
    }

    #[test]
    fn new_key_does_not_hold_up_menu() {
        // Non-routable address: a connection check against it would hang.
        let (tx, rx) = spawn_with(EngineConfig {
            api_base: "http://10.255.255.1/v1".into(),
            ..Default::default()
        });

        tx.send(EngineCommand::SetCredential(Credential::parse("sk-test").unwrap()))
            .unwrap();
        tx.send(EngineCommand::QueryMenu).unwrap();

        let resp = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(resp, EngineResponse::MenuInfo(None)));
    }

    #[test]
    fn continue_without_save_reports_unavailable() {
        let (tx, rx) = spawn();

        tx.send(EngineCommand::ContinueGame).unwrap();
        assert!(matches!(rx.recv().unwrap(), EngineResponse::ContinueUnavailable));
        assert!(matches!(rx.recv().unwrap(), EngineResponse::MenuInfo(None)));
    }
}
