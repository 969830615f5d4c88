use std::sync::mpsc;
use std::time::{Duration, Instant};

use eframe::egui;
use log::info;

use crate::engine::config::EngineConfig;
use crate::engine::credential::Credential;
use crate::engine::engine::Engine;
use crate::engine::llm_client::ChatCompletionsClient;
use crate::engine::metadata::GameMetadata;
use crate::engine::protocol::{EngineCommand, EngineResponse, SceneView};
use crate::engine::save_store::{FileSlotStorage, SaveInfo, SaveStore};
use crate::engine::session::SessionController;
use crate::ui::game_view::draw_game_view;
use crate::ui::main_menu::{draw_api_key_screen, draw_main_menu};
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::load_settings;
use crate::ui::theme::Palette;

pub(crate) const SAVE_CONFIRMATION: Duration = Duration::from_secs(2);

/* =========================
   UI State
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Screen {
    #[default]
    ApiKey,
    MainMenu,
    Game,
}

#[derive(Default)]
pub(crate) struct UiState {
    pub screen: Screen,

    pub api_key_input: String,
    pub api_key_error: Option<String>,

    pub menu_info: Option<SaveInfo>,
    pub menu_notice: Option<String>,

    pub view: Option<SceneView>,
    /// Set the moment a command that talks to the model is sent, so choices
    /// lock before the engine even answers.
    pub loading: bool,
    pub saved_at: Option<Instant>,
    pub save_error: Option<String>,
}

/* =========================
   App
   ========================= */

pub struct GenesisApp {
    pub(crate) ui: UiState,
    pub(crate) settings: UiSettings,
    pub(crate) metadata: GameMetadata,
    pub(crate) palette: Palette,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl GenesisApp {
    pub fn new(
        ctx: &egui::Context,
        config: EngineConfig,
        engine_prompt: String,
        metadata: GameMetadata,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let credential = Credential::from_env();
        let has_credential = credential.is_some();

        let client = ChatCompletionsClient::new(&config, credential);
        let store = SaveStore::new(Box::new(FileSlotStorage::new(config.data_dir())));
        let session = SessionController::new(&config, engine_prompt, Box::new(client), store);

        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, config, session);
            engine.run();
        });

        let palette = Palette::from_theme(&metadata.theme);
        palette.apply(ctx);

        let mut app = Self {
            ui: UiState::default(),
            settings: load_settings(),
            palette,
            metadata,
            cmd_tx,
            resp_rx,
        };

        if has_credential {
            info!("using API key from environment");
            app.ui.screen = Screen::MainMenu;
            app.send_command(EngineCommand::QueryMenu);
        }
        app
    }

    pub(crate) fn send_command(&self, cmd: EngineCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// Send a command that will hit the model and lock the choices meanwhile.
    pub(crate) fn send_turn_command(&mut self, cmd: EngineCommand) {
        if self.ui.loading {
            return;
        }
        self.ui.loading = true;
        self.send_command(cmd);
    }

    pub(crate) fn submit_api_key(&mut self) {
        match Credential::parse(&self.ui.api_key_input) {
            Ok(credential) => {
                self.send_command(EngineCommand::SetCredential(credential));
                self.send_command(EngineCommand::QueryMenu);
                self.ui.api_key_input.clear();
                self.ui.api_key_error = None;
                self.ui.screen = Screen::MainMenu;
            }
            Err(err) => self.ui.api_key_error = Some(err.to_string()),
        }
    }

    pub(crate) fn start_new_game(&mut self) {
        self.ui.view = None;
        self.ui.menu_notice = None;
        self.ui.screen = Screen::Game;
        self.send_turn_command(EngineCommand::NewGame);
    }

    pub(crate) fn continue_game(&mut self) {
        self.ui.view = None;
        self.ui.menu_notice = None;
        self.ui.screen = Screen::Game;
        self.send_turn_command(EngineCommand::ContinueGame);
    }

    pub(crate) fn choose(&mut self, index: usize) {
        self.send_turn_command(EngineCommand::Choose(index));
    }

    pub(crate) fn save_game(&mut self) {
        self.send_command(EngineCommand::Save);
    }

    pub(crate) fn return_to_menu(&mut self) {
        self.send_command(EngineCommand::ReturnToMenu);
    }

    fn handle_response(&mut self, resp: EngineResponse) {
        match resp {
            EngineResponse::MenuInfo(info) => self.ui.menu_info = info,
            EngineResponse::Loading => self.ui.loading = true,
            EngineResponse::Scene(view) => {
                self.ui.view = Some(view);
                self.ui.loading = false;
            }
            EngineResponse::Saved(result) => {
                self.ui.save_error = result.err();
                self.ui.saved_at = Some(Instant::now());
            }
            EngineResponse::ContinueUnavailable => {
                self.ui.loading = false;
                self.ui.screen = Screen::MainMenu;
                self.ui.menu_notice = Some("No saved game could be loaded.".into());
            }
            EngineResponse::ExitToMenu => {
                self.ui.loading = false;
                self.ui.view = None;
                self.ui.screen = Screen::MainMenu;
            }
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for GenesisApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.clamped_scale());

        while let Ok(resp) = self.resp_rx.try_recv() {
            self.handle_response(resp);
        }

        match self.ui.screen {
            Screen::ApiKey => draw_api_key_screen(ctx, self),
            Screen::MainMenu => draw_main_menu(ctx, self),
            Screen::Game => draw_game_view(ctx, self),
        }

        // The worker thread cannot wake egui, so poll while waiting on it.
        if self.ui.loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if self.ui.saved_at.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }
}
