use eframe::egui;
use log::info;

use genesis_engine::engine::config::load_engine_config;
use genesis_engine::engine::metadata::extract_metadata;
use genesis_engine::engine::prompt::load_engine_prompt;
use genesis_engine::ui::app::GenesisApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_engine_config();
    let prompt = load_engine_prompt(&config);
    let metadata = extract_metadata(&prompt);
    info!("starting \"{}\" against {}", metadata.title, config.api_base);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 720.0]),
        ..Default::default()
    };
    let title = metadata.title.clone();

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(GenesisApp::new(&cc.egui_ctx, config, prompt, metadata)))
        }),
    )
}
