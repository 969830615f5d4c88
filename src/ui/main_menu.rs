use chrono::Local;
use eframe::egui;
use egui::RichText;

use super::app::GenesisApp;
use crate::engine::credential::API_KEY_ENV;
use crate::ui::settings_io::save_settings;

/* =========================
   API key
   ========================= */

pub fn draw_api_key_screen(ctx: &egui::Context, app: &mut GenesisApp) {
    let accent = app.palette.accent;
    let secondary = app.palette.text_secondary;

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(RichText::new(&app.metadata.title).size(36.0).color(accent));
            ui.add_space(16.0);

            egui::Frame::group(ui.style())
                .fill(app.palette.display_window_bg)
                .show(ui, |ui| {
                    ui.set_max_width(480.0);
                    ui.label(RichText::new("Getting Started").size(22.0).color(accent));
                    ui.add_space(6.0);
                    ui.label(
                        "This game uses an AI storyteller to create your unique story. \
                         Paste the API key for your text-generation provider below.",
                    );
                    ui.label(
                        RichText::new(format!(
                            "The key is kept in memory for this session only. \
                             You can also set {API_KEY_ENV} before launching."
                        ))
                        .small()
                        .color(secondary),
                    );
                    ui.add_space(10.0);

                    let response = ui.add(
                        egui::TextEdit::singleline(&mut app.ui.api_key_input)
                            .password(true)
                            .hint_text("Paste your key here")
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        app.ui.api_key_error = None;
                    }
                    let entered =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    if let Some(err) = &app.ui.api_key_error {
                        ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                    }

                    ui.add_space(8.0);
                    let begin = ui.add(
                        egui::Button::new(RichText::new("Begin Your Story").size(18.0).strong())
                            .fill(accent)
                            .min_size(egui::vec2(ui.available_width(), 36.0)),
                    );

                    if begin.clicked() || entered {
                        app.submit_api_key();
                    }
                });
        });
    });
}

/* =========================
   Main menu
   ========================= */

pub fn draw_main_menu(ctx: &egui::Context, app: &mut GenesisApp) {
    let accent = app.palette.accent;
    let secondary = app.palette.text_secondary;

    egui::TopBottomPanel::bottom("menu_footer").show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&app.metadata.disclaimer).small().color(secondary));
        });
        ui.horizontal(|ui| {
            ui.label("UI Scale");
            let scale = ui.add(egui::Slider::new(&mut app.settings.ui_scale, 0.75..=2.0));
            let dev = ui.checkbox(&mut app.settings.dev_mode, "Dev Mode");
            if scale.drag_stopped() || dev.changed() {
                save_settings(&app.settings);
            }
        });
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(48.0);
            ui.heading(RichText::new(&app.metadata.title).size(48.0).color(accent));
            ui.add_space(12.0);
            ui.label(RichText::new(&app.metadata.tagline).size(18.0).color(secondary));
            ui.add_space(32.0);

            let new_game = ui.add(
                egui::Button::new(RichText::new("New Game").size(20.0).strong())
                    .fill(accent)
                    .min_size(egui::vec2(220.0, 40.0)),
            );
            if new_game.clicked() {
                app.start_new_game();
            }

            if let Some(info) = app.ui.menu_info.clone() {
                ui.add_space(10.0);
                let cont = ui.add(
                    egui::Button::new(RichText::new("Continue Game").size(18.0))
                        .fill(app.palette.button_primary_bg)
                        .stroke(egui::Stroke::new(1.0, accent))
                        .min_size(egui::vec2(220.0, 36.0)),
                );
                ui.label(RichText::new(&info.chapter_info).small().color(secondary));
                if let Some(saved) = info.last_saved {
                    let date = saved.with_timezone(&Local).format("%Y-%m-%d %H:%M");
                    ui.label(RichText::new(format!("Saved {date}")).small().weak());
                }
                if cont.clicked() {
                    app.continue_game();
                }
            }

            if let Some(notice) = &app.ui.menu_notice {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::LIGHT_RED, notice.as_str());
            }
        });
    });
}
