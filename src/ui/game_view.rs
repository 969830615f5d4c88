use eframe::egui;
use egui::RichText;

use super::app::{GenesisApp, SAVE_CONFIRMATION};
use crate::engine::session::SessionPhase;
use crate::model::scene::SceneState;
use crate::ui::settings_io::save_settings;

pub fn draw_game_view(ctx: &egui::Context, app: &mut GenesisApp) {
    draw_footer(ctx, app);

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.set_max_width(760.0);

            let Some(view) = app.ui.view.clone() else {
                loading_placeholder(ui, "The story is being written…");
                return;
            };
            let Some(scene) = &view.scene else {
                loading_placeholder(ui, "The story is being written…");
                return;
            };

            draw_scene(ui, app, scene);
            ui.add_space(12.0);

            if view.phase == SessionPhase::Terminal {
                draw_ending(ui, app, scene);
            } else if app.ui.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("The storyteller is thinking…").italics());
                });
            } else {
                draw_choices(ui, app, scene, view.phase == SessionPhase::Ready);
            }

            if app.settings.dev_mode {
                ui.add_space(16.0);
                draw_dev_panel(ui, scene, view.raw_reply.as_deref(), view.turns_in_current_scene);
            }
        });
    });
}

fn loading_placeholder(ui: &mut egui::Ui, text: &str) {
    ui.add_space(40.0);
    ui.vertical_centered(|ui| {
        ui.spinner();
        ui.label(text);
    });
}

fn draw_scene(ui: &mut egui::Ui, app: &GenesisApp, scene: &SceneState) {
    egui::Frame::group(ui.style())
        .fill(app.palette.display_window_bg)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());

            if let Some(title) = &scene.scene_title {
                ui.heading(RichText::new(title.as_str()).color(app.palette.accent));
            }
            if let Some(image) = &scene.image_prompt {
                ui.label(
                    RichText::new(format!("🖼 {image}"))
                        .italics()
                        .color(app.palette.text_secondary),
                );
            }
            ui.add_space(6.0);
            ui.label(RichText::new(scene.description.as_str()).size(16.0));
        });
}

fn draw_choices(ui: &mut egui::Ui, app: &mut GenesisApp, scene: &SceneState, enabled: bool) {
    let mut picked = None;

    for (index, choice) in scene.choices.iter().enumerate() {
        let label = RichText::new(format!("{}. {}", index + 1, choice.text)).size(16.0);
        let button = egui::Button::new(label)
            .fill(app.palette.button_primary_bg)
            .min_size(egui::vec2(ui.available_width(), 32.0));

        if ui.add_enabled(enabled, button).clicked() {
            picked = Some(index);
        }
    }

    // Number keys pick choices too.
    if enabled && picked.is_none() {
        const KEYS: [egui::Key; 9] = [
            egui::Key::Num1,
            egui::Key::Num2,
            egui::Key::Num3,
            egui::Key::Num4,
            egui::Key::Num5,
            egui::Key::Num6,
            egui::Key::Num7,
            egui::Key::Num8,
            egui::Key::Num9,
        ];
        picked = KEYS
            .iter()
            .take(scene.choices.len())
            .position(|key| ui.input(|i| i.key_pressed(*key)));
    }

    if let Some(index) = picked {
        app.choose(index);
    }
}

fn draw_ending(ui: &mut egui::Ui, app: &mut GenesisApp, scene: &SceneState) {
    let (headline, color) = if scene.is_game_won {
        ("Victory", app.palette.accent)
    } else {
        ("Your story ends here", egui::Color32::LIGHT_RED)
    };

    ui.vertical_centered(|ui| {
        ui.heading(RichText::new(headline).size(28.0).color(color));
        ui.add_space(8.0);
        if ui.button("Return to Main Menu").clicked() {
            app.return_to_menu();
        }
    });
}

fn draw_dev_panel(ui: &mut egui::Ui, scene: &SceneState, raw: Option<&str>, turns: u32) {
    ui.collapsing("Dev Mode", |ui| {
        ui.label(format!("Turns in current scene: {turns}"));
        ui.label("Parsed scene:");
        let pretty = serde_json::to_string_pretty(scene).unwrap_or_default();
        ui.monospace(pretty);
        if let Some(raw) = raw {
            ui.separator();
            ui.label("Raw model reply:");
            ui.monospace(raw);
        }
    });
}

fn draw_footer(ctx: &egui::Context, app: &mut GenesisApp) {
    let (act, scene_title) = app
        .ui
        .view
        .as_ref()
        .and_then(|v| v.scene.as_ref())
        .map(|s| {
            (
                s.act_title.clone().unwrap_or_else(|| "Chapter 1".into()),
                s.scene_title.clone().unwrap_or_default(),
            )
        })
        .unwrap_or_default();

    let can_save = !app.ui.loading
        && app.ui.view.as_ref().map(|v| v.phase) == Some(SessionPhase::Ready);

    egui::TopBottomPanel::bottom("game_footer").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new(act).strong().color(app.palette.accent));
            ui.label("•");
            ui.label(scene_title);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(can_save, egui::Button::new("💾 Save")).clicked() {
                    app.save_game();
                }

                match app.ui.saved_at {
                    Some(at) if at.elapsed() < SAVE_CONFIRMATION => {
                        match &app.ui.save_error {
                            Some(message) => {
                                ui.colored_label(egui::Color32::LIGHT_RED, message.as_str());
                            }
                            None => {
                                ui.colored_label(app.palette.accent, "✓ Saved");
                            }
                        }
                    }
                    Some(_) => app.ui.saved_at = None,
                    None => {}
                }

                if ui.add_enabled(!app.ui.loading, egui::Button::new("Menu")).clicked() {
                    app.return_to_menu();
                }
                if ui.checkbox(&mut app.settings.dev_mode, "Dev Mode").changed() {
                    save_settings(&app.settings);
                }
            });
        });
    });
}
