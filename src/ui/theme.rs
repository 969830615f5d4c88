use std::collections::BTreeMap;

use eframe::egui;
use egui::{Color32, Stroke};

/// Colours for the whole app, taken from the storyteller prompt's theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub primary_bg: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub accent: Color32,
    pub button_primary_bg: Color32,
    pub button_secondary_bg: Color32,
    pub border: Color32,
    pub display_window_bg: Color32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary_bg: Color32::from_rgb(0x1a, 0x2a, 0x3a),
            text_primary: Color32::from_rgb(0xe0, 0xe8, 0xf0),
            text_secondary: Color32::from_rgb(0x8d, 0x99, 0xae),
            accent: Color32::from_rgb(0xf7, 0xb8, 0x01),
            button_primary_bg: Color32::from_rgb(0x5c, 0x3a, 0x21),
            button_secondary_bg: Color32::from_rgb(0x3a, 0x2e, 0x24),
            border: Color32::from_rgb(0x3a, 0x4a, 0x5a),
            display_window_bg: Color32::from_rgb(0x2a, 0x3a, 0x4a),
        }
    }
}

impl Palette {
    /// Unknown or unparsable keys keep their default colour.
    pub fn from_theme(theme: &BTreeMap<String, String>) -> Self {
        let mut palette = Self::default();
        let slots: [(&str, &mut Color32); 8] = [
            ("primaryBg", &mut palette.primary_bg),
            ("textPrimary", &mut palette.text_primary),
            ("textSecondary", &mut palette.text_secondary),
            ("accent", &mut palette.accent),
            ("buttonPrimaryBg", &mut palette.button_primary_bg),
            ("buttonSecondaryBg", &mut palette.button_secondary_bg),
            ("borderColor", &mut palette.border),
            ("displayWindowBg", &mut palette.display_window_bg),
        ];

        for (key, slot) in slots {
            if let Some(color) = theme.get(key).and_then(|v| parse_hex(v)) {
                *slot = color;
            }
        }
        palette
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();

        visuals.panel_fill = self.primary_bg;
        visuals.window_fill = self.display_window_bg;
        visuals.extreme_bg_color = self.display_window_bg;
        visuals.faint_bg_color = self.display_window_bg;
        visuals.override_text_color = Some(self.text_primary);
        visuals.hyperlink_color = self.accent;
        visuals.selection.bg_fill = self.accent;
        visuals.window_stroke = Stroke::new(1.0, self.border);

        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border);
        visuals.widgets.inactive.weak_bg_fill = self.button_primary_bg;
        visuals.widgets.inactive.bg_fill = self.button_primary_bg;
        visuals.widgets.hovered.weak_bg_fill = self.button_secondary_bg;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);
        visuals.widgets.active.weak_bg_fill = self.accent;

        ctx.set_visuals(visuals);
    }
}

/// `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(value: &str) -> Option<Color32> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}
