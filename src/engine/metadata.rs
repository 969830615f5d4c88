use std::collections::BTreeMap;

use regex::Regex;

const DEFAULT_TITLE: &str = "Genesis Adventure";
const DEFAULT_TAGLINE: &str = "Your choices shape your destiny.";
const ORIGINAL_DISCLAIMER: &str = "This is an original story powered by the Genesis Engine.";
const FAN_DISCLAIMER: &str =
    "This is an unofficial, non-profit fan project. All rights belong to their respective owners.";

/// Presentation details read out of the storyteller prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMetadata {
    pub title: String,
    pub universe: Option<String>,
    pub tagline: String,
    pub disclaimer: String,
    /// Theme key (`primaryBg`, `accent`, ...) to CSS-style colour string.
    pub theme: BTreeMap<String, String>,
}

pub fn extract_metadata(prompt: &str) -> GameMetadata {
    let title = capture(r#"You are the Storyteller AI for "([^"]+)""#, prompt)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let universe = capture(r#"TARGET_UNIVERSE[^"]*"([^"]+)""#, prompt);

    let tagline = capture(r"Core Philosophy:\s*([^•]+)", prompt)
        .and_then(|text| {
            let first = text.trim().split('.').next()?.trim().to_string();
            (!first.is_empty()).then(|| format!("{first}."))
        })
        .unwrap_or_else(|| DEFAULT_TAGLINE.to_string());

    let disclaimer = if prompt.contains("Canon Integrity") {
        FAN_DISCLAIMER
    } else {
        ORIGINAL_DISCLAIMER
    }
    .to_string();

    let theme = extract_theme(prompt).unwrap_or_else(default_theme);

    GameMetadata { title, universe, tagline, disclaimer, theme }
}

fn capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_theme(prompt: &str) -> Option<BTreeMap<String, String>> {
    let block = capture(
        r"(?s)The visual theme for the UI is defined by the following object:\s*(\{[^}]+\})",
        prompt,
    )?;
    let pair = Regex::new(r#"(\w+)\s*:\s*['"]([^'"]+)['"]"#).ok()?;

    let theme: BTreeMap<String, String> = pair
        .captures_iter(&block)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect();

    (!theme.is_empty()).then_some(theme)
}

pub fn default_theme() -> BTreeMap<String, String> {
    [
        ("primaryBg", "#1a2a3a"),
        ("textPrimary", "#e0e8f0"),
        ("textSecondary", "#8d99ae"),
        ("accent", "#f7b801"),
        ("buttonPrimaryBg", "#5c3a21"),
        ("borderColor", "#3a4a5a"),
        ("displayWindowBg", "#2a3a4a"),
        ("buttonSecondaryBg", "#3a2e24"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
