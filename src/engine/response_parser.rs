use serde_json::Value;
use thiserror::Error;

use crate::model::scene::SceneState;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("model returned an empty reply")]
    Empty,

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("reply is not a JSON object")]
    NotAnObject { raw: String },

    #[error("reply does not match the scene shape: {source}")]
    InvalidShape {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl ParseError {
    /// The untouched model output, for logging a failed turn.
    pub fn raw(&self) -> &str {
        match self {
            ParseError::Empty => "",
            ParseError::InvalidJson { raw, .. }
            | ParseError::NotAnObject { raw }
            | ParseError::InvalidShape { raw, .. } => raw,
        }
    }
}

/// Decode a model reply into a scene.
///
/// Code fences around the object are dropped, and if the model chatted
/// around the JSON the outermost `{ ... }` is tried as well. String choices
/// become `{ id: "choice-<n>", text }`.
pub fn parse_scene(raw: &str) -> Result<SceneState, ParseError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(first_err) => outermost_object(body)
            .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
            .ok_or_else(|| ParseError::InvalidJson {
                source: first_err,
                raw: raw.to_string(),
            })?,
    };

    let Value::Object(object) = &mut value else {
        return Err(ParseError::NotAnObject { raw: raw.to_string() });
    };

    // `null` means "not provided"; let the field defaults apply.
    object.retain(|_, field| !field.is_null());
    if let Some(Value::Array(choices)) = object.get_mut("choices") {
        normalize_choices(choices);
    }

    serde_json::from_value(value).map_err(|source| ParseError::InvalidShape {
        source,
        raw: raw.to_string(),
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`json`, `JSON`, ...) along with the fence line.
        text = match rest.split_once('\n') {
            Some((info, body)) if !info.trim_start().starts_with('{') => body,
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }

    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn normalize_choices(choices: &mut [Value]) {
    for (index, choice) in choices.iter_mut().enumerate() {
        let id = format!("choice-{index}");
        match choice {
            Value::String(text) => {
                let text = std::mem::take(text);
                *choice = serde_json::json!({ "id": id, "text": text });
            }
            Value::Object(fields) => {
                if !fields.contains_key("id") {
                    fields.insert("id".into(), Value::String(id));
                }
            }
            _ => {}
        }
    }
}
