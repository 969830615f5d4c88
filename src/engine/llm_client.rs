use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::config::EngineConfig;
use crate::engine::credential::Credential;
use crate::model::message::Message;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("API key was rejected")]
    InvalidCredential,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("reply was blocked by the provider's content filter")]
    ContentBlocked,

    #[error("provider answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no choices")]
    EmptyReply,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The text-generation service the story is written by.
pub trait NarrativeModel: Send {
    /// Send the whole conversation and return the raw reply text.
    fn complete(&self, messages: &[Message]) -> Result<String, ModelError>;
}

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client (LM Studio, OpenAI, ...).
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    api_base: String,
    model: String,
    temperature: f32,
    credential: Option<Credential>,
}

impl ChatCompletionsClient {
    pub fn new(config: &EngineConfig, credential: Option<Credential>) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            credential,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Lists the provider's models to check the URL and key.
    pub fn test_connection(&self) -> Result<String, ModelError> {
        let credential = self.credential.as_ref().ok_or(ModelError::MissingCredential)?;

        let resp = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(credential.expose())
            .send()?;
        let resp = check_status(resp)?;
        let body: serde_json::Value = resp.json()?;

        Ok(format!(
            "Connected ({} models available)",
            body["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl NarrativeModel for ChatCompletionsClient {
    fn complete(&self, messages: &[Message]) -> Result<String, ModelError> {
        let credential = self.credential.as_ref().ok_or(ModelError::MissingCredential)?;

        let req = build_request(&self.model, self.temperature, messages);
        debug!("sending {} messages to {}", messages.len(), self.api_base);

        let resp = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(credential.expose())
            .json(&req)
            .send()?;
        let resp = check_status(resp)?;

        extract_reply(resp.json::<ChatCompletionResponse>()?)
    }
}

pub fn build_request<'a>(
    model: &'a str,
    temperature: f32,
    messages: &'a [Message],
) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        temperature,
        messages: messages
            .iter()
            .map(|m| ChatMessage { role: m.role.as_str(), content: &m.content })
            .collect(),
    }
}

fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ModelError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    warn!("model provider returned {status}");
    Err(classify_status(status, body))
}

pub fn classify_status(status: StatusCode, body: String) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::InvalidCredential,
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited,
        _ => ModelError::Status { status: status.as_u16(), body },
    }
}

pub fn extract_reply(resp: ChatCompletionResponse) -> Result<String, ModelError> {
    let choice = resp.choices.into_iter().next().ok_or(ModelError::EmptyReply)?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(ModelError::ContentBlocked);
    }

    choice.message.content.ok_or(ModelError::EmptyReply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_fails_before_any_request() {
        // Unroutable base URL: reaching the network would be a different error.
        let config = EngineConfig { api_base: "http://127.0.0.1:9".into(), ..Default::default() };
        let client = ChatCompletionsClient::new(&config, None);

        let err = client.complete(&[Message::user("begin")]).unwrap_err();
        assert!(matches!(err, ModelError::MissingCredential));
    }

    #[test]
    fn request_keeps_roles_and_order() {
        let history = vec![Message::system("You are the Storyteller"), Message::user("begin")];
        let req = build_request("local-model", 0.7, &history);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "local-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "begin");
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, String::new()),
            ModelError::InvalidCredential
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ModelError::RateLimited
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "upstream".into()),
            ModelError::Status { status: 502, .. }
        ));
    }

    #[test]
    fn reply_text_comes_from_first_choice() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"{\"description\":\"hi\"}"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(resp).unwrap(), r#"{"description":"hi"}"#);

        let filtered: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null},"finish_reason":"content_filter"}]}"#,
        )
        .unwrap();
        assert!(matches!(extract_reply(filtered), Err(ModelError::ContentBlocked)));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_reply(empty), Err(ModelError::EmptyReply)));
    }
}
