use thiserror::Error;

use crate::engine::llm_client::ModelError;
use crate::engine::response_parser::ParseError;

/// Everything that can go wrong during a turn. None of these end the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no API key has been provided")]
    MissingCredential,

    #[error("model request failed: {0}")]
    TransportFailure(ModelError),

    #[error("model reply could not be parsed: {0}")]
    MalformedResponse(#[from] ParseError),

    #[error("save storage is unavailable")]
    StorageUnavailable,

    #[error("no story scene to save")]
    NothingToSave,
}

impl SessionError {
    /// Text shown to the player, in the recovery scene or next to the save button.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::MissingCredential => {
                "API key not found. Please return to main menu.".into()
            }
            SessionError::TransportFailure(err) => match err {
                ModelError::InvalidCredential => "Invalid API key".into(),
                ModelError::RateLimited => "Rate limit exceeded. Please wait a moment.".into(),
                ModelError::ContentBlocked => "Content blocked by safety filters".into(),
                _ => "The storyteller could not be reached. Please try again.".into(),
            },
            SessionError::MalformedResponse(_) => {
                "Failed to parse game response. Please try again.".into()
            }
            SessionError::StorageUnavailable => {
                "Saving is unavailable right now. Your story continues.".into()
            }
            SessionError::NothingToSave => "There is nothing to save yet.".into(),
        }
    }
}

impl From<ModelError> for SessionError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingCredential => SessionError::MissingCredential,
            ModelError::EmptyReply => {
                SessionError::MalformedResponse(ParseError::Empty)
            }
            other => SessionError::TransportFailure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_from_client_maps_to_session_variant() {
        let err = SessionError::from(ModelError::MissingCredential);
        assert!(matches!(err, SessionError::MissingCredential));
    }

    #[test]
    fn rate_limit_gets_a_friendly_message() {
        let err = SessionError::from(ModelError::RateLimited);
        assert_eq!(err.user_message(), "Rate limit exceeded. Please wait a moment.");
    }

    #[test]
    fn empty_reply_counts_as_malformed() {
        let err = SessionError::from(ModelError::EmptyReply);
        assert!(matches!(err, SessionError::MalformedResponse(ParseError::Empty)));
        assert_eq!(err.user_message(), "Failed to parse game response. Please try again.");
    }
}
