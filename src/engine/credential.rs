use std::fmt;

use thiserror::Error;

pub const API_KEY_ENV: &str = "GENESIS_API_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Please enter an API key")]
    Empty,

    #[error("API keys cannot contain spaces")]
    ContainsWhitespace,
}

/// Model access key. Lives in memory for this run only and is never saved.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn parse(input: &str) -> Result<Self, CredentialError> {
        let key = input.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        if key.chars().any(char::is_whitespace) {
            return Err(CredentialError::ContainsWhitespace);
        }
        Ok(Self(key.to_string()))
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV).ok().and_then(|v| Self::parse(&v).ok())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
