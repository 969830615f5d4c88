pub mod engine;
pub mod protocol;
pub mod session;

pub mod config;
pub mod credential;
pub mod error;
pub mod llm_client;
pub mod logutil;
pub mod metadata;
pub mod pacing;
pub mod prompt;
pub mod response_parser;
pub mod save_store;
