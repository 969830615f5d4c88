//! Genesis Engine: an AI-narrated choose-your-own-adventure front end.
//!
//! `engine` holds the turn-based session (history, pacing, reply parsing,
//! save slot) and the model client; `ui` is the egui shell that drives it
//! through a command channel.

pub mod engine;
pub mod model;
pub mod ui;
