pub mod message;
pub mod scene;
pub mod session_snapshot;
