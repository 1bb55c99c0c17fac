//! Sled Persistence - 会话存储

mod session_store;

pub use session_store::{SledSessionConfig, SledSessionStore};
