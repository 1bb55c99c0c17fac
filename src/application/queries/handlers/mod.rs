//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod music_handlers;
mod position_handlers;
mod voice_handlers;

pub use music_handlers::*;
pub use position_handlers::*;
pub use voice_handlers::*;
