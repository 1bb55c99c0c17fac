//! HTTP Handlers

mod admin;
mod media;
mod music;
mod ping;
mod position;
mod session;
mod voice;

pub use admin::*;
pub use media::*;
pub use music::*;
pub use ping::*;
pub use position::*;
pub use session::*;
pub use voice::*;
