//! HTTP Layer - RESTful JSON API
//!
//! 会话中间件为每个请求生成 RequestContext，错误在 error.rs 中统一映射

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use middleware::{RequestContext, DEFAULT_SESSION_COOKIE};
pub use routes::create_routes;
pub use server::{build_router, HttpServer, ServerConfig};
pub use state::{AppPorts, AppSettings, AppState};
