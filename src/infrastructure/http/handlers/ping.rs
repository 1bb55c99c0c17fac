//! Ping Handlers
//!
//! 健康检查与连通性测试

use axum::Json;
use serde::Serialize;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct TestResponse {
    pub message: &'static str,
}

/// Ping endpoint - 健康检查
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 前端连通性测试
pub async fn api_test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "API is working!",
    })
}
