//! HTTP Middleware
//!
//! - 会话中间件：解析/签发会话 cookie，生成 RequestContext
//! - HTTP 状态码错误日志中间件

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::SessionStorePort;
use crate::domain::SessionId;

use super::error::ApiError;

/// 默认会话 cookie 名
pub const DEFAULT_SESSION_COOKIE: &str = "melo_session";

/// 单次请求的上下文
///
/// 由会话中间件写入 request extensions，handler 通过提取器获取
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub session_id: SessionId,
    /// 本次请求新签发的会话
    pub is_new: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| ApiError::Internal("Session middleware is not installed".to_string()))
    }
}

/// 会话中间件状态
#[derive(Clone)]
pub struct SessionLayerState {
    pub store: Arc<dyn SessionStorePort>,
    pub cookie_name: String,
}

/// 从 Cookie 头中读取指定名称的值
fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
}

fn session_cookie(name: &str, session_id: &SessionId) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        name, session_id
    ))
    .ok()
}

/// 会话中间件
///
/// cookie 缺失或无效时签发新会话并通过 Set-Cookie 下发；
/// 每次请求都会刷新会话的最后活动时间
pub async fn session_middleware(
    State(layer): State<SessionLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = read_cookie(request.headers(), &layer.cookie_name)
        .and_then(|raw| SessionId::parse(&raw));

    let context = match existing {
        Some(session_id) => RequestContext {
            session_id,
            is_new: false,
        },
        None => RequestContext {
            session_id: SessionId::generate(),
            is_new: true,
        },
    };

    if let Err(e) = layer.store.touch(&context.session_id) {
        return ApiError::ServiceUnavailable(e.to_string()).into_response();
    }

    if context.is_new {
        tracing::debug!(session_id = %context.session_id, "Session issued");
    }

    let session_id = context.session_id.clone();
    let is_new = context.is_new;
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    if is_new {
        if let Some(cookie) = session_cookie(&layer.cookie_name, &session_id) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    response
}

/// HTTP 状态码错误日志中间件
///
/// 拦截 HTTP 响应，当状态码为 4xx 或 5xx 时记录日志
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}
