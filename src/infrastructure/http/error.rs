//! HTTP Error Handling
//!
//! 应用层错误只在这里映射为 HTTP 状态码

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;
use crate::infrastructure::adapters::CaptureError;

/// 音乐文件未找到时返回给前端的提示
pub const FILE_NOT_FOUND_MESSAGE: &str = "ファイルが見つかりません";

/// 错误响应 `{error}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 业务拒绝响应 `{success: false, message}`
#[derive(Debug, Serialize)]
pub struct RejectedResponse {
    pub success: bool,
    pub message: String,
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// 请求本身成功，但结果为否定（例如语音无法识别），以 200 返回
    Rejected(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Rejected(_) => StatusCode::OK,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::Rejected(message) => {
                tracing::info!(message = %message, "Request rejected");
                let body = RejectedResponse {
                    success: false,
                    message,
                };
                (status, Json(body)).into_response()
            }
            ApiError::NotFound(error) => {
                tracing::warn!(status = status.as_u16(), error = %error, "Resource not found");
                (status, Json(ErrorResponse { error })).into_response()
            }
            ApiError::BadRequest(error) => {
                tracing::warn!(status = status.as_u16(), error = %error, "Bad request");
                (status, Json(ErrorResponse { error })).into_response()
            }
            ApiError::Conflict(error) => {
                tracing::warn!(status = status.as_u16(), error = %error, "Resource conflict");
                (status, Json(ErrorResponse { error })).into_response()
            }
            ApiError::Internal(error) => {
                tracing::error!(status = status.as_u16(), error = %error, "Internal server error");
                (status, Json(ErrorResponse { error })).into_response()
            }
            ApiError::ServiceUnavailable(error) => {
                tracing::error!(status = status.as_u16(), error = %error, "Service unavailable");
                (status, Json(ErrorResponse { error })).into_response()
            }
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound {
                resource_type: "MusicFile",
                ..
            } => ApiError::NotFound(FILE_NOT_FOUND_MESSAGE.to_string()),
            ApplicationError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ApplicationError::InvalidFormat(msg)
            | ApplicationError::TooLarge(msg)
            | ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::RecognitionFailed
            | ApplicationError::RecognitionServiceError(_)
            | ApplicationError::UnsupportedCommand(_) => ApiError::Rejected(e.to_string()),
            ApplicationError::SessionError(_) => ApiError::ServiceUnavailable(e.to_string()),
            ApplicationError::RepositoryError(_) | ApplicationError::StorageError(_) => {
                ApiError::Internal(e.to_string())
            }
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

/// 请求体不是合法 JSON 时统一返回 `{error}`
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<CaptureError> for ApiError {
    fn from(e: CaptureError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
