use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

use crate::client::AnalysisError;
use crate::intake::RejectionReason;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// API错误类型
pub struct AppError {
    pub status: StatusCode,
    pub error: anyhow::Error,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, error: anyhow::anyhow!(message.into()) }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("请求失败: {:#}", self.error);
        }
        (self.status, self.error.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = if let Some(err) = error.downcast_ref::<AnalysisError>() {
            match err {
                AnalysisError::MissingInput => StatusCode::BAD_REQUEST,
                AnalysisError::Busy => StatusCode::CONFLICT,
                AnalysisError::BackendError { .. }
                | AnalysisError::TransportError(_)
                | AnalysisError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            }
        } else if error.is::<RejectionReason>() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, error }
    }
}
