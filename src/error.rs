/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / envelope body)
 * - handler callback が返したエラーも同じ経路で envelope に変換する
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::Envelope;

pub const BAD_REQUEST_CODE: &str = "CLE001";
pub const UNAUTHORIZED_CODE: &str = "CLE002";
pub const FORBIDDEN_CODE: &str = "CLE003";
pub const NOT_FOUND_CODE: &str = "CLE004";
pub const METHOD_NOT_ALLOWED_CODE: &str = "CLE005";
pub const CONFLICT_CODE: &str = "CLE009";
pub const DATA_INVALID_CODE: &str = "CLE029";
pub const INTERNAL_CODE: &str = "SVE001";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden")]
    Forbidden,
    #[error("Not Found")]
    NotFound,
    #[error("Method Not Allowed")]
    MethodNotAllowed,
    #[error("Conflict")]
    Conflict,
    #[error("Invalid data provided")]
    DataInvalid,
    #[error("Internal Server Error")]
    Internal,
    #[error("{code}: {message}")]
    Custom {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl AppError {
    pub fn bad_request() -> Self {
        Self::bad_request_with("Bad Request")
    }

    pub fn bad_request_with(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn custom(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Custom {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::DataInvalid => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Custom { status, .. } => *status,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AppError::BadRequest { .. } => BAD_REQUEST_CODE,
            AppError::Unauthorized => UNAUTHORIZED_CODE,
            AppError::Forbidden => FORBIDDEN_CODE,
            AppError::NotFound => NOT_FOUND_CODE,
            AppError::MethodNotAllowed => METHOD_NOT_ALLOWED_CODE,
            AppError::Conflict => CONFLICT_CODE,
            AppError::DataInvalid => DATA_INVALID_CODE,
            AppError::Internal => INTERNAL_CODE,
            AppError::Custom { code, .. } => code.as_str(),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Custom { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Envelope::bare(self.code(), self.message());
        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        // The source never reaches the client
        tracing::error!(error = %e, "internal error");
        AppError::Internal
    }
}
