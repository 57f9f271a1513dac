/*
 * Responsibility
 * - 成功/失敗の両方で使う共通レスポンス形 `{ code, message, data }`
 * - data が無い場合 (エラー) は JSON から省く
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub const OK_CODE: &str = "OK";
pub const OK_MESSAGE: &str = "Success";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: OK_CODE.to_string(),
            message: OK_MESSAGE.to_string(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Envelope without payload (used for errors).
    pub fn bare(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
