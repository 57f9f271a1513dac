/*
 * Responsibility
 * - GET /health (疎通用)
 * - ApiHandler を通さない素の handler だが、レスポンス形は envelope に揃える
 */
use axum::response::IntoResponse;
use serde_json::json;

use crate::envelope::Envelope;

pub async fn health() -> impl IntoResponse {
    Envelope::ok(json!({"status": "ok"}))
}
