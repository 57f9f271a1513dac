/*
 * Responsibility
 * - GET /me: token から復号した claims を返す
 * - request 型を持たない endpoint の例 (handle_empty)
 */
use axum::{
    extract::{Request, State},
    response::Response,
};

use crate::{
    api::v1::dto::claims::Claims,
    error::AppError,
    handler::{Reply, RequestInfo},
    state::AppState,
};

async fn me(info: RequestInfo<Claims>) -> Result<Reply<Claims>, AppError> {
    info.claims.map(Reply::data).ok_or(AppError::Unauthorized)
}

pub async fn get_me(State(state): State<AppState>, req: Request) -> Response {
    state.handler.handle_empty(req, me).await
}
