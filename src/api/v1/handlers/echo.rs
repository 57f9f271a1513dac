/*
 * Responsibility
 * - GET /get, DELETE /delete (query), PUT /put, POST /post (body)
 * - parse/validate/claims は ApiHandler に任せ、受け取った request をそのまま返す
 */
use axum::{
    extract::{Request, State},
    response::Response,
};

use crate::{
    api::v1::dto::echo::{EchoRequest, PostRequest},
    error::AppError,
    handler::Reply,
    state::AppState,
};

async fn echo(req: EchoRequest) -> Result<Reply<EchoRequest>, AppError> {
    Ok(Reply::data(req))
}

async fn echo_post(req: PostRequest) -> Result<Reply<PostRequest>, AppError> {
    Ok(Reply::data(req))
}

pub async fn get_echo(State(state): State<AppState>, req: Request) -> Response {
    state.handler.handle(req, true, echo).await
}

pub async fn delete_echo(State(state): State<AppState>, req: Request) -> Response {
    state.handler.handle(req, true, echo).await
}

pub async fn put_echo(State(state): State<AppState>, req: Request) -> Response {
    state.handler.handle(req, true, echo).await
}

pub async fn post_echo(State(state): State<AppState>, req: Request) -> Response {
    state.handler.handle(req, true, echo_post).await
}
