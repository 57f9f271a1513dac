/*
 * Responsibility
 * - GET /download?filename=...
 * - callback が Reply::Stream を返す例 (envelope ではなく attachment で返る)
 */
use axum::{
    extract::{Request, State},
    response::Response,
};

use crate::{
    api::v1::dto::download::DownloadRequest,
    error::AppError,
    handler::{Reply, Stream},
    state::AppState,
};

async fn download(req: DownloadRequest) -> Result<Reply<()>, AppError> {
    let content = format!("Hello from {}\n", req.filename);
    Ok(Reply::stream(Stream::from_bytes(
        "text/plain; charset=utf-8",
        req.filename,
        content,
    )))
}

pub async fn download_file(State(state): State<AppState>, req: Request) -> Response {
    state.handler.handle(req, true, download).await
}
