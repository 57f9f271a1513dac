/*
 * Responsibility
 * - POST /upload (multipart/form-data)
 * - 許可する MIME type 以外のファイルは無視され、file 必須の validation で弾かれる
 */
use axum::{
    extract::{Request, State},
    response::Response,
};

use crate::{
    api::v1::dto::upload::{ALLOWED_UPLOAD_TYPES, UploadRequest, UploadResponse},
    error::AppError,
    handler::Reply,
    state::AppState,
};

async fn upload(req: UploadRequest) -> Result<Reply<UploadResponse>, AppError> {
    tracing::info!(
        title = %req.title,
        size = req.file.as_ref().map(|f| f.size()).unwrap_or_default(),
        "upload received"
    );
    Ok(Reply::data(req.into()))
}

pub async fn upload_file(State(state): State<AppState>, req: Request) -> Response {
    state
        .handler
        .handle_multipart(req, true, ALLOWED_UPLOAD_TYPES, upload)
        .await
}
