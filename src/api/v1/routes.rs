/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 各 handler は ApiHandler (state.handler) 経由で parse/validate/envelope 化する
 */
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    download::download_file,
    echo::{delete_echo, get_echo, post_echo, put_echo},
    health::health,
    me::get_me,
    upload::upload_file,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/get", get(get_echo))
        .route("/delete", delete(delete_echo))
        .route("/put", put(put_echo))
        .route("/post", post(post_echo))
        .route("/upload", post(upload_file))
        .route("/download", get(download_file))
        .route("/me", get(get_me))
}
