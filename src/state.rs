/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::api::v1::dto::claims::Claims;
use crate::handler::{ApiHandler, HandlerConfig};

#[derive(Clone, Debug)]
pub struct AppState {
    pub handler: Arc<ApiHandler<Claims>>,
}

impl AppState {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            handler: Arc::new(ApiHandler::new(config)),
        }
    }
}
