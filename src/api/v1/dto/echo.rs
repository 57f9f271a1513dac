/*
 * Responsibility
 * - /get, /delete, /put, /post の request DTO
 * - handler はこれをそのまま返す (requestInfo 込み)
 */
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::v1::dto::claims::Claims;
use crate::handler::{RequestInfo, WithRequestInfo};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EchoRequest {
    #[serde(default)]
    #[validate(length(max = 256))]
    pub message: String,

    #[serde(skip_deserializing)]
    pub request_info: RequestInfo<Claims>,
}

impl WithRequestInfo<Claims> for EchoRequest {
    fn set_request_info(&mut self, info: RequestInfo<Claims>) {
        self.request_info = info;
    }
}

/// Same as `EchoRequest`, plus the body token field (`token` in JSON, form or multipart bodies).
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 256))]
    pub message: String,

    #[serde(default)]
    pub token: String,

    #[serde(skip_deserializing)]
    pub request_info: RequestInfo<Claims>,
}

impl WithRequestInfo<Claims> for PostRequest {
    fn set_request_info(&mut self, info: RequestInfo<Claims>) {
        self.request_info = info;
    }
}
