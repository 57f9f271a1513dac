use serde::Deserialize;
use validator::Validate;

use crate::api::v1::dto::claims::Claims;
use crate::handler::WithRequestInfo;

#[derive(Debug, Deserialize, Validate)]
pub struct DownloadRequest {
    #[serde(default = "default_filename")]
    #[validate(length(min = 1, max = 128))]
    pub filename: String,
}

fn default_filename() -> String {
    "hello.txt".to_string()
}

// Download doesn't look at the caller
impl WithRequestInfo<Claims> for DownloadRequest {}
