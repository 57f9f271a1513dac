/*
 * Responsibility
 * - /upload (multipart/form-data) の request/response DTO
 * - form field 名の一覧と、値の詰め替えを MultipartRequest で宣言する
 */
use serde::Serialize;
use validator::Validate;

use crate::api::v1::dto::claims::Claims;
use crate::handler::{
    FieldError, MultipartRequest, RequestInfo, UploadedFile, WithRequestInfo, set_field,
};

pub const ALLOWED_UPLOAD_TYPES: &[&str] = &["image/png", "image/jpeg", "application/pdf"];

#[derive(Debug, Default, Validate)]
pub struct UploadRequest {
    #[validate(length(min = 1, max = 128))]
    pub title: String,
    pub public: bool,
    pub tags: Option<String>,

    #[validate(required)]
    pub file: Option<UploadedFile>,

    pub request_info: RequestInfo<Claims>,
}

impl MultipartRequest for UploadRequest {
    fn form_fields(&self) -> &'static [&'static str] {
        &["title", "public", "tags"]
    }

    fn set_form_field(&mut self, name: &str, raw: &str) -> Result<(), FieldError> {
        match name {
            "title" => set_field(&mut self.title, raw),
            "public" => set_field(&mut self.public, raw),
            "tags" => set_field(&mut self.tags, raw),
            _ => Err(FieldError::Unknown),
        }
    }

    fn file_fields(&self) -> &'static [&'static str] {
        &["file"]
    }

    fn set_file(&mut self, name: &str, file: UploadedFile) {
        if name == "file" {
            self.file = Some(file);
        }
    }
}

impl WithRequestInfo<Claims> for UploadRequest {
    fn set_request_info(&mut self, info: RequestInfo<Claims>) {
        self.request_info = info;
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub title: String,
    pub public: bool,
    pub tags: Vec<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub request_info: RequestInfo<Claims>,
}

impl From<UploadRequest> for UploadResponse {
    fn from(req: UploadRequest) -> Self {
        let tags = req
            .tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let (file_name, content_type, size) = match req.file {
            Some(f) => {
                let size = f.size();
                (f.file_name, f.content_type, size)
            }
            None => (None, None, 0),
        };

        Self {
            title: req.title,
            public: req.public,
            tags,
            file_name,
            content_type,
            size,
            request_info: req.request_info,
        }
    }
}
