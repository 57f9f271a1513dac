/*
 * Responsibility
 * - query / body (JSON, urlencoded form, multipart の text field) → request 型
 * - multipart/form-data の読み込み (field / file)
 * - Bearer token の取り出し (Authorization header → body の "token")
 */
use std::collections::HashMap;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{
        DefaultBodyLimit, FromRequest, Multipart, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, Method, Uri, header},
};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tower::{Layer, ServiceExt, service_fn};

use super::multipart::UploadedFile;

pub(crate) const TOKEN_FIELD: &str = "token";

#[derive(Debug, Error)]
pub(crate) enum ParseError {
    #[error("unsupported content type: {0:?}")]
    UnsupportedContentType(Option<String>),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Json(#[from] JsonRejection),
    #[error("failed to deserialize form: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
    #[error("failed to re-encode form fields: {0}")]
    FormFields(#[from] serde_urlencoded::ser::Error),
    #[error("failed to read multipart form: {0}")]
    Multipart(#[from] axum::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Multipart,
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

fn body_kind(headers: &HeaderMap) -> Option<BodyKind> {
    let essence = content_type(headers)?
        .split(';')
        .next()?
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "application/x-www-form-urlencoded" => Some(BodyKind::Form),
        "multipart/form-data" => Some(BodyKind::Multipart),
        e if e == "application/json" || (e.starts_with("application/") && e.ends_with("+json")) => {
            Some(BodyKind::Json)
        }
        _ => None,
    }
}

pub(crate) fn is_multipart(headers: &HeaderMap) -> bool {
    body_kind(headers) == Some(BodyKind::Multipart)
}

/// GET and DELETE carry their input in the query string.
pub(crate) fn reads_query(method: &Method) -> bool {
    method == Method::GET || method == Method::DELETE
}

pub(crate) fn parse_query<T: DeserializeOwned>(uri: &Uri) -> Result<T, ParseError> {
    let Query(value) = Query::<T>::try_from_uri(uri)?;
    Ok(value)
}

/// JSON or urlencoded body. Multipart goes through [`read_multipart`] instead.
pub(crate) fn parse_body<T: DeserializeOwned>(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, ParseError> {
    match body_kind(headers) {
        Some(BodyKind::Json) => {
            let Json(value) = Json::<T>::from_bytes(body)?;
            Ok(value)
        }
        // Decoded straight from the buffered bytes; the configured limit has already applied
        Some(BodyKind::Form) => Ok(serde_urlencoded::from_bytes(body)?),
        Some(BodyKind::Multipart) | None => Err(ParseError::UnsupportedContentType(
            content_type(headers).map(str::to_string),
        )),
    }
}

#[derive(Debug, Default)]
pub(crate) struct MultipartForm {
    // First value wins for repeated names
    pub(crate) values: HashMap<String, String>,
    pub(crate) files: HashMap<String, UploadedFile>,
    // Text parts in arrival order, repeats included
    pairs: Vec<(String, String)>,
}

impl MultipartForm {
    pub(crate) fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Deserializes the text parts the way an urlencoded body with the same pairs would be.
    pub(crate) fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        let encoded = serde_urlencoded::to_string(&self.pairs)?;
        Ok(serde_urlencoded::from_str(&encoded)?)
    }
}

/// Reads every part of a `multipart/form-data` request into memory.
///
/// The caller bounds the body size. axum's own 2 MiB default for `Multipart` is
/// switched off so that bound is the only one.
pub(crate) async fn read_multipart(req: Request) -> Result<MultipartForm, axum::Error> {
    let extract = service_fn(|req: Request| async move {
        Multipart::from_request(req, &())
            .await
            .map_err(axum::Error::new)
    });
    let mut multipart = DefaultBodyLimit::disable().layer(extract).oneshot(req).await?;
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await.map_err(axum::Error::new)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(axum::Error::new)?;
            form.files.entry(name.clone()).or_insert(UploadedFile {
                field_name: name,
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(axum::Error::new)?;
            form.pairs.push((name.clone(), value.clone()));
            form.values.entry(name).or_insert(value);
        }
    }

    Ok(form)
}

/// Multipart reader over a body that has already been buffered.
pub(crate) async fn parse_multipart(
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<MultipartForm, ParseError> {
    let mut req = Request::new(Body::from(body.clone()));
    *req.method_mut() = Method::POST;
    if let Some(ct) = headers.get(header::CONTENT_TYPE) {
        req.headers_mut().insert(header::CONTENT_TYPE, ct.clone());
    }
    Ok(read_multipart(req).await?)
}

/// `Authorization: Bearer <token>`; the scheme is matched case-insensitively.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.to_string())
}

#[derive(Debug, Default, Deserialize)]
struct AccessToken {
    #[serde(default)]
    token: String,
}

/// Fallback token source: a `token` field in the JSON or urlencoded body.
pub(crate) fn body_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    parse_body::<AccessToken>(headers, body)
        .ok()
        .map(|t| t.token)
        .filter(|t| !t.trim().is_empty())
}
