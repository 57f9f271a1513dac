/*
 * Responsibility
 * - callback が返すバイナリ (download) を attachment として送る
 * - envelope は通さない
 */
use axum::{
    BoxError,
    body::{Body, Bytes},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures_util::TryStream;

/// Binary payload sent back as a file download.
pub struct Stream {
    pub content_type: String,
    pub filename: String,
    /// Sent as `Content-Length` when known.
    pub size: Option<u64>,
    pub body: Body,
}

impl Stream {
    pub fn new(content_type: impl Into<String>, filename: impl Into<String>, body: Body) -> Self {
        Self {
            content_type: content_type.into(),
            filename: filename.into(),
            size: None,
            body,
        }
    }

    /// In-memory payload; the size is taken from the buffer.
    pub fn from_bytes(
        content_type: impl Into<String>,
        filename: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        let bytes = bytes.into();
        let size = bytes.len() as u64;
        Self::new(content_type, filename, Body::from(bytes)).with_size(size)
    }

    /// Chunked payload of unknown size, sent as it is produced.
    pub fn from_stream<S>(
        content_type: impl Into<String>,
        filename: impl Into<String>,
        stream: S,
    ) -> Self
    where
        S: TryStream + Send + 'static,
        S::Ok: Into<Bytes>,
        S::Error: Into<BoxError>,
    {
        Self::new(content_type, filename, Body::from_stream(stream))
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    fn content_disposition(&self) -> String {
        // Quotes and backslashes would break out of the quoted-string
        let escaped = self.filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("attachment; filename=\"{escaped}\"")
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl IntoResponse for Stream {
    fn into_response(self) -> Response {
        let content_type = match HeaderValue::from_str(&self.content_type) {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(content_type = %self.content_type, "invalid stream content type");
                HeaderValue::from_static("application/octet-stream")
            }
        };
        let disposition = match HeaderValue::from_str(&self.content_disposition()) {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(filename = %self.filename, "invalid stream filename");
                HeaderValue::from_static("attachment")
            }
        };

        let mut res = Response::new(self.body);
        *res.status_mut() = StatusCode::OK;
        let headers = res.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        headers.insert(header::CONTENT_DISPOSITION, disposition);
        if let Some(size) = self.size {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
        }
        res
    }
}
