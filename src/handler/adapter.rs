/*
 * Responsibility
 * - ApiHandler 本体
 *   - handle: query/body (JSON, form, multipart text) → validate → claims → callback → envelope / stream
 *   - handle_empty: request 型なし (claims だけ渡す)
 *   - handle_multipart: multipart/form-data → fields/files → validate → claims → callback
 * - 失敗は全て AppError 経由で envelope にする
 */
use std::marker::PhantomData;

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use http_body_util::Limited;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, warn};
use validator::Validate;

use super::multipart::MultipartRequest;
use super::parse::{self, MultipartForm, TOKEN_FIELD};
use super::types::{HandlerConfig, Reply, RequestInfo, WithRequestInfo};
use crate::envelope::Envelope;
use crate::error::AppError;
use crate::services::token_parser::{JwtPayloadParser, TokenParser};

/// Wraps business callbacks with request parsing, validation, caller claims and
/// envelope rendering.
///
/// `C` is the claims type decoded from the bearer token, `P` the parser that decodes it.
pub struct ApiHandler<C, P = JwtPayloadParser<C>> {
    parser: P,
    config: HandlerConfig,
    _claims: PhantomData<fn() -> C>,
}

impl<C: DeserializeOwned> ApiHandler<C> {
    pub fn new(config: HandlerConfig) -> Self {
        Self::with_parser(JwtPayloadParser::new(), config)
    }
}

impl<C, P: Clone> Clone for ApiHandler<C, P> {
    fn clone(&self) -> Self {
        Self {
            parser: self.parser.clone(),
            config: self.config,
            _claims: PhantomData,
        }
    }
}

impl<C, P: std::fmt::Debug> std::fmt::Debug for ApiHandler<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiHandler")
            .field("parser", &self.parser)
            .field("config", &self.config)
            .finish()
    }
}

impl<C, P> ApiHandler<C, P>
where
    P: TokenParser<C>,
{
    pub fn with_parser(parser: P, config: HandlerConfig) -> Self {
        Self {
            parser,
            config,
            _claims: PhantomData,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Parses `T` from the query (GET/DELETE) or the body (everything else), optionally
    /// validates it, attaches the caller claims and runs `f`.
    ///
    /// Multipart bodies fill `T` from their text parts only; files are ignored here and
    /// the token is read from the `token` part instead of the Authorization header.
    pub async fn handle<T, D, F, Fut>(&self, req: Request, validate: bool, f: F) -> Response
    where
        T: DeserializeOwned + Validate + WithRequestInfo<C>,
        D: Serialize,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<Reply<D>, AppError>>,
    {
        let (parts, body) = req.into_parts();
        let body = match axum::body::to_bytes(body, self.config.body_limit).await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "failed to read request body");
                return AppError::bad_request().into_response();
            }
        };

        let parsed = if parse::reads_query(&parts.method) {
            parse::parse_query::<T>(&parts.uri).map(|r| (r, None))
        } else if parse::is_multipart(&parts.headers) {
            match parse::parse_multipart(&parts.headers, &body).await {
                Ok(form) => form.deserialize::<T>().map(|r| (r, Some(form))),
                Err(e) => Err(e),
            }
        } else {
            parse::parse_body::<T>(&parts.headers, &body).map(|r| (r, None))
        };
        let (mut request, form): (T, Option<MultipartForm>) = match parsed {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, method = %parts.method, "invalid request");
                return AppError::bad_request().into_response();
            }
        };

        if validate && let Err(e) = request.validate() {
            warn!(error = %e, "request validation failed");
            return AppError::DataInvalid.into_response();
        }

        let token = match &form {
            Some(form) => form.value(TOKEN_FIELD).map(str::to_string),
            None => request_token(&parts.headers, &body),
        };
        request.set_request_info(RequestInfo::new(self.claims(token.as_deref())));

        respond(f(request).await)
    }

    /// For endpoints without input: only the caller claims are resolved.
    pub async fn handle_empty<D, F, Fut>(&self, req: Request, f: F) -> Response
    where
        D: Serialize,
        F: FnOnce(RequestInfo<C>) -> Fut,
        Fut: Future<Output = Result<Reply<D>, AppError>>,
    {
        let (parts, body) = req.into_parts();
        // A body is optional here; an unreadable one only loses the body token
        let body = axum::body::to_bytes(body, self.config.body_limit)
            .await
            .unwrap_or_default();

        let token = request_token(&parts.headers, &body);
        respond(f(RequestInfo::new(self.claims(token.as_deref()))).await)
    }

    /// Fills `T` from a `multipart/form-data` body.
    ///
    /// When `validate` is set and `allowed_types` is non-empty, uploaded files with any
    /// other content type are left out of the request (validation decides what that means).
    ///
    /// GET and DELETE get 405 `CLE005` and `f` is never called. They do not get an
    /// empty 200.
    pub async fn handle_multipart<T, D, F, Fut>(
        &self,
        req: Request,
        validate: bool,
        allowed_types: &[&str],
        f: F,
    ) -> Response
    where
        T: MultipartRequest + Validate + WithRequestInfo<C>,
        D: Serialize,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<Reply<D>, AppError>>,
    {
        if parse::reads_query(req.method()) {
            warn!(method = %req.method(), "multipart handler called without a body method");
            return AppError::MethodNotAllowed.into_response();
        }

        let limit = self.config.body_limit;
        let req = req.map(|body| Body::new(Limited::new(body, limit)));

        let form = match parse::read_multipart(req).await {
            Ok(form) => form,
            Err(e) => {
                warn!(error = %e, "invalid multipart request");
                return AppError::bad_request().into_response();
            }
        };

        let mut request = T::default();

        for name in request.form_fields() {
            let Some(raw) = form.values.get(*name).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Err(e) = request.set_form_field(name, raw) {
                warn!(field = %name, error = %e, "invalid multipart field");
                return AppError::bad_request_with(format!(
                    "Invalid value for field '{name}': {e}"
                ))
                .into_response();
            }
        }

        let check_types = validate && !allowed_types.is_empty();
        let mut files = form.files;
        for name in request.file_fields() {
            let Some(file) = files.remove(*name) else {
                continue;
            };
            if check_types && !file.has_allowed_type(allowed_types) {
                warn!(
                    field = %name,
                    content_type = ?file.content_type,
                    "uploaded file type not allowed"
                );
                continue;
            }
            request.set_file(name, file);
        }

        if validate && let Err(e) = request.validate() {
            warn!(error = %e, "request validation failed");
            return AppError::DataInvalid.into_response();
        }

        // `files` has been moved out of the form; the text values are still there
        let token = form.values.get(TOKEN_FIELD).map(String::as_str);
        request.set_request_info(RequestInfo::new(self.claims(token)));

        respond(f(request).await)
    }

    fn claims(&self, token: Option<&str>) -> Option<C> {
        let token = token.map(str::trim).filter(|t| !t.is_empty())?;
        match self.parser.parse_token(token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                error!(error = %e, "failed to parse token");
                None
            }
        }
    }
}

fn request_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    match parse::bearer_token(headers) {
        Some(token) => Some(token),
        None => parse::body_token(headers, body),
    }
}

fn respond<D: Serialize>(result: Result<Reply<D>, AppError>) -> Response {
    match result {
        Ok(Reply::Data(data)) => Envelope::ok(data).into_response(),
        Ok(Reply::Stream(stream)) => stream.into_response(),
        Err(e) => {
            if e.status().is_server_error() {
                error!(error = %e, "handler failed");
            } else {
                warn!(error = %e, code = e.code(), "handler rejected request");
            }
            e.into_response()
        }
    }
}
