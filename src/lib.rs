//! Handler adapter for axum: typed request parsing, validation, caller claims from a
//! bearer token, and a uniform `{code, message, data}` JSON envelope.

pub mod api;
pub mod app;
pub mod config;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod services;
pub mod state;

pub use envelope::Envelope;
pub use error::AppError;
pub use handler::{
    ApiHandler, FieldError, FormValue, HandlerConfig, MultipartRequest, Reply, RequestInfo,
    Stream, UploadedFile, WithRequestInfo,
};
pub use services::token_parser::{JwtPayloadParser, TokenError, TokenParser};
