/*!
 * Handler adapter
 *
 * Responsibility:
 * - request の parse → validate → claims 付与 → callback 呼び出し → envelope 化
 * - axum 依存は adapter/parse に閉じ込め、request 側の契約は types/multipart に分離する
 *
 * Public API:
 * - ApiHandler, HandlerConfig
 * - RequestInfo, WithRequestInfo, Reply
 * - MultipartRequest, UploadedFile, FormValue, FieldError
 * - Stream
 */

mod adapter;
mod multipart;
mod parse;
mod stream;
mod types;

pub use adapter::ApiHandler;
pub use multipart::{FieldError, FormValue, MultipartRequest, UploadedFile, set_field};
pub use stream::Stream;
pub use types::{HandlerConfig, Reply, RequestInfo, WithRequestInfo};
