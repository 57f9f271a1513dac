/*
 * Responsibility
 * - handler から見える型 (契約) を固定する
 *   - RequestInfo: token から復号した claims (未検証)
 *   - WithRequestInfo: request 型に claims を受け取らせるための trait
 *   - Reply: callback の戻り値 (JSON data か stream か)
 */
use serde::Serialize;

use super::stream::Stream;

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Caller context attached to a parsed request.
///
/// `claims` is `None` when no token was sent or the token could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestInfo<C> {
    pub claims: Option<C>,
}

impl<C> RequestInfo<C> {
    pub fn new(claims: Option<C>) -> Self {
        Self { claims }
    }
}

// derive(Default) would require `C: Default`
impl<C> Default for RequestInfo<C> {
    fn default() -> Self {
        Self { claims: None }
    }
}

/// Request types that want the caller's claims implement this.
///
/// The default method drops the info, so request types that don't care can use an empty impl.
pub trait WithRequestInfo<C> {
    fn set_request_info(&mut self, info: RequestInfo<C>) {
        let _ = info;
    }
}

/// What a business callback hands back to the adapter.
#[derive(Debug)]
pub enum Reply<D> {
    /// Wrapped into `Envelope::ok` and sent as JSON.
    Data(D),
    /// Sent as an attachment, bypassing the envelope.
    Stream(Stream),
}

impl<D> Reply<D> {
    pub fn data(data: D) -> Self {
        Self::Data(data)
    }

    pub fn stream(stream: Stream) -> Self {
        Self::Stream(stream)
    }
}

impl<D> From<D> for Reply<D> {
    fn from(data: D) -> Self {
        Self::Data(data)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HandlerConfig {
    /// Upper bound for buffered request bodies, in bytes.
    pub body_limit: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}
