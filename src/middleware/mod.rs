/*
 * Responsibility
 * - middleware の公開インターフェース
 * - 認証は middleware ではなく ApiHandler 側 (claims の付与のみ、拒否はしない)
 */
pub mod cors;
pub mod http;
pub mod security_headers;
