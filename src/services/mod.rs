/*
 * Responsibility
 * - HTTP に依存しないロジック (token payload の復号など)
 */
pub mod token_parser;

pub use token_parser::{JwtPayloadParser, TokenError, TokenParser};
