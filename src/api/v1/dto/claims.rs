/*
 * Responsibility
 * - Bearer token の payload から復号する claims 型
 * - 署名は検証していないので、認可の「参考情報」としてだけ使う
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Claims {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admin: bool,

    // Registered claims (RFC 7519), all optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}
