//! Payload of the access tokens this service issues.

use serde::{Deserialize, Serialize};

/// Inserted into request extensions by `JwtExtract` once a token verifies.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username at the time the token was issued
    pub sub: String,
    /// Stable user id; the request gate resolves identity by this
    pub uid: i64,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}
