use jsonwebtoken::Algorithm;
use time::Duration;

use crate::config::settings::DEFAULT_BCRYPT_COST;

/// Token lifetime: seven days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(7);

/// Signing and hashing settings, injected at startup.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// How long a minted token stays valid
    pub token_ttl: Duration,
    /// bcrypt work factor for new hashes
    pub bcrypt_cost: u32,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: DEFAULT_TOKEN_TTL,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Fixed secret and the cheapest bcrypt cost.
    pub fn for_tests() -> Self {
        Self::new(b"test_secret_for_myflix_backend_tests".to_vec()).with_bcrypt_cost(4)
    }
}
