//! bcrypt password hashing.

use tracing::warn;

use crate::error::FieldError;
use crate::AppError;

/// bcrypt only reads this many bytes of input; anything longer would verify
/// against any password sharing its first 72 bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const PASSWORD_TOO_LONG: &str = "Password must be at most 72 bytes.";

/// Salted one-way hashing at a fixed bcrypt cost.
///
/// `hash` and `verify` are CPU-bound; from async code use the `_blocking`
/// variants, which run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Over-long input is a validation error rather than silently truncated.
    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::invalid(
                "Password too long",
                vec![FieldError::new("Password", PASSWORD_TOO_LONG)],
            ));
        }
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
    }

    /// `false` on mismatch, on input longer than `MAX_PASSWORD_BYTES`, and on
    /// a stored hash that does not parse.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AppError::internal(format!("hashing task failed: {e}")))?
    }

    pub async fn verify_blocking(&self, plaintext: String, hash: String) -> Result<bool, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &hash))
            .await
            .map_err(|e| AppError::internal(format!("verify task failed: {e}")))
    }
}
