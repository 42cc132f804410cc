//! Unique test data, so tests sharing a store never collide.

use ulid::Ulid;

/// `{prefix}{ulid}`. Stays alphanumeric when `prefix` is, which keeps it a
/// valid username.
///
/// ```
/// use backend_test_support::unique_helpers::unique_username;
///
/// let a = unique_username("alice");
/// assert_ne!(a, unique_username("alice"));
/// assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn unique_username(prefix: &str) -> String {
    format!("{}{}", prefix, Ulid::new())
}

/// `{prefix}-{ulid}@example.test`
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.test", prefix, Ulid::new())
}

/// Movie ids are opaque strings to the backend.
pub fn unique_movie_id() -> String {
    Ulid::new().to_string().to_lowercase()
}
