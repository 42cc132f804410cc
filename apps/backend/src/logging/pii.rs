use std::fmt;

use lazy_regex::{lazy_regex, Lazy, Regex};

/// Email addresses anywhere in a message.
static EMAIL: Lazy<Regex> = lazy_regex!(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b");

/// Compact JWS tokens (`header.payload.signature`, base64url parts).
static JWT: Lazy<Regex> = lazy_regex!(r"\beyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+");

/// bcrypt digests such as `$2b$10$...`.
static BCRYPT_HASH: Lazy<Regex> = lazy_regex!(r"\$2[abxy]?\$\d{2}\$[./A-Za-z0-9]{53}");

/// Opaque base64-like runs of 16 or more characters.
static OPAQUE_TOKEN: Lazy<Regex> = lazy_regex!(r"\b[A-Za-z0-9+/]{16,}={0,2}\b");

/// Redacts sensitive information from a string.
///
/// Masks, in order:
/// - bcrypt hashes and JWTs, replaced with `[REDACTED_HASH]` / `[REDACTED_TOKEN]`
/// - emails, keeping the first character of the local part and the full domain
/// - any remaining opaque runs of 16+ base64 characters
pub fn redact(input: &str) -> String {
    let hashes = BCRYPT_HASH.replace_all(input, "[REDACTED_HASH]");
    let jwts = JWT.replace_all(&hashes, "[REDACTED_TOKEN]");

    let emails = EMAIL.replace_all(&jwts, |caps: &regex::Captures| {
        let full_match = &caps[0];
        match full_match.split_once('@') {
            Some((local, domain)) if !local.is_empty() => {
                format!("{}***@{domain}", &local[..1])
            }
            _ => full_match.to_string(),
        }
    });

    OPAQUE_TOKEN
        .replace_all(&emails, "[REDACTED_TOKEN]")
        .to_string()
}

/// Masks an account identifier such as a username: first character kept,
/// the rest replaced with `***`.
pub fn mask_identifier(input: &str) -> String {
    match input.chars().next() {
        Some(first) => format!("{first}***"),
        None => String::new(),
    }
}

/// A wrapper that redacts sensitive strings when displayed.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
