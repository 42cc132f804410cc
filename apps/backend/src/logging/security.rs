//! Structured security events. Identifiers are masked before they reach a sink.

use tracing::warn;

use crate::logging::pii::mask_identifier;
use crate::trace_ctx;

/// Log a failed login attempt.
pub fn login_failed(reason: &str, username: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_LOGIN_FAILED",
        %trace_id,
        username = %mask_identifier(username),
        reason,
        "Authentication failure"
    );
}

/// Log a bearer token that the request gate refused.
pub fn token_rejected(reason: &str, path: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_TOKEN_REJECTED",
        %trace_id,
        path,
        reason,
        "Bearer token rejected"
    );
}
