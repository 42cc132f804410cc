//! Task-local trace id for the request being served.
//!
//! `RequestTrace` opens the scope; error rendering and security logging read
//! from it. Outside a request the id is `"unknown"`.

use std::future::Future;

use tokio::task_local;

const UNKNOWN: &str = "unknown";

task_local! {
    static TRACE_ID: String;
}

/// Trace id of the current task, or `"unknown"`.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(String::clone)
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` installed.
pub async fn with_trace_id<F: Future>(trace_id: String, future: F) -> F::Output {
    TRACE_ID.scope(trace_id, future).await
}

/// Synchronous counterpart of `with_trace_id`, for the work a middleware's
/// `call` does while building the downstream future.
pub fn with_trace_id_sync<R>(trace_id: String, f: impl FnOnce() -> R) -> R {
    TRACE_ID.sync_scope(trace_id, f)
}
