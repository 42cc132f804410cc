#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::test;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Login refusals are a plain `{message, code, trace_id}` body with status
/// 400. Returns the body for further checks.
pub async fn assert_login_refused(
    resp: ServiceResponse<BoxBody>,
    expected_message: &str,
    expected_code: &str,
) -> Value {
    assert_eq!(resp.status().as_u16(), 400);

    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("x-request-id header should be present")
        .to_string();

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], expected_message);
    assert_eq!(body["code"], expected_code);
    assert_eq!(
        body["trace_id"].as_str(),
        Some(request_id.as_str()),
        "trace_id in body should match x-request-id header"
    );
    assert!(body.get("token").is_none(), "refusals never carry a token");
    body
}
