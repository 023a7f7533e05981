use crate::db::PropertyStore;
use crate::domain::property::Status;
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_json, init_test_state, SHEET, TEST_SECRET};
use astra::Body;
use http::{Method, Request};

fn sync_request(secret: Option<&str>) -> astra::Request {
    let mut builder = Request::builder().method(Method::POST).uri("/api/sync");
    if let Some(s) = secret {
        builder = builder.header("X-Sync-Secret", s);
    }
    builder.body(Body::empty()).unwrap()
}

#[test]
fn sync_requires_the_secret() {
    let (_dir, state) = init_test_state(Some(SHEET));

    let err = handle(sync_request(None), &state).unwrap_err();
    assert!(matches!(err, ServerError::Unauthorized));

    let err = handle(sync_request(Some("wrong")), &state).unwrap_err();
    assert!(matches!(err, ServerError::Unauthorized));

    assert!(state.db.find_by_external_id("ZP-1").unwrap().is_none());
}

#[test]
fn sync_reports_stats_and_row_errors() {
    let (_dir, state) = init_test_state(Some(SHEET));

    let resp = handle(sync_request(Some(TEST_SECRET)), &state).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_json(resp);
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["total_rows"], 3);
    assert_eq!(body["stats"]["inserted"], 2);
    assert_eq!(body["stats"]["skipped"], 1);
    assert_eq!(body["stats"]["errors"], 1);
    assert!(body["execution_time_ms"].is_u64());

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["row_number"], 4);
    assert_eq!(errors[0]["external_id"], "ZP-3");
    assert_eq!(errors[0]["field"], "property_type");

    let stored = state.db.find_by_external_id("ZP-2").unwrap().unwrap();
    assert_eq!(stored.record.address, "Cabildo 2000, 5B");
    assert_eq!(stored.record.status, Status::Reserved);
}

#[test]
fn bearer_header_is_accepted_and_rerun_updates() {
    let (_dir, state) = init_test_state(Some(SHEET));
    let bearer = || {
        Request::builder()
            .method(Method::POST)
            .uri("/api/sync")
            .header("Authorization", format!("Bearer {TEST_SECRET}"))
            .body(Body::empty())
            .unwrap()
    };

    handle(bearer(), &state).expect("first run");
    let before = state.db.find_by_external_id("ZP-1").unwrap().unwrap();

    let body = body_json(handle(bearer(), &state).expect("second run"));
    assert_eq!(body["stats"]["inserted"], 0);
    assert_eq!(body["stats"]["updated"], 2);

    let after = state.db.find_by_external_id("ZP-1").unwrap().unwrap();
    assert_eq!(before, after);
}

#[test]
fn unreachable_source_is_a_failure_envelope() {
    let (_dir, state) = init_test_state(None);

    let resp = handle(sync_request(Some(TEST_SECRET)), &state).expect("Handler failed");
    assert_eq!(resp.status(), 500);

    let body = body_json(resp);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Sync failed");
    assert!(body["details"].as_str().unwrap().contains("connection refused"));
    assert!(body.get("stats").is_none());
}

#[test]
fn sync_only_accepts_post() {
    let (_dir, state) = init_test_state(Some(SHEET));
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/sync")
        .body(Body::empty())
        .unwrap();
    assert!(matches!(handle(req, &state), Err(ServerError::MethodNotAllowed)));
}
