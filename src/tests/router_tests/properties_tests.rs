use crate::db::properties::set_coordinates;
use crate::db::PropertyStore;
use crate::domain::property::Status;
use crate::errors::ServerError;
use crate::router::{handle, AppState};
use crate::tests::utils::{body_json, init_test_state, request, SHEET, TEST_SECRET};
use astra::Body;
use http::{Method, Request};

fn run_sync(state: &AppState) {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/sync")
        .header("X-Sync-Secret", TEST_SECRET)
        .body(Body::empty())
        .unwrap();
    let resp = handle(req, state).expect("Sync failed");
    assert_eq!(resp.status(), 200);
}

// Palermo sits inside, Belgrano outside.
const PALERMO_BOX: &str = r#"[
    {"lat": -34.57, "lng": -58.44},
    {"lat": -34.57, "lng": -58.41},
    {"lat": -34.60, "lng": -58.41},
    {"lat": -34.60, "lng": -58.44}
]"#;

#[test]
fn without_a_region_every_property_is_listed() {
    let (_dir, state) = init_test_state(Some(SHEET));
    run_sync(&state);

    let body = body_json(handle(request("GET", "/api/properties", None), &state).unwrap());
    assert_eq!(body["region_active"], false);
    assert_eq!(body["count"], 2);
}

#[test]
fn a_saved_region_filters_the_listing() {
    let (_dir, state) = init_test_state(Some(SHEET));
    run_sync(&state);
    state
        .db
        .with_conn(|conn| {
            set_coordinates(conn, "ZP-1", -34.585, -58.425)?;
            set_coordinates(conn, "ZP-2", -34.562, -58.456)
        })
        .unwrap();

    let resp = handle(request("PUT", "/api/region/polygon", Some(PALERMO_BOX)), &state).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_json(handle(request("GET", "/api/properties", None), &state).unwrap());
    assert_eq!(body["region_active"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["properties"][0]["external_id"], "ZP-1");
    assert_eq!(body["properties"][0]["has_pool"], true);
}

#[test]
fn manual_status_survives_a_resync() {
    let (_dir, state) = init_test_state(Some(SHEET));
    run_sync(&state);

    let resp = handle(
        request("PUT", "/api/properties/ZP-1/status", Some(r#"{"status": "Reserved"}"#)),
        &state,
    )
    .unwrap();
    let body = body_json(resp);
    assert_eq!(body["status"], "Reserved");

    run_sync(&state);

    let stored = state.db.find_by_external_id("ZP-1").unwrap().unwrap();
    assert_eq!(stored.record.status, Status::Reserved);
    assert!(stored.status_is_manual);
}

#[test]
fn status_update_rejects_unknown_values_and_ids() {
    let (_dir, state) = init_test_state(Some(SHEET));
    run_sync(&state);

    let err = handle(
        request("PUT", "/api/properties/ZP-1/status", Some(r#"{"status": "Sold"}"#)),
        &state,
    )
    .unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));

    let err = handle(
        request("PUT", "/api/properties/NOPE/status", Some(r#"{"status": "Available"}"#)),
        &state,
    )
    .unwrap_err();
    assert!(matches!(err, ServerError::NotFound));

    let err = handle(
        request("PUT", "/api/properties/ZP-1/status", Some("not json")),
        &state,
    )
    .unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn unknown_routes_and_methods() {
    let (_dir, state) = init_test_state(Some(SHEET));

    let err = handle(request("GET", "/api/nothing-here", None), &state).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));
    assert_eq!(err.status_code(), 404);

    let err = handle(request("POST", "/api/properties", None), &state).unwrap_err();
    assert!(matches!(err, ServerError::MethodNotAllowed));
    assert_eq!(err.status_code(), 405);
}
