use crate::router::handle;
use crate::tests::utils::{body_json, init_test_state, request, SHEET};

#[test]
fn known_address_resolves_and_is_cached() {
    let (_dir, state) = init_test_state(None);
    let query = r#"{"address": "Gorriti 4000", "neighborhood": "Palermo"}"#;

    let body = body_json(handle(request("POST", "/api/geocode", Some(query)), &state).unwrap());
    assert_eq!(body["lat"], -34.585);
    assert_eq!(body["resolved_address"], "Gorriti 4000, Palermo, Buenos Aires");
    assert_eq!(state.geocoder.cached_entries(), 1);

    handle(request("DELETE", "/api/geocode/cache", None), &state).unwrap();
    assert_eq!(state.geocoder.cached_entries(), 0);
}

#[test]
fn empty_query_resolves_to_null() {
    let (_dir, state) = init_test_state(None);
    let body = body_json(handle(request("POST", "/api/geocode", Some("{}")), &state).unwrap());
    assert!(body.is_null());
}

#[test]
fn backfill_stores_what_resolves() {
    let (_dir, state) = init_test_state(Some(SHEET));
    let sync = http::Request::builder()
        .method("POST")
        .uri("/api/sync")
        .header("X-Sync-Secret", crate::tests::utils::TEST_SECRET)
        .body(astra::Body::empty())
        .unwrap();
    handle(sync, &state).unwrap();

    let body =
        body_json(handle(request("POST", "/api/geocode/missing", None), &state).unwrap());
    assert_eq!(body["processed"], 2);
    assert_eq!(body["resolved"], 1);

    let listing = body_json(handle(request("GET", "/api/properties", None), &state).unwrap());
    let geocoded: Vec<_> = listing["properties"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|p| !p["latitude"].is_null())
        .collect();
    assert_eq!(geocoded.len(), 1);
    assert_eq!(geocoded[0]["external_id"], "ZP-1");
}
