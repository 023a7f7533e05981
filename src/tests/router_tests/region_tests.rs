use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_json, init_test_state, request};

const TRIANGLE: &str =
    r#"[{"lat":-34.5,"lng":-58.5},{"lat":-34.6,"lng":-58.3},{"lat":-34.7,"lng":-58.5}]"#;

#[test]
fn polygon_put_get_delete() {
    let (_dir, state) = init_test_state(None);

    let body = body_json(handle(request("GET", "/api/region/polygon", None), &state).unwrap());
    assert!(body["polygon"].is_null());

    handle(request("PUT", "/api/region/polygon", Some(TRIANGLE)), &state).unwrap();
    let body = body_json(handle(request("GET", "/api/region/polygon", None), &state).unwrap());
    assert_eq!(body["polygon"].as_array().unwrap().len(), 3);
    assert_eq!(body["polygon"][1]["lng"], -58.3);

    handle(request("DELETE", "/api/region/polygon", None), &state).unwrap();
    let body = body_json(handle(request("GET", "/api/region/polygon", None), &state).unwrap());
    assert!(body["polygon"].is_null());
}

#[test]
fn polygon_with_too_few_points_is_rejected() {
    let (_dir, state) = init_test_state(None);
    let err = handle(
        request(
            "PUT",
            "/api/region/polygon",
            Some(r#"[{"lat":-34.5,"lng":-58.5},{"lat":-34.6,"lng":-58.3}]"#),
        ),
        &state,
    )
    .unwrap_err();
    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn viewport_put_get_delete() {
    let (_dir, state) = init_test_state(None);

    handle(
        request(
            "PUT",
            "/api/region/viewport",
            Some(r#"{"center":{"lat":-34.6,"lng":-58.4},"zoom":12}"#),
        ),
        &state,
    )
    .unwrap();

    let body = body_json(handle(request("GET", "/api/region/viewport", None), &state).unwrap());
    assert_eq!(body["viewport"]["zoom"], 12);
    assert_eq!(body["viewport"]["center"]["lat"], -34.6);

    handle(request("DELETE", "/api/region/viewport", None), &state).unwrap();
    let body = body_json(handle(request("GET", "/api/region/viewport", None), &state).unwrap());
    assert!(body["viewport"].is_null());
}
