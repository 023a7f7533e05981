// src/responses.rs
use crate::errors::ServerError;
use astra::{Body, Response, ResponseBuilder};
use serde::Serialize;
use serde_json::json;

pub type ResultResp = Result<Response, ServerError>;

/// Serialize `value` as a JSON response with the given status.
pub fn json_response<T: Serialize + ?Sized>(status: u16, value: &T) -> ResultResp {
    let body = serde_json::to_string(value).map_err(|_| ServerError::InternalError)?;

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body))
        .map_err(|_| ServerError::InternalError)
}

/// Convert a ServerError into a JSON error envelope.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status_code();
    if status >= 500 {
        log::error!("Request failed: {err}");
    }

    let body = json!({ "success": false, "error": err.to_string() });
    json_response(status, &body)
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
