use crate::auth::{provided_secret, secret_matches};
use crate::db::properties::{list_properties, set_manual_status};
use crate::db::Database;
use crate::domain::property::Status;
use crate::errors::ServerError;
use crate::geo::{filter_by_region, Coordinate};
use crate::geocoding::{geocode_missing, AddressQuery, SharedGeocoder};
use crate::region::{RegionStore, Viewport};
use crate::responses::{json_response, ResultResp};
use crate::sync::{run_sync, SourceFetcher};
use astra::Request;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::io::Read;
use std::time::Instant;

const MAX_BODY_BYTES: u64 = 1 << 20;

/// Everything a request handler needs. Built once in `main` and shared by
/// all workers.
pub struct AppState {
    pub db: Database,
    pub geocoder: SharedGeocoder,
    pub source: Box<dyn SourceFetcher + Send + Sync>,
    pub sync_secret: String,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().trim_end_matches('/').to_string();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "sync"]) => trigger_sync(&req, state),
        (_, ["api", "sync"]) => Err(ServerError::MethodNotAllowed),

        ("GET", ["api", "properties"]) => properties_in_region(state),
        ("PUT", ["api", "properties", id, "status"]) => {
            let id = id.to_string();
            update_status(req, state, &id)
        }

        ("GET", ["api", "region", "polygon"]) => {
            let polygon = RegionStore::new(&state.db).load_polygon()?;
            json_response(200, &json!({ "polygon": polygon }))
        }
        ("PUT", ["api", "region", "polygon"]) => {
            let polygon: Vec<Coordinate> = read_json(req)?;
            RegionStore::new(&state.db).save_polygon(&polygon)?;
            json_response(200, &json!({ "success": true }))
        }
        ("DELETE", ["api", "region", "polygon"]) => {
            RegionStore::new(&state.db).clear_polygon()?;
            json_response(200, &json!({ "success": true }))
        }

        ("GET", ["api", "region", "viewport"]) => {
            let viewport = RegionStore::new(&state.db).load_viewport()?;
            json_response(200, &json!({ "viewport": viewport }))
        }
        ("PUT", ["api", "region", "viewport"]) => {
            let viewport: Viewport = read_json(req)?;
            RegionStore::new(&state.db).save_viewport(&viewport)?;
            json_response(200, &json!({ "success": true }))
        }
        ("DELETE", ["api", "region", "viewport"]) => {
            RegionStore::new(&state.db).clear_viewport()?;
            json_response(200, &json!({ "success": true }))
        }

        ("POST", ["api", "geocode"]) => {
            let query: AddressQuery = read_json(req)?;
            json_response(200, &state.geocoder.resolve(&query))
        }
        ("DELETE", ["api", "geocode", "cache"]) => {
            state.geocoder.clear();
            json_response(200, &json!({ "success": true }))
        }
        ("POST", ["api", "geocode", "missing"]) => {
            let summary = geocode_missing(&state.db, &state.geocoder)?;
            json_response(200, &summary)
        }

        (_, ["api", "properties"])
        | (_, ["api", "properties", _, "status"])
        | (_, ["api", "region", "polygon" | "viewport"])
        | (_, ["api", "geocode"])
        | (_, ["api", "geocode", "cache" | "missing"]) => Err(ServerError::MethodNotAllowed),

        _ => Err(ServerError::NotFound),
    }
}

fn trigger_sync(req: &Request, state: &AppState) -> ResultResp {
    let authorized = provided_secret(req)
        .map(|s| secret_matches(&s, &state.sync_secret))
        .unwrap_or(false);
    if !authorized {
        log::warn!("Rejected sync trigger with missing or wrong secret");
        return Err(ServerError::Unauthorized);
    }

    let started = Instant::now();
    match run_sync(state.source.as_ref(), &state.db) {
        Ok(report) => {
            let mut body = json!({
                "success": true,
                "stats": report.stats(),
                "execution_time_ms": started.elapsed().as_millis() as u64,
            });
            if !report.errors().is_empty() {
                body["errors"] = json!(report.errors());
            }
            json_response(200, &body)
        }
        Err(e) => json_response(
            500,
            &json!({
                "success": false,
                "error": "Sync failed",
                "details": e.to_string(),
            }),
        ),
    }
}

fn properties_in_region(state: &AppState) -> ResultResp {
    let properties = state.db.with_conn(|conn| list_properties(conn))?;
    let polygon = RegionStore::new(&state.db).load_polygon()?;

    let filtered = filter_by_region(properties, polygon.as_deref());
    json_response(
        200,
        &json!({
            "region_active": polygon.is_some(),
            "count": filtered.len(),
            "properties": filtered,
        }),
    )
}

#[derive(Deserialize)]
struct StatusUpdate {
    status: String,
}

fn update_status(req: Request, state: &AppState, external_id: &str) -> ResultResp {
    let update: StatusUpdate = read_json(req)?;
    let status = Status::parse_cell(&update.status)
        .ok_or_else(|| ServerError::BadRequest(format!("Unknown status '{}'", update.status)))?;

    state
        .db
        .with_conn(|conn| set_manual_status(conn, external_id, status))?;
    json_response(200, &json!({ "success": true, "status": status }))
}

fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ServerError> {
    let mut body = String::new();
    req.into_body()
        .reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("Unreadable body: {e}")))?;

    Ok(serde_json::from_str(&body)?)
}
