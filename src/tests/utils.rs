use crate::db::connection::{init_db, Database};
use crate::geocoding::{
    GeocodeCandidate, GeocodeError, GeocodeProvider, Geocoder, SystemClock,
};
use crate::router::AppState;
use crate::sync::{SourceFetcher, SyncRunError};
use astra::{Body, Response};
use std::io::Read;
use tempfile::TempDir;

pub const TEST_SECRET: &str = "test-secret";

pub const SHEET: &str = "\
external_id,property_type,operation,status,price,currency,address,neighborhood,province,has_pool,amenities
ZP-1,House,Sale,Available,150000,USD,Gorriti 4000,Palermo,CABA,SI,\"['pileta', 'quincho']\"
ZP-2,Apartment,Rent,Reserved,450000,ARS,\"Cabildo 2000, 5B\",Belgrano,CABA,no,
ZP-3,Castle,Sale,Available,1,USD,,,,,
";

/// Serves a fixed document, or fails like an unreachable sheet when `None`.
pub struct FixedSource(pub Option<&'static str>);

impl SourceFetcher for FixedSource {
    fn fetch_document(&self) -> Result<String, SyncRunError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| SyncRunError::Network("connection refused".into()))
    }
}

/// Knows one address; everything else is not found.
pub struct OneAddressProvider;

impl GeocodeProvider for OneAddressProvider {
    fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        if query.starts_with("Gorriti 4000") {
            Ok(vec![GeocodeCandidate {
                lat: -34.585,
                lng: -58.425,
                display_name: "Gorriti 4000, Palermo, Buenos Aires".into(),
            }])
        } else {
            Ok(Vec::new())
        }
    }
}

/// A fresh state backed by a throwaway database. Keep the `TempDir` alive for
/// the duration of the test.
pub fn init_test_state(sheet: Option<&'static str>) -> (TempDir, AppState) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = Database::new(dir.path().join("test.sqlite3").to_string_lossy().to_string());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    let provider: Box<dyn GeocodeProvider> = Box::new(OneAddressProvider);
    let state = AppState {
        db,
        geocoder: Geocoder::new(provider, SystemClock::new()),
        source: Box::new(FixedSource(sheet)),
        sync_secret: TEST_SECRET.to_string(),
    };
    (dir, state)
}

pub fn body_json(resp: Response) -> serde_json::Value {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("not JSON ({e}): {body}"))
}

pub fn request(method: &str, uri: &str, body: Option<&str>) -> astra::Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap()
}
