use thiserror::Error;

/// Provider-side failures. The geocoder turns all of these into "not found".
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Geocoder HTTP {0}")]
    Status(u16),
    #[error("Unexpected geocoder response: {0}")]
    Decode(String),
}
