mod backfill;
mod client;
mod clock;
mod geocode_error;
mod provider;

pub use backfill::{geocode_missing, BackfillSummary};
pub use client::{AddressQuery, GeocodeResult, Geocoder, SharedGeocoder};
pub use clock::{Clock, SystemClock};
pub use geocode_error::GeocodeError;
pub use provider::{GeocodeCandidate, GeocodeProvider, NominatimProvider};
