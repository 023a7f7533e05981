use crate::geocoding::GeocodeError;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// One match returned by a text-search geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
}

/// A free-text geocoding backend. Results are ordered best first.
pub trait GeocodeProvider: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}

impl<T: GeocodeProvider + ?Sized> GeocodeProvider for Box<T> {
    fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        (**self).search(query)
    }
}

/// Nominatim-compatible `/search` endpoint, filtered to one country.
pub struct NominatimProvider {
    client: Client,
    search_url: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

impl NominatimProvider {
    pub fn new(base_url: &Url, user_agent: &str, country: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        Ok(Self {
            client,
            search_url: format!("{}/search", base_url.as_str().trim_end_matches('/')),
            country: country.to_string(),
        })
    }
}

impl GeocodeProvider for NominatimProvider {
    fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let resp = self
            .client
            .get(&self.search_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.country.as_str()),
            ])
            .send()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = resp
            .json()
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        places.into_iter().map(to_candidate).collect()
    }
}

fn to_candidate(place: NominatimPlace) -> Result<GeocodeCandidate, GeocodeError> {
    let parse = |v: &str| {
        v.parse::<f64>()
            .map_err(|_| GeocodeError::Decode(format!("bad coordinate '{v}'")))
    };
    Ok(GeocodeCandidate {
        lat: parse(&place.lat)?,
        lng: parse(&place.lon)?,
        display_name: place.display_name,
    })
}
