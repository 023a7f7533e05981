// src/region.rs

use crate::db::KeyValueStore;
use crate::errors::ServerError;
use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};

pub const POLYGON_KEY: &str = "region.drawn_polygon";
pub const CENTER_KEY: &str = "region.map_center";
pub const ZOOM_KEY: &str = "region.map_zoom";

/// Last map position the user left the map at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// The single active drawn polygon and map viewport, kept in a key/value store.
///
/// Loads never fail on bad stored data: anything unreadable is treated as
/// "nothing saved".
pub struct RegionStore<'a, K: KeyValueStore + ?Sized> {
    kv: &'a K,
}

impl<'a, K: KeyValueStore + ?Sized> RegionStore<'a, K> {
    pub fn new(kv: &'a K) -> Self {
        Self { kv }
    }

    pub fn save_polygon(&self, polygon: &[Coordinate]) -> Result<(), ServerError> {
        if polygon.len() < 3 {
            return Err(ServerError::BadRequest(format!(
                "A region needs at least 3 points, got {}",
                polygon.len()
            )));
        }
        self.kv.set(POLYGON_KEY, &serde_json::to_string(polygon)?)
    }

    pub fn load_polygon(&self) -> Result<Option<Vec<Coordinate>>, ServerError> {
        let Some(raw) = self.kv.get(POLYGON_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Vec<Coordinate>>(&raw) {
            Ok(polygon) if polygon.len() >= 3 => Ok(Some(polygon)),
            Ok(polygon) => {
                log::warn!("Ignoring saved region with {} points", polygon.len());
                Ok(None)
            }
            Err(e) => {
                log::warn!("Ignoring unreadable saved region: {e}");
                Ok(None)
            }
        }
    }

    pub fn clear_polygon(&self) -> Result<(), ServerError> {
        self.kv.remove(POLYGON_KEY)
    }

    pub fn save_viewport(&self, viewport: &Viewport) -> Result<(), ServerError> {
        self.kv
            .set(CENTER_KEY, &serde_json::to_string(&viewport.center)?)?;
        self.kv.set(ZOOM_KEY, &viewport.zoom.to_string())
    }

    /// Both center and zoom must be present and readable.
    pub fn load_viewport(&self) -> Result<Option<Viewport>, ServerError> {
        let (Some(center_raw), Some(zoom_raw)) = (self.kv.get(CENTER_KEY)?, self.kv.get(ZOOM_KEY)?)
        else {
            return Ok(None);
        };

        let center = match serde_json::from_str::<Coordinate>(&center_raw) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Ignoring unreadable saved map center: {e}");
                return Ok(None);
            }
        };
        let zoom = match zoom_raw.trim().parse::<u8>() {
            Ok(z) => z,
            Err(_) => {
                log::warn!("Ignoring non-numeric saved map zoom '{zoom_raw}'");
                return Ok(None);
            }
        };

        Ok(Some(Viewport { center, zoom }))
    }

    pub fn clear_viewport(&self) -> Result<(), ServerError> {
        self.kv.remove(CENTER_KEY)?;
        self.kv.remove(ZOOM_KEY)
    }
}
