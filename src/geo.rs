// src/geo.rs

use crate::domain::property::StoredProperty;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Rough bounding box of Argentina, used to reject obviously wrong coordinates.
pub const ARGENTINA_LAT: (f64, f64) = (-55.0, -21.0);
pub const ARGENTINA_LNG: (f64, f64) = (-73.0, -53.0);

pub fn is_within_argentina(point: Coordinate) -> bool {
    (ARGENTINA_LAT.0..=ARGENTINA_LAT.1).contains(&point.lat)
        && (ARGENTINA_LNG.0..=ARGENTINA_LNG.1).contains(&point.lng)
}

/// Even-odd ray casting. The polygon is implicitly closed; fewer than three
/// vertices contain nothing.
pub fn contains(point: Coordinate, polygon: &[Coordinate]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].lng, polygon[i].lat);
        let (xj, yj) = (polygon[j].lng, polygon[j].lat);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// The property's coordinates, if it has plausible ones.
pub fn map_position(property: &StoredProperty) -> Option<Coordinate> {
    let point = Coordinate::new(property.latitude?, property.longitude?);
    is_within_argentina(point).then_some(point)
}

/// Restricts `properties` to the drawn region.
///
/// A missing or degenerate polygon means no spatial filter is active and the
/// collection is returned as is. Otherwise only properties with plausible
/// coordinates inside the polygon are kept.
pub fn filter_by_region(
    properties: Vec<StoredProperty>,
    polygon: Option<&[Coordinate]>,
) -> Vec<StoredProperty> {
    let polygon = match polygon {
        Some(p) if p.len() >= 3 => p,
        _ => return properties,
    };

    properties
        .into_iter()
        .filter(|p| map_position(p).is_some_and(|point| contains(point, polygon)))
        .collect()
}
