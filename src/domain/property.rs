// src/domain/property.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Implements the cell-token parsing and storage name for a closed enumeration.
/// Matching is case-insensitive and accepts every alias listed for a variant.
macro_rules! closed_enum {
    ($name:ident { $($variant:ident => $stored:literal [$($alias:literal),*]),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical name used in the database and in JSON.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $stored),+
                }
            }

            /// Parses a spreadsheet cell, returning `None` for anything outside the set.
            pub fn parse_cell(raw: &str) -> Option<Self> {
                let token = raw.trim().to_lowercase();
                $(
                    if token == $stored.to_lowercase() $(|| token == $alias)* {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Sale,
    Rent,
}

closed_enum!(Operation {
    Sale => "Sale" ["venta"],
    Rent => "Rent" ["alquiler"],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Apartment,
    #[serde(rename = "PH")]
    Ph,
    Retail,
    Office,
    Warehouse,
    Land,
    Commercial,
}

closed_enum!(PropertyType {
    House => "House" ["casa"],
    Apartment => "Apartment" ["departamento", "depto"],
    Ph => "PH" [],
    Retail => "Retail" ["local"],
    Office => "Office" ["oficina"],
    Warehouse => "Warehouse" ["galpon", "galpón", "deposito", "depósito"],
    Land => "Land" ["terreno", "lote"],
    Commercial => "Commercial" ["comercial", "fondo de comercio"],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Available,
    Reserved,
    Unavailable,
}

closed_enum!(Status {
    Available => "Available" ["disponible"],
    Reserved => "Reserved" ["reservado", "reservada"],
    Unavailable => "Unavailable" ["no disponible", "no_disponible", "vendido", "alquilado"],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "ARS")]
    Ars,
}

closed_enum!(Currency {
    Usd => "USD" ["u$s", "us$", "u$d"],
    Ars => "ARS" ["$", "pesos"],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    Front,
    Rear,
    Side,
    Interior,
}

closed_enum!(Layout {
    Front => "Front" ["frente"],
    Rear => "Rear" ["contrafrente"],
    Side => "Side" ["lateral"],
    Interior => "Interior" ["interno"],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reliability {
    High,
    Medium,
    Low,
}

closed_enum!(Reliability {
    High => "High" ["alta"],
    Medium => "Medium" ["media"],
    Low => "Low" ["baja"],
});

/// Boolean amenity columns, in the order they appear in the sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmenityFlags {
    pub has_garage: bool,
    pub has_pool: bool,
    pub has_garden: bool,
    pub has_balcony: bool,
    pub has_terrace: bool,
    pub has_grill: bool,
    pub is_furnished: bool,
    pub pets_allowed: bool,
}

/// Canonical listing record produced from one source row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedProperty {
    pub external_id: String,
    pub operation: Operation,
    pub property_type: PropertyType,
    pub status: Status,
    pub price: f64,
    pub currency: Currency,

    pub floor: Option<i64>,
    pub rooms: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<i64>,
    pub total_area: Option<f64>,
    pub covered_area: Option<f64>,
    pub fees: Option<f64>,

    pub address: String,
    pub neighborhood: String,
    pub province: String,
    pub age: String,
    pub orientation: String,
    /// `None` when the cell was empty or not a known layout.
    pub layout: Option<Layout>,

    #[serde(flatten)]
    pub flags: AmenityFlags,
    pub amenities: Vec<String>,
    pub images: Vec<String>,

    // Provenance
    pub source_portal: String,
    pub source_url: String,
    pub reliability: Option<Reliability>,
    pub scraped_at: Option<NaiveDateTime>,
}

/// A property as persisted: the validated record plus state owned by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProperty {
    #[serde(flatten)]
    pub record: ValidatedProperty,
    /// Set when an agent edits the status by hand. Sync only ever clears it.
    pub status_is_manual: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StoredProperty {
    /// A freshly inserted property: never manual, never geocoded.
    pub fn from_validated(record: ValidatedProperty) -> Self {
        Self {
            record,
            status_is_manual: false,
            latitude: None,
            longitude: None,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.record.external_id
    }
}
