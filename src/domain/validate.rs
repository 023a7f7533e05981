// src/domain/validate.rs

use crate::csv_rows::RawRow;
use crate::domain::property::{
    AmenityFlags, Currency, Layout, Operation, PropertyType, Reliability, Status,
    ValidatedProperty,
};
use crate::sync::SyncError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const TRUE_TOKENS: &[&str] = &["true", "1", "si", "sí", "yes"];

/// Converts one raw sheet row into a validated record.
///
/// The gate fields are checked in a fixed order and the first failure is
/// returned. Every other field degrades to an empty value instead of failing.
pub fn validate_row(row: &RawRow, row_number: usize) -> Result<ValidatedProperty, SyncError> {
    let external_id = row.get("external_id");
    if external_id.is_empty() {
        return Err(SyncError::new(
            row_number,
            None,
            Some("external_id"),
            "Missing external identifier",
        ));
    }

    let fail = |field: &str, message: String| {
        SyncError::new(row_number, Some(external_id), Some(field), message)
    };

    let property_type = PropertyType::parse_cell(row.get("property_type")).ok_or_else(|| {
        fail(
            "property_type",
            format!("Invalid property type: '{}'", row.get("property_type")),
        )
    })?;

    let operation = Operation::parse_cell(row.get("operation")).ok_or_else(|| {
        fail(
            "operation",
            format!("Invalid operation: '{}'", row.get("operation")),
        )
    })?;

    let status = Status::parse_cell(row.get("status"))
        .ok_or_else(|| fail("status", format!("Invalid status: '{}'", row.get("status"))))?;

    let price = parse_number(row.get("price"))
        .filter(|p| *p > 0.0)
        .ok_or_else(|| fail("price", format!("Invalid price: '{}'", row.get("price"))))?;

    let currency = Currency::parse_cell(row.get("currency")).ok_or_else(|| {
        fail(
            "currency",
            format!("Invalid currency: '{}'", row.get("currency")),
        )
    })?;

    Ok(ValidatedProperty {
        external_id: external_id.to_string(),
        operation,
        property_type,
        status,
        price,
        currency,
        floor: parse_integer(row.get("floor")),
        rooms: parse_integer(row.get("rooms")),
        bedrooms: parse_integer(row.get("bedrooms")).filter(|n| *n >= 0),
        bathrooms: parse_integer(row.get("bathrooms")).filter(|n| *n >= 0),
        total_area: parse_number(row.get("total_area")),
        covered_area: parse_number(row.get("covered_area")),
        fees: parse_number(row.get("fees")),
        address: row.get("address").to_string(),
        neighborhood: row.get("neighborhood").to_string(),
        province: row.get("province").to_string(),
        age: row.get("age").to_string(),
        orientation: row.get("orientation").to_string(),
        layout: Layout::parse_cell(row.get("layout")),
        flags: AmenityFlags {
            has_garage: parse_bool(row.get("has_garage")),
            has_pool: parse_bool(row.get("has_pool")),
            has_garden: parse_bool(row.get("has_garden")),
            has_balcony: parse_bool(row.get("has_balcony")),
            has_terrace: parse_bool(row.get("has_terrace")),
            has_grill: parse_bool(row.get("has_grill")),
            is_furnished: parse_bool(row.get("is_furnished")),
            pets_allowed: parse_bool(row.get("pets_allowed")),
        },
        amenities: parse_list(row.get("amenities")),
        images: parse_list(row.get("images")),
        source_portal: row.get("source_portal").to_string(),
        source_url: row.get("source_url").to_string(),
        reliability: Reliability::parse_cell(row.get("reliability")),
        scraped_at: parse_datetime(row.get("scraped_at")),
    })
}

fn is_absent(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("n/a")
}

/// Accepts `.` or a lone `,` as the decimal separator.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if is_absent(cell) {
        return None;
    }
    cell.parse::<f64>()
        .ok()
        .or_else(|| cell.replace(',', ".").parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn parse_integer(cell: &str) -> Option<i64> {
    parse_number(cell)
        .filter(|n| n.fract() == 0.0)
        .map(|n| n as i64)
}

pub fn parse_bool(cell: &str) -> bool {
    let token = cell.trim().to_lowercase();
    TRUE_TOKENS.contains(&token.as_str())
}

/// Reads a JSON-ish string array such as `["a","b"]` or `['a', 'b']`.
pub fn parse_list(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    if is_absent(cell) {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(cell)
        .or_else(|_| serde_json::from_str::<Vec<String>>(&cell.replace('\'', "\"")))
        .unwrap_or_default()
}

pub fn parse_datetime(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if is_absent(cell) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(cell, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
