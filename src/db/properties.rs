use crate::db::connection::Database;
use crate::domain::property::{
    AmenityFlags, Currency, Layout, Operation, PropertyType, Reliability, Status,
    StoredProperty, ValidatedProperty,
};
use crate::errors::ServerError;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};

/// The datastore the sync pipeline reconciles against, keyed by external id.
pub trait PropertyStore {
    fn find_by_external_id(&self, external_id: &str)
        -> Result<Option<StoredProperty>, ServerError>;
    fn insert(&self, property: &StoredProperty) -> Result<(), ServerError>;
    fn update(&self, property: &StoredProperty) -> Result<(), ServerError>;
}

const SELECT_COLUMNS: &str = r#"
    external_id, operation, property_type, status, status_is_manual, price, currency,
    floor, rooms, bedrooms, bathrooms, total_area, covered_area, fees,
    address, neighborhood, province, age, orientation, layout,
    has_garage, has_pool, has_garden, has_balcony, has_terrace, has_grill,
    is_furnished, pets_allowed, amenities, images,
    source_portal, source_url, reliability, scraped_at, latitude, longitude
"#;

impl PropertyStore for Database {
    fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<StoredProperty>, ServerError> {
        self.with_conn(|conn| find_property(conn, external_id))
    }

    fn insert(&self, property: &StoredProperty) -> Result<(), ServerError> {
        self.with_conn(|conn| insert_property(conn, property))
    }

    fn update(&self, property: &StoredProperty) -> Result<(), ServerError> {
        self.with_conn(|conn| update_property(conn, property))
    }
}

pub fn find_property(
    conn: &Connection,
    external_id: &str,
) -> Result<Option<StoredProperty>, ServerError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM properties WHERE external_id = ?1");
    conn.query_row(&sql, params![external_id], row_to_property)
        .optional()
        .map_err(|e| ServerError::DbError(e.to_string()))
}

/// All stored properties, ordered by external id.
pub fn list_properties(conn: &Connection) -> Result<Vec<StoredProperty>, ServerError> {
    let sql = format!("SELECT {SELECT_COLUMNS} FROM properties ORDER BY external_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_property)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Properties that have never been geocoded.
pub fn list_missing_coordinates(conn: &Connection) -> Result<Vec<StoredProperty>, ServerError> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM properties \
         WHERE latitude IS NULL OR longitude IS NULL ORDER BY external_id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_property)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn insert_property(conn: &Connection, prop: &StoredProperty) -> Result<(), ServerError> {
    let now = Utc::now().naive_utc();
    let p = &prop.record;
    conn.execute(
        r#"
        INSERT INTO properties (
            external_id, operation, property_type, status, status_is_manual, price, currency,
            floor, rooms, bedrooms, bathrooms, total_area, covered_area, fees,
            address, neighborhood, province, age, orientation, layout,
            has_garage, has_pool, has_garden, has_balcony, has_terrace, has_grill,
            is_furnished, pets_allowed, amenities, images,
            source_portal, source_url, reliability, scraped_at, latitude, longitude,
            created_at, updated_at
        ) VALUES (
            :external_id, :operation, :property_type, :status, :status_is_manual, :price, :currency,
            :floor, :rooms, :bedrooms, :bathrooms, :total_area, :covered_area, :fees,
            :address, :neighborhood, :province, :age, :orientation, :layout,
            :has_garage, :has_pool, :has_garden, :has_balcony, :has_terrace, :has_grill,
            :is_furnished, :pets_allowed, :amenities, :images,
            :source_portal, :source_url, :reliability, :scraped_at, :latitude, :longitude,
            :now, :now
        )
        "#,
        named_params! {
            ":external_id": p.external_id,
            ":operation": p.operation.as_str(),
            ":property_type": p.property_type.as_str(),
            ":status": p.status.as_str(),
            ":status_is_manual": prop.status_is_manual,
            ":price": p.price,
            ":currency": p.currency.as_str(),
            ":floor": p.floor,
            ":rooms": p.rooms,
            ":bedrooms": p.bedrooms,
            ":bathrooms": p.bathrooms,
            ":total_area": p.total_area,
            ":covered_area": p.covered_area,
            ":fees": p.fees,
            ":address": p.address,
            ":neighborhood": p.neighborhood,
            ":province": p.province,
            ":age": p.age,
            ":orientation": p.orientation,
            ":layout": p.layout.map(|l| l.as_str()).unwrap_or(""),
            ":has_garage": p.flags.has_garage,
            ":has_pool": p.flags.has_pool,
            ":has_garden": p.flags.has_garden,
            ":has_balcony": p.flags.has_balcony,
            ":has_terrace": p.flags.has_terrace,
            ":has_grill": p.flags.has_grill,
            ":is_furnished": p.flags.is_furnished,
            ":pets_allowed": p.flags.pets_allowed,
            ":amenities": serde_json::to_string(&p.amenities)?,
            ":images": serde_json::to_string(&p.images)?,
            ":source_portal": p.source_portal,
            ":source_url": p.source_url,
            ":reliability": p.reliability.map(|r| r.as_str()).unwrap_or(""),
            ":scraped_at": p.scraped_at,
            ":latitude": prop.latitude,
            ":longitude": prop.longitude,
            ":now": now,
        },
    )?;
    Ok(())
}

/// Overwrites every column of an existing row. Coordinates are written as given,
/// so callers pass through whatever the stored record already had.
fn update_property(conn: &Connection, prop: &StoredProperty) -> Result<(), ServerError> {
    let now = Utc::now().naive_utc();
    let p = &prop.record;
    let changed = conn.execute(
        r#"
        UPDATE properties SET
            operation = :operation, property_type = :property_type, status = :status,
            status_is_manual = :status_is_manual, price = :price, currency = :currency,
            floor = :floor, rooms = :rooms, bedrooms = :bedrooms, bathrooms = :bathrooms,
            total_area = :total_area, covered_area = :covered_area, fees = :fees,
            address = :address, neighborhood = :neighborhood, province = :province,
            age = :age, orientation = :orientation, layout = :layout,
            has_garage = :has_garage, has_pool = :has_pool, has_garden = :has_garden,
            has_balcony = :has_balcony, has_terrace = :has_terrace, has_grill = :has_grill,
            is_furnished = :is_furnished, pets_allowed = :pets_allowed,
            amenities = :amenities, images = :images,
            source_portal = :source_portal, source_url = :source_url,
            reliability = :reliability, scraped_at = :scraped_at,
            latitude = :latitude, longitude = :longitude,
            updated_at = :now
        WHERE external_id = :external_id
        "#,
        named_params! {
            ":external_id": p.external_id,
            ":operation": p.operation.as_str(),
            ":property_type": p.property_type.as_str(),
            ":status": p.status.as_str(),
            ":status_is_manual": prop.status_is_manual,
            ":price": p.price,
            ":currency": p.currency.as_str(),
            ":floor": p.floor,
            ":rooms": p.rooms,
            ":bedrooms": p.bedrooms,
            ":bathrooms": p.bathrooms,
            ":total_area": p.total_area,
            ":covered_area": p.covered_area,
            ":fees": p.fees,
            ":address": p.address,
            ":neighborhood": p.neighborhood,
            ":province": p.province,
            ":age": p.age,
            ":orientation": p.orientation,
            ":layout": p.layout.map(|l| l.as_str()).unwrap_or(""),
            ":has_garage": p.flags.has_garage,
            ":has_pool": p.flags.has_pool,
            ":has_garden": p.flags.has_garden,
            ":has_balcony": p.flags.has_balcony,
            ":has_terrace": p.flags.has_terrace,
            ":has_grill": p.flags.has_grill,
            ":is_furnished": p.flags.is_furnished,
            ":pets_allowed": p.flags.pets_allowed,
            ":amenities": serde_json::to_string(&p.amenities)?,
            ":images": serde_json::to_string(&p.images)?,
            ":source_portal": p.source_portal,
            ":source_url": p.source_url,
            ":reliability": p.reliability.map(|r| r.as_str()).unwrap_or(""),
            ":scraped_at": p.scraped_at,
            ":latitude": prop.latitude,
            ":longitude": prop.longitude,
            ":now": now,
        },
    )?;

    if changed == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

/// Agent edit from the UI: sets the status and pins it against routine re-syncs.
pub fn set_manual_status(
    conn: &Connection,
    external_id: &str,
    status: Status,
) -> Result<(), ServerError> {
    let changed = conn.execute(
        "UPDATE properties SET status = ?1, status_is_manual = 1, updated_at = ?2 WHERE external_id = ?3",
        params![status.as_str(), Utc::now().naive_utc(), external_id],
    )?;
    if changed == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn set_coordinates(
    conn: &Connection,
    external_id: &str,
    latitude: f64,
    longitude: f64,
) -> Result<(), ServerError> {
    let changed = conn.execute(
        "UPDATE properties SET latitude = ?1, longitude = ?2, updated_at = ?3 WHERE external_id = ?4",
        params![latitude, longitude, Utc::now().naive_utc(), external_id],
    )?;
    if changed == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

/// Reads a closed-enum text column, failing the row on unknown values.
fn enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unexpected value '{raw}'").into(),
        )
    })
}

fn json_list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_property(row: &Row<'_>) -> rusqlite::Result<StoredProperty> {
    let layout: String = row.get(19)?;
    let reliability: String = row.get(32)?;

    Ok(StoredProperty {
        record: ValidatedProperty {
            external_id: row.get(0)?,
            operation: enum_column(row, 1, Operation::parse_cell)?,
            property_type: enum_column(row, 2, PropertyType::parse_cell)?,
            status: enum_column(row, 3, Status::parse_cell)?,
            price: row.get(5)?,
            currency: enum_column(row, 6, Currency::parse_cell)?,
            floor: row.get(7)?,
            rooms: row.get(8)?,
            bedrooms: row.get(9)?,
            bathrooms: row.get(10)?,
            total_area: row.get(11)?,
            covered_area: row.get(12)?,
            fees: row.get(13)?,
            address: row.get(14)?,
            neighborhood: row.get(15)?,
            province: row.get(16)?,
            age: row.get(17)?,
            orientation: row.get(18)?,
            layout: Layout::parse_cell(&layout),
            flags: AmenityFlags {
                has_garage: row.get(20)?,
                has_pool: row.get(21)?,
                has_garden: row.get(22)?,
                has_balcony: row.get(23)?,
                has_terrace: row.get(24)?,
                has_grill: row.get(25)?,
                is_furnished: row.get(26)?,
                pets_allowed: row.get(27)?,
            },
            amenities: json_list_column(row, 28)?,
            images: json_list_column(row, 29)?,
            source_portal: row.get(30)?,
            source_url: row.get(31)?,
            reliability: Reliability::parse_cell(&reliability),
            scraped_at: row.get(33)?,
        },
        status_is_manual: row.get(4)?,
        latitude: row.get(34)?,
        longitude: row.get(35)?,
    })
}
