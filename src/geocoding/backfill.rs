use crate::db::connection::Database;
use crate::db::properties::{list_missing_coordinates, set_coordinates};
use crate::errors::ServerError;
use crate::geo::{is_within_argentina, Coordinate};
use crate::geocoding::{AddressQuery, Clock, GeocodeProvider, Geocoder};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillSummary {
    pub processed: usize,
    pub resolved: usize,
}

/// Geocodes every stored property that has no coordinates yet.
///
/// Results outside Argentina are discarded so they never reach the map.
pub fn geocode_missing<P, C>(
    db: &Database,
    geocoder: &Geocoder<P, C>,
) -> Result<BackfillSummary, ServerError>
where
    P: GeocodeProvider,
    C: Clock,
{
    let pending = db.with_conn(|conn| list_missing_coordinates(conn))?;
    if pending.is_empty() {
        return Ok(BackfillSummary::default());
    }

    let queries: Vec<AddressQuery> = pending
        .iter()
        .map(|p| AddressQuery::new(&p.record.address, &p.record.neighborhood, &p.record.province))
        .collect();

    log::info!("Geocoding {} properties without coordinates", queries.len());
    let results = geocoder.resolve_batch(&queries, |done, total| {
        if done % 10 == 0 || done == total {
            log::info!("Geocoding progress: {done}/{total}");
        }
    });

    let mut summary = BackfillSummary {
        processed: pending.len(),
        resolved: 0,
    };
    for (property, result) in pending.iter().zip(results) {
        let Some(result) = result else { continue };
        if !is_within_argentina(Coordinate::new(result.lat, result.lng)) {
            log::warn!(
                "Discarding out-of-country geocode for {}: ({}, {})",
                property.external_id(),
                result.lat,
                result.lng
            );
            continue;
        }
        db.with_conn(|conn| set_coordinates(conn, property.external_id(), result.lat, result.lng))?;
        summary.resolved += 1;
    }
    Ok(summary)
}
