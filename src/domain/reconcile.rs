// src/domain/reconcile.rs

use crate::domain::property::{Status, StoredProperty, ValidatedProperty};

/// What a re-sync is allowed to do to the stored status of an existing property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDecision {
    /// Overwrite the stored status with the incoming one.
    pub apply_incoming: bool,
    /// Release the manual pin.
    pub clear_manual: bool,
}

const APPLY: StatusDecision = StatusDecision {
    apply_incoming: true,
    clear_manual: false,
};
const APPLY_AND_RELEASE: StatusDecision = StatusDecision {
    apply_incoming: true,
    clear_manual: true,
};
const KEEP: StatusDecision = StatusDecision {
    apply_incoming: false,
    clear_manual: false,
};

/// Status override table.
///
/// | incoming    | stored manual | result            |
/// |-------------|---------------|-------------------|
/// | Unavailable | no            | apply, release    |
/// | Unavailable | yes           | apply, release    |
/// | Reserved    | no            | apply             |
/// | Reserved    | yes           | apply             |
/// | Available   | no            | apply             |
/// | Available   | yes           | keep stored       |
///
/// A manual pin only blocks a re-open to Available. Unavailable always wins
/// and drops the pin.
pub fn status_decision(incoming: Status, stored_is_manual: bool) -> StatusDecision {
    match (incoming, stored_is_manual) {
        (Status::Unavailable, false) => APPLY_AND_RELEASE,
        (Status::Unavailable, true) => APPLY_AND_RELEASE,
        (Status::Reserved, false) => APPLY,
        (Status::Reserved, true) => APPLY,
        (Status::Available, false) => APPLY,
        (Status::Available, true) => KEEP,
    }
}

/// Builds the updated stored record for an existing property.
///
/// Every sheet field is taken from `incoming` except the status, which goes
/// through [`status_decision`]. Coordinates survive only while the location
/// text is unchanged; a moved listing goes back into the geocoding backlog.
pub fn merge(existing: &StoredProperty, incoming: &ValidatedProperty) -> StoredProperty {
    let decision = status_decision(incoming.status, existing.status_is_manual);

    let mut record = incoming.clone();
    if !decision.apply_incoming {
        record.status = existing.record.status;
    }

    let (latitude, longitude) = if same_location(&existing.record, incoming) {
        (existing.latitude, existing.longitude)
    } else {
        (None, None)
    };

    StoredProperty {
        record,
        status_is_manual: existing.status_is_manual && !decision.clear_manual,
        latitude,
        longitude,
    }
}

/// Compared the way the geocoder keys its cache: trimmed and case-insensitive.
fn same_location(a: &ValidatedProperty, b: &ValidatedProperty) -> bool {
    let same = |x: &str, y: &str| x.trim().to_lowercase() == y.trim().to_lowercase();
    same(&a.address, &b.address)
        && same(&a.neighborhood, &b.neighborhood)
        && same(&a.province, &b.province)
}
