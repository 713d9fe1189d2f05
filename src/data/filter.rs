use std::collections::BTreeSet;

use arrow::array::BooleanArray;

use super::error::TableError;
use super::model::{DROPOFF_LOCATION, PICKUP_LOCATION, TripTable};

// ---------------------------------------------------------------------------
// Airport predicate: pickup OR dropoff zone is an airport
// ---------------------------------------------------------------------------

/// Taxi-zone identifiers treated as airports.
pub type AirportIds = BTreeSet<i64>;

/// Boolean mask marking airport trips.
///
/// A row matches when its pickup zone or its dropoff zone is in `airport_ids`.
/// A null zone never matches, so a row with both zones null is always `false`.
pub fn airport_mask(table: &TripTable, airport_ids: &AirportIds) -> Result<BooleanArray, TableError> {
    let pickup = table.location_ids(PICKUP_LOCATION)?;
    let dropoff = table.location_ids(DROPOFF_LOCATION)?;

    let is_airport = |id: Option<i64>| id.is_some_and(|id| airport_ids.contains(&id));

    Ok(pickup
        .iter()
        .zip(dropoff.iter())
        .map(|(pu, dl)| Some(is_airport(pu) || is_airport(dl)))
        .collect())
}

/// Keep only airport trips, in their original order.
pub fn filter_airport_trips(table: &TripTable, airport_ids: &AirportIds) -> Result<TripTable, TableError> {
    let mask = airport_mask(table, airport_ids)?;
    table.filter(&mask)
}
