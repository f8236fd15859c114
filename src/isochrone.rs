use chrono::NaiveDateTime;
use itinera_core::prelude::*;
use rayon::prelude::*;

use crate::Snapshot;

/// Isochrone of every origin, computed in parallel with one engine per
/// worker thread. Results are in the order of `origins`.
pub fn bulk_isochrones(
    snapshot: &Snapshot,
    origins: &[EntryPoint],
    datetime: NaiveDateTime,
    duration_budget: Time,
    params: &SearchParams,
) -> Vec<Result<Vec<IsochroneEntry>, Error>> {
    let services = snapshot.services(None);
    origins
        .par_iter()
        .map_init(
            || RaptorEngine::new(snapshot.data()),
            |engine, origin| isochrone(engine, services, origin, datetime, duration_budget, params),
        )
        .collect()
}
