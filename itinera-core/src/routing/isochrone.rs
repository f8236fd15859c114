//! One-to-all reachability within a duration budget

use chrono::NaiveDateTime;
use serde::Serialize;

use super::journeys::{Services, to_datetime};
use super::raptor::RaptorEngine;
use super::raptor::common::Bound;
use crate::config::SearchParams;
use crate::model::entry_point::resolve_entry_point;
use crate::model::{DateTime, EntryPoint, SearchDirection, SeedPoint};
use crate::{Error, RaptorStopId, Time};

/// Stop point reached by an isochrone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IsochroneEntry {
    pub stop: RaptorStopId,
    pub reach_time: DateTime,
    /// Seconds from the request time
    pub duration: Time,
    /// Smallest round reaching `reach_time`
    pub round: usize,
    pub transfers: usize,
}

/// Every stop point reachable within `duration_budget` of `init` from the
/// seeds, ordered by duration then stop uri.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] when the request was cancelled
pub fn isochrone_all(
    engine: &mut RaptorEngine<'_>,
    seeds: &[SeedPoint],
    init: DateTime,
    duration_budget: Time,
    params: &SearchParams,
) -> Result<Vec<IsochroneEntry>, Error> {
    let direction = params.direction;
    let bound = Bound::from_duration(direction, init, duration_budget);
    engine.run(seeds, &[], init, bound, params, false)?;

    let data = engine.data();
    let labels = engine.labels();
    let mut entries: Vec<IsochroneEntry> = (0..data.stops.len())
        .filter_map(|stop| {
            let round = labels.best_round(stop)?;
            let reach_time = labels.best(stop);
            let duration = direction.elapsed(init, reach_time);
            (duration <= duration_budget).then_some(IsochroneEntry {
                stop,
                reach_time,
                duration,
                round,
                transfers: round.saturating_sub(1),
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.duration
            .cmp(&b.duration)
            .then_with(|| data.stops[a.stop].uri.cmp(&data.stops[b.stop].uri))
    });
    Ok(entries)
}

/// Stop points reachable from `origin` (or, searching backward, from which
/// `origin` is reachable) within `duration_budget`.
///
/// # Errors
///
/// * [`Error::DateOutOfBounds`] when `datetime` is outside the data period
/// * [`Error::NoOriginPoint`] (forward) or [`Error::NoDestinationPoint`]
///   (backward) when the entry point resolves to no stop point
/// * [`Error::NoSolution`] when no stop point is reachable
pub fn isochrone(
    engine: &mut RaptorEngine<'_>,
    services: Services<'_>,
    origin: &EntryPoint,
    datetime: NaiveDateTime,
    duration_budget: Time,
    params: &SearchParams,
) -> Result<Vec<IsochroneEntry>, Error> {
    let data = engine.data();
    let init = to_datetime(data, datetime)?;
    let seeds = resolve_entry_point(data, services.street_network, origin, 0);
    if seeds.is_empty() {
        return Err(match params.direction {
            SearchDirection::Forward => Error::NoOriginPoint,
            SearchDirection::Backward => Error::NoDestinationPoint,
        });
    }

    let entries = isochrone_all(engine, &seeds, init, duration_budget, params)?;
    if entries.is_empty() {
        return Err(Error::NoSolution);
    }
    Ok(entries)
}
