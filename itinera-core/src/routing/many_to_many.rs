//! Batched search between sets of entry points in a single round loop

use chrono::NaiveDateTime;

use super::journeys::{Services, check_entry_points, to_datetime};
use super::raptor::common::Bound;
use super::raptor::{Path, RaptorEngine};
use crate::config::SearchParams;
use crate::fare::apply_fares;
use crate::model::entry_point::resolve_entry_point;
use crate::model::{DateTime, EntryPoint, SearchDirection, SeedPoint};
use crate::Error;

/// Journeys reaching one entry point of a many-to-many request
#[derive(Debug, Clone)]
pub struct NmResult {
    pub entry_point: EntryPoint,
    pub paths: Vec<Path>,
}

/// Runs one search seeded from every source set at once, then extracts
/// the Pareto optimal paths of each target set independently.
///
/// Seeds carry the index of their set in [`SeedPoint::entry`], which ends
/// up in the origin fallback of the extracted paths.
///
/// # Errors
///
/// Returns an error if the search is cancelled or a label chain is broken
pub fn compute_nm_all(
    engine: &mut RaptorEngine<'_>,
    sources: &[Vec<SeedPoint>],
    targets: &[Vec<SeedPoint>],
    init: DateTime,
    params: &SearchParams,
) -> Result<Vec<Vec<Path>>, Error> {
    let direction = params.direction;
    let seeds: Vec<SeedPoint> = sources.iter().flatten().copied().collect();
    let bound = params
        .max_duration
        .map_or(Bound::unbounded(direction), |max| {
            Bound::from_duration(direction, init, max)
        });
    engine.run(&seeds, &[], init, bound, params, false)?;

    targets
        .iter()
        .map(|target_set| {
            engine
                .pareto_solutions(target_set)
                .into_iter()
                .map(|(round, target)| engine.extract(round, target))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

/// Journeys between every origin and every destination.
///
/// Going forward the search is seeded from the origins and one result is
/// returned per destination, in input order. Going backward it is seeded
/// from the destinations and one result is returned per origin.
///
/// # Errors
///
/// * [`Error::DateOutOfBounds`] when `datetime` is outside the data period
/// * [`Error::NoOriginPoint`], [`Error::NoDestinationPoint`] or
///   [`Error::NoOriginNorDestinationPoint`] when no entry point of a side
///   resolves to a stop point
/// * [`Error::NoSolution`] when no pair is connected
pub fn compute_nm(
    engine: &mut RaptorEngine<'_>,
    services: Services<'_>,
    origins: &[EntryPoint],
    destinations: &[EntryPoint],
    datetime: NaiveDateTime,
    params: &SearchParams,
) -> Result<Vec<NmResult>, Error> {
    let data = engine.data();
    let init = to_datetime(data, datetime)?;
    let resolve = |entries: &[EntryPoint]| -> Vec<Vec<SeedPoint>> {
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| resolve_entry_point(data, services.street_network, entry, idx))
            .collect()
    };
    let origin_sets = resolve(origins);
    let destination_sets = resolve(destinations);
    check_entry_points(
        origin_sets.iter().all(Vec::is_empty),
        destination_sets.iter().all(Vec::is_empty),
    )?;

    let (sources, targets, keyed) = match params.direction {
        SearchDirection::Forward => (&origin_sets, &destination_sets, destinations),
        SearchDirection::Backward => (&destination_sets, &origin_sets, origins),
    };
    let per_target = compute_nm_all(engine, sources, targets, init, params)?;

    let mut results: Vec<NmResult> = keyed
        .iter()
        .zip(per_target)
        .map(|(entry_point, paths)| NmResult {
            entry_point: entry_point.clone(),
            paths,
        })
        .collect();
    if let Some(fare) = services.fare {
        for result in &mut results {
            apply_fares(fare, data, &mut result.paths);
        }
    }

    if results.iter().all(|r| r.paths.is_empty()) {
        return Err(Error::NoSolution);
    }
    Ok(results)
}
