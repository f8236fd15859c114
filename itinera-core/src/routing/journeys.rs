//! Single pair journey requests

use chrono::NaiveDateTime;
use log::debug;

use crate::config::SearchParams;
use crate::fare::{FareCalculator, apply_fares};
use crate::model::entry_point::resolve_entry_point;
use crate::model::{DateTime, EntryPoint, SearchDirection, SeedPoint};
use crate::routing::raptor::{Path, RaptorEngine};
use crate::street::StreetNetwork;
use crate::{Error, PublicTransitData};

/// Collaborators consulted before and after the round loop
#[derive(Clone, Copy)]
pub struct Services<'s> {
    pub street_network: &'s dyn StreetNetwork,
    pub fare: Option<&'s dyn FareCalculator>,
}

impl<'s> Services<'s> {
    pub fn new(street_network: &'s dyn StreetNetwork) -> Self {
        Self {
            street_network,
            fare: None,
        }
    }

    #[must_use]
    pub fn with_fare(mut self, fare: &'s dyn FareCalculator) -> Self {
        self.fare = Some(fare);
        self
    }
}

/// Best journey for one requested time of [`compute_many_dates`]
#[derive(Debug, Clone)]
pub struct DatedPath {
    pub request_time: DateTime,
    pub path: Option<Path>,
    /// Direct street journey at this time
    pub street_path: Option<Path>,
}

pub(crate) fn check_entry_points(
    origins_empty: bool,
    destinations_empty: bool,
) -> Result<(), Error> {
    match (origins_empty, destinations_empty) {
        (true, true) => Err(Error::NoOriginNorDestinationPoint),
        (true, false) => Err(Error::NoOriginPoint),
        (false, true) => Err(Error::NoDestinationPoint),
        (false, false) => Ok(()),
    }
}

pub(crate) fn to_datetime(data: &PublicTransitData, datetime: NaiveDateTime) -> Result<DateTime, Error> {
    data.validity
        .to_datetime(datetime)
        .ok_or(Error::DateOutOfBounds)
}

fn street_path(
    data: &PublicTransitData,
    services: Services<'_>,
    origin: &EntryPoint,
    destination: &EntryPoint,
    init: DateTime,
    direction: SearchDirection,
) -> Option<Path> {
    let street = services
        .street_network
        .direct_path(data, origin, destination)?;
    let departure = match direction {
        SearchDirection::Forward => init,
        SearchDirection::Backward => init.saturating_sub(street.duration),
    };
    Some(Path::street_only(init, departure, street.duration))
}

fn resolve_pair(
    data: &PublicTransitData,
    services: Services<'_>,
    origin: &EntryPoint,
    destination: &EntryPoint,
) -> (Vec<SeedPoint>, Vec<SeedPoint>) {
    (
        resolve_entry_point(data, services.street_network, origin, 0),
        resolve_entry_point(data, services.street_network, destination, 0),
    )
}

/// Pareto optimal journeys by (time, transfers) from `origin` to
/// `destination`, followed by the direct street journey when there is one.
///
/// # Errors
///
/// * [`Error::DateOutOfBounds`] when `datetime` is outside the data period
/// * [`Error::NoOriginPoint`], [`Error::NoDestinationPoint`] or
///   [`Error::NoOriginNorDestinationPoint`] when an entry point resolves to
///   no stop point and no direct street journey exists
/// * [`Error::NoSolution`] when nothing was found
pub fn compute(
    engine: &mut RaptorEngine<'_>,
    services: Services<'_>,
    origin: &EntryPoint,
    destination: &EntryPoint,
    datetime: NaiveDateTime,
    params: &SearchParams,
) -> Result<Vec<Path>, Error> {
    let data = engine.data();
    let init = to_datetime(data, datetime)?;
    let (origins, destinations) = resolve_pair(data, services, origin, destination);
    let direct = street_path(data, services, origin, destination, init, params.direction);

    if let Err(e) = check_entry_points(origins.is_empty(), destinations.is_empty()) {
        return direct.map(|path| vec![path]).ok_or(e);
    }

    let mut paths = engine.compute_all(&origins, &destinations, init, None, params)?;
    if let Some(fare) = services.fare {
        apply_fares(fare, data, &mut paths);
    }
    paths.extend(direct);

    if paths.is_empty() {
        return Err(Error::NoSolution);
    }
    Ok(paths)
}

/// Best journey for each requested time.
///
/// Times are processed from the one closest to the journey end backwards
/// (latest first going forward) so the result of one time bounds the
/// search of the next. Results are in chronological order.
///
/// # Errors
///
/// Same as [`compute`]; [`Error::NoSolution`] only when no requested time
/// has any journey.
pub fn compute_many_dates(
    engine: &mut RaptorEngine<'_>,
    services: Services<'_>,
    origin: &EntryPoint,
    destination: &EntryPoint,
    datetimes: &[NaiveDateTime],
    params: &SearchParams,
) -> Result<Vec<DatedPath>, Error> {
    let data = engine.data();
    let direction = params.direction;
    let mut inits = datetimes
        .iter()
        .map(|&datetime| to_datetime(data, datetime))
        .collect::<Result<Vec<_>, _>>()?;
    inits.sort_unstable();
    let (origins, destinations) = resolve_pair(data, services, origin, destination);

    let mut results: Vec<DatedPath> = Vec::with_capacity(inits.len());
    if let Err(e) = check_entry_points(origins.is_empty(), destinations.is_empty()) {
        results.extend(inits.iter().map(|&init| DatedPath {
            request_time: init,
            path: None,
            street_path: street_path(data, services, origin, destination, init, direction),
        }));
        if results.iter().all(|r| r.street_path.is_none()) {
            return Err(e);
        }
        return Ok(results);
    }

    if direction.clockwise() {
        inits.reverse();
    }
    let mut limit = None;
    for init in inits {
        let paths = engine.compute_all(&origins, &destinations, init, limit, params)?;
        let mut best = paths.into_iter().last();
        if let Some(path) = &mut best {
            limit = Some(match direction {
                SearchDirection::Forward => path.arrival,
                SearchDirection::Backward => path.departure,
            });
            if let Some(fare) = services.fare {
                apply_fares(fare, data, std::slice::from_mut(path));
            }
        }
        debug!("Request time {init}: running limit {limit:?}");
        results.push(DatedPath {
            request_time: init,
            path: best,
            street_path: street_path(data, services, origin, destination, init, direction),
        });
    }
    results.sort_by_key(|r| r.request_time);

    if results
        .iter()
        .all(|r| r.path.is_none() && r.street_path.is_none())
    {
        return Err(Error::NoSolution);
    }
    Ok(results)
}
