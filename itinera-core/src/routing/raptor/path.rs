use serde::Serialize;

use super::common::{ArrivalProvenance, BoardProvenance, LabelStore};
use crate::fare::Fare;
use crate::model::{DateTime, DateTimeUtils, SearchDirection, SeedPoint};
use crate::{Error, PublicTransitData, RaptorStopId, RouteId, Time, TripId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    PublicTransport,
    Transfer,
    Waiting,
    /// Staying in the vehicle while it continues as another trip
    StayIn,
    /// Direct journey computed by the street network
    StreetNetwork,
}

/// Section of a journey
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathItem {
    pub kind: ItemType,
    pub stop_points: Vec<RaptorStopId>,
    /// Per stop point times of a public transport section
    pub arrivals: Vec<DateTime>,
    pub departures: Vec<DateTime>,
    pub trip: Option<TripId>,
    pub departure: DateTime,
    pub arrival: DateTime,
}

impl PathItem {
    fn between(
        kind: ItemType,
        stop_points: Vec<RaptorStopId>,
        departure: DateTime,
        arrival: DateTime,
    ) -> Self {
        Self {
            kind,
            stop_points,
            arrivals: Vec::new(),
            departures: Vec::new(),
            trip: None,
            departure,
            arrival,
        }
    }

    pub fn duration(&self) -> Time {
        self.arrival.saturating_sub(self.departure)
    }

    fn first_stop(&self) -> Option<RaptorStopId> {
        self.stop_points.first().copied()
    }

    fn last_stop(&self) -> Option<RaptorStopId> {
        self.stop_points.last().copied()
    }
}

/// Street part between an entry point and the first or last stop point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fallback {
    pub stop: RaptorStopId,
    pub duration: Time,
    /// Index of the entry point in the request
    pub entry: usize,
}

/// Journey returned to the caller, items in journey order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub items: Vec<PathItem>,
    pub nb_transfers: usize,
    pub request_time: DateTime,
    /// Leaving the origin entry point, access included
    pub departure: DateTime,
    /// Reaching the destination entry point, egress included
    pub arrival: DateTime,
    pub origin: Option<Fallback>,
    pub destination: Option<Fallback>,
    pub fare: Option<Fare>,
}

impl Path {
    pub fn duration(&self) -> Time {
        self.arrival.saturating_sub(self.departure)
    }

    pub fn public_transport_items(&self) -> impl Iterator<Item = &PathItem> {
        self.items
            .iter()
            .filter(|item| item.kind == ItemType::PublicTransport)
    }

    /// Journey made by the street network alone
    pub fn street_only(request_time: DateTime, departure: DateTime, duration: Time) -> Self {
        let arrival = departure.saturating_add(duration);
        Self {
            items: vec![PathItem::between(
                ItemType::StreetNetwork,
                Vec::new(),
                departure,
                arrival,
            )],
            nb_transfers: 0,
            request_time,
            departure,
            arrival,
            origin: None,
            destination: None,
            fare: None,
        }
    }
}

fn malformed(round: usize, stop: RaptorStopId, what: &str) -> Error {
    debug_assert!(false, "{what} at label ({round}, {stop})");
    Error::MalformedLabelState(format!("{what} at label ({round}, {stop})"))
}

fn vehicle_item(
    data: &PublicTransitData,
    route: RouteId,
    trip: usize,
    service_day: u32,
    from_pos: usize,
    to_pos: usize,
) -> Result<PathItem, Error> {
    let (lo, hi) = (from_pos.min(to_pos), from_pos.max(to_pos));
    let stops = data.get_route_stops(route)?;
    let times = data.get_trip(route, trip)?;
    let stop_points = stops.get(lo..=hi).ok_or(crate::RaptorError::InvalidJourney)?;
    let times = times.get(lo..=hi).ok_or(crate::RaptorError::InvalidJourney)?;
    let arrivals: Vec<DateTime> = times
        .iter()
        .map(|st| DateTimeUtils::on_day(service_day, st.arrival))
        .collect();
    let departures: Vec<DateTime> = times
        .iter()
        .map(|st| DateTimeUtils::on_day(service_day, st.departure))
        .collect();
    Ok(PathItem {
        kind: ItemType::PublicTransport,
        stop_points: stop_points.to_vec(),
        departure: departures[0],
        arrival: arrivals[arrivals.len() - 1],
        arrivals,
        departures,
        trip: Some(data.trip_id(route, trip)?),
    })
}

/// Walks the label chain from `target` in `round` down to its round 0
/// seed and assembles the journey.
///
/// # Errors
///
/// Returns [`Error::MalformedLabelState`] when the chain reaches an
/// unreached label, a vehicle label in round 0, or does not terminate.
pub fn extract_path(
    data: &PublicTransitData,
    labels: &LabelStore,
    round: usize,
    target: SeedPoint,
    init: DateTime,
) -> Result<Path, Error> {
    let direction = labels.direction();
    let mut items = Vec::new();
    let mut round = round;
    let mut stop = target.stop;
    let mut on_board_layer = true;
    let mut steps = 2 * labels.rounds() + 2;

    let seed = loop {
        if steps == 0 {
            return Err(malformed(round, stop, "label chain does not terminate"));
        }
        steps -= 1;

        if on_board_layer {
            match labels.board_provenance(round, stop) {
                BoardProvenance::Unreached => {
                    return Err(malformed(round, stop, "unreached board label"));
                }
                BoardProvenance::SameStop => {}
                BoardProvenance::Walk { via, .. } => {
                    let here = labels.get(round, stop);
                    let there = labels.arrival(round, via);
                    let item = match direction {
                        SearchDirection::Forward => {
                            PathItem::between(ItemType::Transfer, vec![via, stop], there, here)
                        }
                        SearchDirection::Backward => {
                            PathItem::between(ItemType::Transfer, vec![stop, via], here, there)
                        }
                    };
                    items.push(item);
                    stop = via;
                }
            }
            on_board_layer = false;
        } else {
            match labels.arrival_provenance(round, stop) {
                ArrivalProvenance::Unreached => {
                    return Err(malformed(round, stop, "unreached arrival label"));
                }
                ArrivalProvenance::Access { entry, duration } => {
                    break Fallback {
                        stop,
                        duration,
                        entry,
                    };
                }
                ArrivalProvenance::Vehicle {
                    route,
                    trip,
                    service_day,
                    from_pos,
                    to_pos,
                } => {
                    if round == 0 {
                        return Err(malformed(round, stop, "vehicle label in round 0"));
                    }
                    items.push(vehicle_item(data, route, trip, service_day, from_pos, to_pos)?);
                    stop = data.get_route_stops(route)?[from_pos];
                    round -= 1;
                    on_board_layer = true;
                }
            }
        }
    };

    let target = Fallback {
        stop: target.stop,
        duration: target.duration,
        entry: target.entry,
    };
    let (origin, destination) = match direction {
        SearchDirection::Forward => {
            items.reverse();
            (seed, target)
        }
        SearchDirection::Backward => (target, seed),
    };
    Ok(assemble(data, items, init, origin, destination))
}

/// Moves a leading walk to end at the first boarding and a trailing walk to
/// start at the last alighting.
fn anchor_walks(items: &mut [PathItem]) {
    if let [walk, next, ..] = items {
        if walk.kind == ItemType::Transfer && next.departure > walk.arrival {
            let shift = next.departure - walk.arrival;
            walk.departure += shift;
            walk.arrival += shift;
        }
    }
    if let [.., previous, walk] = items {
        if walk.kind == ItemType::Transfer && walk.departure > previous.arrival {
            let shift = walk.departure - previous.arrival;
            walk.departure -= shift;
            walk.arrival -= shift;
        }
    }
}

/// Drops empty walks, then inserts stay-in and waiting sections between
/// consecutive items.
fn assemble(
    data: &PublicTransitData,
    mut items: Vec<PathItem>,
    init: DateTime,
    origin: Fallback,
    destination: Fallback,
) -> Path {
    let block = |item: &PathItem| {
        item.trip
            .and_then(|trip| data.trips.get(trip))
            .and_then(|trip| trip.block_id.as_deref())
    };

    anchor_walks(&mut items);
    let mut assembled: Vec<PathItem> = Vec::with_capacity(items.len() * 2);
    let mut stay_ins = 0;
    for item in items {
        if item.kind == ItemType::Transfer && item.first_stop() == item.last_stop() {
            continue;
        }
        if let Some(previous) = assembled.last() {
            let stop = previous.last_stop().into_iter().collect::<Vec<_>>();
            let same_vehicle = previous.kind == ItemType::PublicTransport
                && item.kind == ItemType::PublicTransport
                && previous.last_stop() == item.first_stop()
                && block(previous).is_some()
                && block(previous) == block(&item);
            let kind = if same_vehicle {
                stay_ins += 1;
                Some(ItemType::StayIn)
            } else {
                (item.departure > previous.arrival).then_some(ItemType::Waiting)
            };
            if let Some(kind) = kind {
                let gap = PathItem::between(kind, stop, previous.arrival, item.departure);
                assembled.push(gap);
            }
        }
        assembled.push(item);
    }

    let boardings = assembled
        .iter()
        .filter(|item| item.kind == ItemType::PublicTransport)
        .count();
    let departure = assembled
        .first()
        .map_or(init, |item| item.departure.saturating_sub(origin.duration));
    let arrival = assembled
        .last()
        .map_or(init, |item| item.arrival.saturating_add(destination.duration));

    Path {
        items: assembled,
        nb_transfers: boardings.saturating_sub(1).saturating_sub(stay_ins),
        request_time: init,
        departure,
        arrival,
        origin: Some(origin),
        destination: Some(destination),
        fare: None,
    }
}
