use super::filter::TripFilter;
use crate::model::{DateTime, DateTimeUtils, Route, SearchDirection, StopTime};
use crate::{PublicTransitData, RouteId, Time};

/// Trip caught at a route position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boarding {
    /// Trip index inside the route
    pub trip: usize,
    pub service_day: u32,
    /// Absolute boarding time at the position
    pub time: DateTime,
}

impl Boarding {
    /// Strictly better catch: better time, or same time on a smaller trip
    pub fn improves_on(&self, other: &Boarding, direction: SearchDirection) -> bool {
        direction.better(self.time, other.time)
            || (self.time == other.time && self.trip < other.trip)
    }
}

/// Time at which a vehicle is caught, in search terms
pub fn board_time(direction: SearchDirection, st: &StopTime) -> Time {
    match direction {
        SearchDirection::Forward => st.departure,
        SearchDirection::Backward => st.arrival,
    }
}

/// Time at which a vehicle is left, in search terms
pub fn alight_time(direction: SearchDirection, st: &StopTime) -> Time {
    board_time(direction.reverse(), st)
}

/// Finds the best trip of `route_id` catchable at position `pos` given the
/// label `label` of that stop: earliest departure going forward, latest
/// arrival going backward, ties resolved to the smallest trip index.
///
/// Service days from `max_overflow_days` before the label's day up to the
/// next day (forward) or the day before (backward) are examined so trips
/// running past midnight are found.
pub fn best_trip(
    data: &PublicTransitData,
    filter: &TripFilter,
    route_id: RouteId,
    pos: usize,
    label: DateTime,
    direction: SearchDirection,
) -> Option<Boarding> {
    let route = data.routes.get(route_id)?;
    if pos >= route.num_stops || route.num_trips == 0 {
        return None;
    }
    let day = DateTimeUtils::date(label);
    let overflow = data.max_overflow_days;
    let (first_day, last_day) = match direction {
        SearchDirection::Forward => (day.saturating_sub(overflow), day + 1),
        SearchDirection::Backward => (day.saturating_sub(overflow + 1), day),
    };

    let mut best: Option<Boarding> = None;
    for service_day in first_day..=last_day {
        if !data.validity.contains_day(service_day) {
            continue;
        }
        let Some(candidate) =
            best_trip_on_day(data, filter, route, pos, label, service_day, direction)
        else {
            continue;
        };
        if best.is_none_or(|b| candidate.improves_on(&b, direction)) {
            best = Some(candidate);
        }
    }
    best
}

fn best_trip_on_day(
    data: &PublicTransitData,
    filter: &TripFilter,
    route: &Route,
    pos: usize,
    label: DateTime,
    service_day: u32,
    direction: SearchDirection,
) -> Option<Boarding> {
    let schedule = data
        .stop_times
        .get(route.trips_start..route.trips_start + route.num_trips * route.num_stops)?;
    let at = |trip: usize| &schedule[trip * route.num_stops + pos];
    let usable = |trip: usize| {
        TripFilter::can_board(direction, at(trip))
            && data
                .trips
                .get(route.first_trip + trip)
                .is_some_and(|t| filter.trip_usable(t, service_day))
    };
    let day_start = DateTimeUtils::on_day(service_day, 0);
    let boarding = |trip: usize| Boarding {
        trip,
        service_day,
        time: DateTimeUtils::on_day(service_day, board_time(direction, at(trip))),
    };

    match direction {
        SearchDirection::Forward => {
            let earliest = label.saturating_sub(day_start);
            let first = partition(route.num_trips, |trip| at(trip).departure < earliest);
            (first..route.num_trips).find(|&trip| usable(trip)).map(boarding)
        }
        SearchDirection::Backward => {
            if label < day_start {
                return None;
            }
            let latest = label - day_start;
            let end = partition(route.num_trips, |trip| at(trip).arrival <= latest);
            let found = (0..end).rev().find(|&trip| usable(trip))?;
            let arrival = at(found).arrival;
            // smallest usable index among trips arriving at the same time
            let tied = (0..found)
                .rev()
                .take_while(|&trip| at(trip).arrival == arrival)
                .filter(|&trip| usable(trip))
                .last()
                .unwrap_or(found);
            Some(boarding(tied))
        }
    }
}

/// Number of leading trips satisfying `pred`, which must be monotone
fn partition(num_trips: usize, pred: impl Fn(usize) -> bool) -> usize {
    let mut low = 0;
    let mut high = num_trips;
    while low < high {
        let mid = (low + high) / 2;
        if pred(mid) {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}
