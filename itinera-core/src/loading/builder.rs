use chrono::NaiveDate;
use fixedbitset::FixedBitSet;
use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use log::info;

use super::transfers::calculate_transfers;
use crate::model::{
    Accessibility, Line, PhysicalMode, Route, Stop, StopArea, StopTime, Transfer, Trip,
    ValidityPeriod,
};
use crate::{Error, LineId, ModeId, PublicTransitData, RaptorStopId, Time};

/// Trip waiting to be assigned to a route
#[derive(Debug, Clone)]
pub struct PendingTrip {
    uri: String,
    line: LineId,
    mode: ModeId,
    stops: Vec<RaptorStopId>,
    times: Vec<StopTime>,
    block_id: Option<String>,
    accessibility: Accessibility,
    validity: FixedBitSet,
    adapted_validity: Option<FixedBitSet>,
}

impl PendingTrip {
    pub fn block(&mut self, block_id: impl Into<String>) -> &mut Self {
        self.block_id = Some(block_id.into());
        self
    }

    pub fn accessibility(&mut self, accessibility: Accessibility) -> &mut Self {
        self.accessibility = accessibility;
        self
    }

    /// Restricts the trip to the given service days
    pub fn active_days(&mut self, days: &[u32]) -> &mut Self {
        self.validity.clear();
        for &day in days {
            if (day as usize) < self.validity.len() {
                self.validity.insert(day as usize);
            }
        }
        self
    }

    /// Service days on which the trip is cancelled by a disruption
    pub fn disrupted_days(&mut self, days: &[u32]) -> &mut Self {
        let mut adapted = self.adapted_validity.take().unwrap_or(self.validity.clone());
        for &day in days {
            if (day as usize) < adapted.len() {
                adapted.set(day as usize, false);
            }
        }
        self.adapted_validity = Some(adapted);
        self
    }

    /// Sets boarding and alighting permissions at a position of the trip
    pub fn stop_flags(&mut self, pos: usize, pick_up: bool, drop_off: bool) -> &mut Self {
        if let Some(st) = self.times.get_mut(pos) {
            st.pick_up = pick_up;
            st.drop_off = drop_off;
        }
        self
    }

    fn first_departure(&self) -> Time {
        self.times.first().map_or(0, |st| st.departure)
    }

    /// No overtaking at any stop
    fn never_after(&self, other: &PendingTrip) -> bool {
        self.times
            .iter()
            .zip(&other.times)
            .all(|(a, b)| a.arrival <= b.arrival && a.departure <= b.departure)
    }
}

/// Assembles a [`PublicTransitData`] from stops, lines and trips.
///
/// Trips serving the same stop sequence of the same line are grouped into
/// routes; trips overtaking each other are split into separate routes so
/// every route stays FIFO.
#[derive(Debug)]
pub struct TransitDataBuilder {
    validity: ValidityPeriod,
    stops: Vec<Stop>,
    stop_index: HashMap<String, RaptorStopId>,
    stop_areas: Vec<StopArea>,
    stop_area_index: HashMap<String, usize>,
    lines: Vec<Line>,
    line_modes: Vec<ModeId>,
    line_index: HashMap<String, LineId>,
    modes: Vec<PhysicalMode>,
    mode_index: HashMap<String, ModeId>,
    trips: Vec<PendingTrip>,
    transfers: HashMap<(RaptorStopId, RaptorStopId), Time>,
    generated_transfers: Option<(Time, f64)>,
}

impl TransitDataBuilder {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self {
            validity: ValidityPeriod::new(start, days),
            stops: Vec::new(),
            stop_index: HashMap::new(),
            stop_areas: Vec::new(),
            stop_area_index: HashMap::new(),
            lines: Vec::new(),
            line_modes: Vec::new(),
            line_index: HashMap::new(),
            modes: Vec::new(),
            mode_index: HashMap::new(),
            trips: Vec::new(),
            transfers: HashMap::new(),
            generated_transfers: None,
        }
    }

    /// Adds a stop point, returns the existing index for a known uri
    pub fn add_stop(&mut self, uri: &str, name: &str, geometry: Point<f64>) -> RaptorStopId {
        if let Some(&idx) = self.stop_index.get(uri) {
            return idx;
        }
        let idx = self.stops.len();
        self.stops.push(Stop {
            uri: uri.to_string(),
            name: name.to_string(),
            geometry,
            stop_area: None,
            accessibility: Accessibility::NONE,
            routes_start: 0,
            routes_len: 0,
            transfers_start: 0,
            transfers_len: 0,
            incoming_start: 0,
            incoming_len: 0,
        });
        self.stop_index.insert(uri.to_string(), idx);
        idx
    }

    /// # Errors
    ///
    /// Returns an error if the stop is unknown
    pub fn set_stop_accessibility(
        &mut self,
        uri: &str,
        accessibility: Accessibility,
    ) -> Result<(), Error> {
        let idx = self.stop(uri)?;
        self.stops[idx].accessibility = accessibility;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if one of the stop points is unknown
    pub fn add_stop_area(&mut self, uri: &str, name: &str, stop_points: &[&str]) -> Result<(), Error> {
        let area_idx = self.stop_areas.len();
        let stop_points = stop_points
            .iter()
            .map(|uri| self.stop(uri))
            .collect::<Result<Vec<_>, _>>()?;
        for &stop in &stop_points {
            self.stops[stop].stop_area = Some(area_idx);
        }
        self.stop_areas.push(StopArea {
            uri: uri.to_string(),
            name: name.to_string(),
            stop_points,
        });
        self.stop_area_index.insert(uri.to_string(), area_idx);
        Ok(())
    }

    /// Adds a line run with the physical mode `mode_uri`
    pub fn add_line(&mut self, uri: &str, name: &str, mode_uri: &str) -> LineId {
        if let Some(&idx) = self.line_index.get(uri) {
            return idx;
        }
        let mode = match self.mode_index.get(mode_uri) {
            Some(&mode) => mode,
            None => {
                let mode = self.modes.len();
                self.modes.push(PhysicalMode {
                    uri: mode_uri.to_string(),
                    name: mode_uri.to_string(),
                });
                self.mode_index.insert(mode_uri.to_string(), mode);
                mode
            }
        };
        let idx = self.lines.len();
        self.lines.push(Line {
            uri: uri.to_string(),
            name: name.to_string(),
        });
        self.line_modes.push(mode);
        self.line_index.insert(uri.to_string(), idx);
        idx
    }

    /// Adds a trip of `line_uri` calling at `(stop_uri, arrival, departure)`.
    /// The trip runs every day of the validity period until restricted.
    ///
    /// # Errors
    ///
    /// Returns an error on unknown references, fewer than two stops, or
    /// stop times going back in time
    pub fn add_trip(
        &mut self,
        uri: &str,
        line_uri: &str,
        stop_times: &[(&str, Time, Time)],
    ) -> Result<&mut PendingTrip, Error> {
        let line = *self
            .line_index
            .get(line_uri)
            .ok_or_else(|| Error::InvalidData(format!("Unknown line {line_uri}")))?;
        if stop_times.len() < 2 {
            return Err(Error::InvalidData(format!(
                "Trip {uri} must call at two stops at least"
            )));
        }

        let mut stops = Vec::with_capacity(stop_times.len());
        let mut times = Vec::with_capacity(stop_times.len());
        let mut previous = 0;
        for &(stop_uri, arrival, departure) in stop_times {
            if arrival > departure || arrival < previous {
                return Err(Error::InvalidData(format!(
                    "Trip {uri} goes back in time at {stop_uri}"
                )));
            }
            previous = departure;
            stops.push(self.stop(stop_uri)?);
            times.push(StopTime::new(arrival, departure));
        }

        let mut validity = FixedBitSet::with_capacity(self.validity.days as usize);
        validity.insert_range(..);
        self.trips.push(PendingTrip {
            uri: uri.to_string(),
            line,
            mode: self.line_modes[line],
            stops,
            times,
            block_id: None,
            accessibility: Accessibility::NONE,
            validity,
            adapted_validity: None,
        });
        let last = self.trips.len() - 1;
        Ok(&mut self.trips[last])
    }

    /// Adds a footpath, keeping the shortest duration for a pair of stops
    ///
    /// # Errors
    ///
    /// Returns an error if one of the stops is unknown
    pub fn add_transfer(&mut self, from: &str, to: &str, duration: Time) -> Result<(), Error> {
        let from = self.stop(from)?;
        let to = self.stop(to)?;
        if from == to {
            return Ok(());
        }
        self.transfers
            .entry((from, to))
            .and_modify(|d| *d = (*d).min(duration))
            .or_insert(duration);
        Ok(())
    }

    /// Also connects every pair of stops within `max_transfer_time` of
    /// walking at `walking_speed` in a straight line
    pub fn generate_transfers(&mut self, max_transfer_time: Time, walking_speed: f64) -> &mut Self {
        self.generated_transfers = Some((max_transfer_time, walking_speed));
        self
    }

    fn stop(&self, uri: &str) -> Result<RaptorStopId, Error> {
        self.stop_index
            .get(uri)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("Unknown stop {uri}")))
    }

    pub fn build(mut self) -> PublicTransitData {
        if let Some((max_transfer_time, walking_speed)) = self.generated_transfers {
            for (source, transfers) in
                calculate_transfers(&self.stops, max_transfer_time, walking_speed)
            {
                for Transfer {
                    target_stop,
                    duration,
                } in transfers
                {
                    self.transfers
                        .entry((source, target_stop))
                        .and_modify(|d| *d = (*d).min(duration))
                        .or_insert(duration);
                }
            }
        }

        let mut stops = self.stops;
        let (routes, route_stops, stop_times, trips) = build_routes(self.trips);

        // Index of routes for each stop
        let mut stop_to_routes: Vec<Vec<usize>> = vec![Vec::new(); stops.len()];
        for (route_idx, route) in routes.iter().enumerate() {
            for &stop in &route_stops[route.stops_start..route.stops_start + route.num_stops] {
                stop_to_routes[stop].push(route_idx);
            }
        }
        let mut stop_routes = Vec::new();
        for (stop, routes) in stop_to_routes.into_iter().enumerate() {
            let routes: Vec<usize> = routes.into_iter().dedup().collect();
            stops[stop].routes_start = stop_routes.len();
            stops[stop].routes_len = routes.len();
            stop_routes.extend(routes);
        }

        let pairs: Vec<((RaptorStopId, RaptorStopId), Time)> =
            self.transfers.into_iter().sorted().collect();
        let mut transfers = Vec::with_capacity(pairs.len());
        for (source, group) in &pairs.iter().chunk_by(|((from, _), _)| *from) {
            let start = transfers.len();
            transfers.extend(group.map(|&((_, to), duration)| Transfer {
                target_stop: to,
                duration,
            }));
            stops[source].transfers_start = start;
            stops[source].transfers_len = transfers.len() - start;
        }
        let mut incoming_transfers = Vec::with_capacity(pairs.len());
        let by_target = pairs
            .iter()
            .sorted_by_key(|((from, to), _)| (*to, *from))
            .chunk_by(|((_, to), _)| *to);
        for (target, group) in &by_target {
            let start = incoming_transfers.len();
            incoming_transfers.extend(group.map(|&((from, _), duration)| Transfer {
                target_stop: from,
                duration,
            }));
            stops[target].incoming_start = start;
            stops[target].incoming_len = incoming_transfers.len() - start;
        }

        let max_overflow_days = PublicTransitData::compute_overflow_days(&stop_times);
        info!(
            "Built transit data: {} stops, {} routes, {} trips, {} footpaths",
            stops.len(),
            routes.len(),
            trips.len(),
            transfers.len()
        );

        PublicTransitData {
            routes,
            route_stops,
            stop_times,
            trips,
            stops,
            stop_routes,
            transfers,
            incoming_transfers,
            stop_areas: self.stop_areas,
            lines: self.lines,
            modes: self.modes,
            stop_index: self.stop_index,
            stop_area_index: self.stop_area_index,
            validity: self.validity,
            max_overflow_days,
        }
    }
}

type RouteTables = (Vec<Route>, Vec<RaptorStopId>, Vec<StopTime>, Vec<Trip>);

fn build_routes(pending: Vec<PendingTrip>) -> RouteTables {
    let mut routes = Vec::new();
    let mut route_stops = Vec::new();
    let mut stop_times = Vec::new();
    let mut trips = Vec::new();

    // Same line and stop sequence, then departure order, then insertion order
    let groups = pending
        .iter()
        .enumerate()
        .sorted_by(|(ia, a), (ib, b)| {
            (a.line, &a.stops, a.first_departure(), ia)
                .cmp(&(b.line, &b.stops, b.first_departure(), ib))
        })
        .chunk_by(|(_, trip)| (trip.line, trip.stops.clone()));

    for (_, group) in &groups {
        let group: Vec<&PendingTrip> = group.map(|(_, trip)| trip).collect();

        // Greedy split into FIFO routes
        let mut fifo_routes: Vec<Vec<&PendingTrip>> = Vec::new();
        for trip in group {
            match fifo_routes
                .iter_mut()
                .find(|route| route.last().is_some_and(|last| last.never_after(trip)))
            {
                Some(route) => route.push(trip),
                None => fifo_routes.push(vec![trip]),
            }
        }

        for route_trips in fifo_routes {
            let Some(first) = route_trips.first() else {
                continue;
            };
            let route_id = routes.len();
            routes.push(Route {
                line: first.line,
                mode: first.mode,
                num_trips: route_trips.len(),
                num_stops: first.stops.len(),
                stops_start: route_stops.len(),
                trips_start: stop_times.len(),
                first_trip: trips.len(),
            });
            route_stops.extend_from_slice(&first.stops);
            for trip in route_trips {
                stop_times.extend_from_slice(&trip.times);
                trips.push(Trip {
                    uri: trip.uri.clone(),
                    route: route_id,
                    block_id: trip.block_id.clone(),
                    accessibility: trip.accessibility,
                    adapted_validity: trip
                        .adapted_validity
                        .clone()
                        .unwrap_or_else(|| trip.validity.clone()),
                    validity: trip.validity.clone(),
                });
            }
        }
    }

    (routes, route_stops, stop_times, trips)
}
