use fixedbitset::FixedBitSet;
use log::{debug, trace};

use super::common::{
    ArrivalProvenance, BoardProvenance, Boarding, Bound, LabelStore, TripFilter, alight_time,
    best_trip, board_time,
};
use super::path::{Path, extract_path};
use crate::config::SearchParams;
use crate::model::{DateTime, DateTimeUtils, SearchDirection, SeedPoint, Transfer};
use crate::{Error, PublicTransitData, RaptorStopId, RouteId};

/// Reusable search state over a shared transit data graph.
///
/// One engine serves one request at a time; every run starts by resetting
/// the labels, marked sets and bound, so an engine may be reused for any
/// number of sequential queries.
#[derive(Debug)]
pub struct RaptorEngine<'a> {
    data: &'a PublicTransitData,
    labels: LabelStore,
    /// Stops whose board label improved in the current round
    marked: FixedBitSet,
    /// Stops whose arrival label improved in the current round
    marked_pt: FixedBitSet,
    routes_to_scan: FixedBitSet,
    bound: Bound,
    direction: SearchDirection,
    init: DateTime,
    last_round: usize,
}

impl<'a> RaptorEngine<'a> {
    pub fn new(data: &'a PublicTransitData) -> Self {
        let num_stops = data.stops.len();
        RaptorEngine {
            data,
            labels: LabelStore::new(num_stops, 0, SearchDirection::Forward),
            marked: FixedBitSet::with_capacity(num_stops),
            marked_pt: FixedBitSet::with_capacity(num_stops),
            routes_to_scan: FixedBitSet::with_capacity(data.routes.len()),
            bound: Bound::unbounded(SearchDirection::Forward),
            direction: SearchDirection::Forward,
            init: 0,
            last_round: 0,
        }
    }

    pub fn data(&self) -> &'a PublicTransitData {
        self.data
    }

    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    /// Last round executed by the latest run
    pub fn last_round(&self) -> usize {
        self.last_round
    }

    /// Runs the round loop from `seeds` at `init`.
    ///
    /// With `tighten`, the bound follows the best time found at `targets`
    /// (plus their egress duration) after every round. Rounds run from 0 to
    /// `max_transfers + 1` and stop early when no stop improved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the request was cancelled between
    /// two rounds.
    pub fn run(
        &mut self,
        seeds: &[SeedPoint],
        targets: &[SeedPoint],
        init: DateTime,
        bound: Bound,
        params: &SearchParams,
        tighten: bool,
    ) -> Result<(), Error> {
        let direction = params.direction;
        let rounds = params.max_transfers + 2;
        self.labels.reset(rounds, direction);
        self.marked.clear();
        self.marked_pt.clear();
        self.bound = bound;
        self.direction = direction;
        self.init = init;
        self.last_round = 0;
        let filter = TripFilter::new(self.data, params);

        for seed in seeds {
            if !filter.stop_usable(self.data, seed.stop) {
                trace!("Skipping unusable seed stop {}", seed.stop);
                continue;
            }
            let time = direction.combine(init, seed.duration);
            let provenance = ArrivalProvenance::Access {
                entry: seed.entry,
                duration: seed.duration,
            };
            if self.bound.admits(time) && self.labels.set_arrival(0, seed.stop, time, provenance)
            {
                self.marked_pt.insert(seed.stop);
            }
        }
        self.relax_footpaths(0, &filter);
        if tighten {
            self.tighten_bound(0, targets);
        }

        for round in 1..rounds {
            if self.marked.is_clear() {
                break;
            }
            if params.is_cancelled() {
                debug!("Search cancelled before round {round}");
                return Err(Error::Cancelled);
            }
            let queue = self.collect_routes(&filter);
            self.marked.clear();
            self.marked_pt.clear();

            for (route_id, start) in queue {
                self.scan_route(round, route_id, start, &filter);
            }
            self.relax_footpaths(round, &filter);
            if tighten {
                self.tighten_bound(round, targets);
            }
            self.last_round = round;
        }

        debug!(
            "Search from {} seeds ({direction:?}) ran {} rounds, bound {}",
            seeds.len(),
            self.last_round,
            self.bound.value()
        );
        Ok(())
    }

    /// Routes through marked stops, each with its first marked position in
    /// traversal order
    fn collect_routes(&mut self, filter: &TripFilter) -> Vec<(RouteId, usize)> {
        self.routes_to_scan.clear();
        self.routes_to_scan.grow(self.data.routes.len());
        for stop in self.marked.ones() {
            match self.data.routes_for_stop(stop) {
                Ok(routes) => {
                    for &route in routes {
                        if filter.route_allowed(route) {
                            self.routes_to_scan.insert(route);
                        }
                    }
                }
                Err(e) => trace!("No routes for stop {stop}: {e}"),
            }
        }

        let mut queue = Vec::with_capacity(self.routes_to_scan.count_ones(..));
        for route_id in self.routes_to_scan.ones() {
            let Ok(stops) = self.data.get_route_stops(route_id) else {
                trace!("Skipping dangling route {route_id}");
                continue;
            };
            let start = match self.direction {
                SearchDirection::Forward => stops.iter().position(|&s| self.marked.contains(s)),
                SearchDirection::Backward => stops.iter().rposition(|&s| self.marked.contains(s)),
            };
            if let Some(start) = start {
                queue.push((route_id, start));
            }
        }
        queue
    }

    /// Scans one route in traversal order from `start`, re-evaluating at
    /// every stop reached in the previous round whether a better trip can
    /// be caught.
    fn scan_route(&mut self, round: usize, route_id: RouteId, start: usize, filter: &TripFilter) {
        let data = self.data;
        let direction = self.direction;
        let Ok(stops) = data.get_route_stops(route_id) else {
            trace!("Skipping dangling route {route_id}");
            return;
        };

        // (trip caught, position it was caught at)
        let mut current: Option<(Boarding, usize)> = None;
        for pos in direction.positions(start, stops.len()) {
            let stop = stops[pos];
            let usable = filter.stop_usable(data, stop);

            let mut current_time = None;
            if let Some((boarding, board_pos)) = current {
                match data.stop_time(route_id, boarding.trip, pos) {
                    Ok(st) => {
                        current_time = Some(DateTimeUtils::on_day(
                            boarding.service_day,
                            board_time(direction, st),
                        ));
                        if usable && TripFilter::can_alight(direction, st) {
                            let time = DateTimeUtils::on_day(
                                boarding.service_day,
                                alight_time(direction, st),
                            );
                            let provenance = ArrivalProvenance::Vehicle {
                                route: route_id,
                                trip: boarding.trip,
                                service_day: boarding.service_day,
                                from_pos: board_pos,
                                to_pos: pos,
                            };
                            if self.bound.admits(time)
                                && self.labels.set_arrival(round, stop, time, provenance)
                            {
                                self.marked_pt.insert(stop);
                            }
                        }
                    }
                    Err(e) => {
                        trace!("Dropping trip {} of route {route_id}: {e}", boarding.trip);
                        current = None;
                    }
                }
            }

            let previous = self.labels.get(round - 1, stop);
            if !usable || !direction.is_reached(previous) {
                continue;
            }
            if current_time.is_some_and(|time| !direction.better_or_equal(previous, time)) {
                continue;
            }
            let Some(candidate) = best_trip(data, filter, route_id, pos, previous, direction)
            else {
                continue;
            };
            let switch = match (current, current_time) {
                (Some((boarding, _)), Some(time)) => {
                    candidate.improves_on(&Boarding { time, ..boarding }, direction)
                }
                _ => true,
            };
            if switch {
                current = Some((candidate, pos));
            }
        }
    }

    /// Board labels of the round: the stop itself, then one footpath hop
    /// from every stop whose arrival label improved.
    fn relax_footpaths(&mut self, round: usize, filter: &TripFilter) {
        let improved: Vec<RaptorStopId> = self.marked_pt.ones().collect();
        for &stop in &improved {
            let time = self.labels.arrival(round, stop);
            if self.labels.set(round, stop, time, BoardProvenance::SameStop) {
                self.marked.insert(stop);
            }
        }
        for &stop in &improved {
            let time = self.labels.arrival(round, stop);
            let footpaths = match self.data.footpaths(stop, self.direction) {
                Ok(footpaths) => footpaths,
                Err(e) => {
                    trace!("No footpaths for stop {stop}: {e}");
                    continue;
                }
            };
            for &Transfer {
                target_stop,
                duration,
            } in footpaths
            {
                if !filter.stop_usable(self.data, target_stop) {
                    continue;
                }
                let reached = self.direction.combine(time, duration);
                let provenance = BoardProvenance::Walk {
                    via: stop,
                    duration,
                };
                if self.bound.admits(reached)
                    && self.labels.set(round, target_stop, reached, provenance)
                {
                    self.marked.insert(target_stop);
                }
            }
        }
    }

    /// Time at the end of the egress of `target` in `round`, if that label
    /// ends a journey. In round 0 only a footpath from a seed does: a seed
    /// that is itself a target is left to the direct street journey.
    fn target_time(&self, round: usize, target: &SeedPoint) -> Option<DateTime> {
        let time = self.labels.get(round, target.stop);
        if !self.direction.is_reached(time) {
            return None;
        }
        if round == 0
            && !matches!(
                self.labels.board_provenance(0, target.stop),
                BoardProvenance::Walk { .. }
            )
        {
            return None;
        }
        Some(self.direction.combine(time, target.duration))
    }

    fn tighten_bound(&mut self, round: usize, targets: &[SeedPoint]) {
        for target in targets {
            if let Some(reached) = self.target_time(round, target) {
                self.bound.tighten(reached);
            }
        }
    }

    /// Best target label of every round strictly improving on all rounds
    /// before it, as `(round, target)`. A round 0 solution is a footpath
    /// without any vehicle, dropped when a vehicle does better.
    pub fn pareto_solutions(&self, targets: &[SeedPoint]) -> Vec<(usize, SeedPoint)> {
        let direction = self.direction;
        let mut best = direction.worst();
        let mut solutions = Vec::new();
        for round in 0..=self.last_round {
            let mut round_best: Option<(DateTime, SeedPoint)> = None;
            for target in targets {
                let Some(reached) = self.target_time(round, target) else {
                    continue;
                };
                if round_best.is_none_or(|(t, b)| {
                    direction.better(reached, t) || (reached == t && target.stop < b.stop)
                }) {
                    round_best = Some((reached, *target));
                }
            }
            if let Some((reached, target)) = round_best {
                if direction.better(reached, best) {
                    best = reached;
                    // walking only and one vehicle both count zero transfers
                    if round == 1 && solutions.last().is_some_and(|&(r, _)| r == 0) {
                        solutions.pop();
                    }
                    solutions.push((round, target));
                }
            }
        }
        solutions
    }

    /// Builds the path ending at `target` in `round` of the latest run
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLabelState`] if the label chain is broken
    pub fn extract(&self, round: usize, target: SeedPoint) -> Result<Path, Error> {
        extract_path(self.data, &self.labels, round, target, self.init)
    }

    /// Pareto optimal paths between two weighted stop sets.
    ///
    /// `origins` and `destinations` are given in journey order whatever the
    /// direction; a backward search seeds from the destinations. An empty
    /// result means no solution.
    ///
    /// # Errors
    ///
    /// Returns an error if the search is cancelled or a label chain is broken
    pub fn compute_all(
        &mut self,
        origins: &[SeedPoint],
        destinations: &[SeedPoint],
        init: DateTime,
        limit: Option<DateTime>,
        params: &SearchParams,
    ) -> Result<Vec<Path>, Error> {
        let direction = params.direction;
        let (seeds, targets) = match direction {
            SearchDirection::Forward => (origins, destinations),
            SearchDirection::Backward => (destinations, origins),
        };
        let mut bound = params
            .max_duration
            .map_or(Bound::unbounded(direction), |max| {
                Bound::from_duration(direction, init, max)
            });
        if let Some(limit) = limit {
            bound.merge(Bound::inclusive(direction, limit));
        }

        self.run(seeds, targets, init, bound, params, true)?;
        let solutions = self.pareto_solutions(targets);
        debug!("Found {} pareto optimal solutions", solutions.len());
        solutions
            .into_iter()
            .map(|(round, target)| self.extract(round, target))
            .collect()
    }
}
