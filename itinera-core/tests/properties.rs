mod common;

use common::{STOP_SPACING, start_date};
use geo::Point;
use itinera_core::loading::TransitDataBuilder;
use itinera_core::model::DateTimeUtils;
use itinera_core::routing::raptor::common::Bound;
use itinera_core::{
    DateTime, PublicTransitData, RaptorEngine, SearchDirection, SearchParams, SeedPoint, Time,
};
use proptest::prelude::*;
use proptest::sample::subsequence;

const MAX_TRANSFERS: usize = 4;

/// Trip as `(stop, arrival, departure)` calls
#[derive(Debug, Clone)]
struct RawTrip {
    calls: Vec<(usize, Time, Time)>,
}

impl RawTrip {
    fn new(stops: Vec<usize>, start: Time, legs: &[(Time, Time)]) -> Self {
        let mut calls = vec![(stops[0], start, start)];
        let mut t = start;
        for (&stop, &(travel, dwell)) in stops[1..].iter().zip(legs) {
            let arrival = t + travel;
            t = arrival + dwell;
            calls.push((stop, arrival, t));
        }
        Self { calls }
    }
}

#[derive(Debug, Clone)]
struct RawNetwork {
    num_stops: usize,
    trips: Vec<RawTrip>,
    /// Footpaths as `(from, to, duration)`
    transfers: Vec<(usize, usize, Time)>,
}

impl RawNetwork {
    fn build(&self) -> PublicTransitData {
        let mut builder = TransitDataBuilder::new(start_date(), 1);
        let uris: Vec<String> = (0..self.num_stops).map(|i| format!("S{i}")).collect();
        for (i, uri) in uris.iter().enumerate() {
            builder.add_stop(uri, uri, Point::new(i as f64 * STOP_SPACING, 0.0));
        }
        for line in 0..3 {
            builder.add_line(&format!("L{line}"), "line", "bus");
        }
        for (i, trip) in self.trips.iter().enumerate() {
            let calls: Vec<(&str, Time, Time)> = trip
                .calls
                .iter()
                .map(|&(stop, arr, dep)| (uris[stop].as_str(), arr, dep))
                .collect();
            builder
                .add_trip(&format!("T{i}"), &format!("L{}", i % 3), &calls)
                .unwrap();
        }
        for &(from, to, duration) in &self.transfers {
            builder
                .add_transfer(&uris[from], &uris[to], duration)
                .unwrap();
        }
        builder.build()
    }

    fn shortest_transfers(&self) -> Vec<(usize, usize, Time)> {
        let mut shortest: Vec<(usize, usize, Time)> = Vec::new();
        for &(from, to, duration) in &self.transfers {
            match shortest.iter_mut().find(|t| t.0 == from && t.1 == to) {
                Some(t) => t.2 = t.2.min(duration),
                None => shortest.push((from, to, duration)),
            }
        }
        shortest
    }

    /// Earliest time every stop can be left from using at most `k`
    /// vehicles, for every `k` up to `max_boardings`, by exhaustive
    /// relaxation of every trip followed by one footpath
    fn reference_labels(
        &self,
        origin: usize,
        init: DateTime,
        max_boardings: usize,
    ) -> Vec<Vec<DateTime>> {
        let transfers = self.shortest_transfers();
        let walk = |arrivals: &[DateTime]| {
            let mut board = arrivals.to_vec();
            for &(from, to, duration) in &transfers {
                if arrivals[from] != DateTimeUtils::INF {
                    board[to] = board[to].min(arrivals[from] + duration);
                }
            }
            board
        };

        let mut arrivals = vec![DateTimeUtils::INF; self.num_stops];
        arrivals[origin] = init;
        let mut labels = vec![walk(&arrivals)];
        for k in 1..=max_boardings {
            let previous = &labels[k - 1];
            let mut current = arrivals.clone();
            for trip in &self.trips {
                let mut on_board = false;
                for &(stop, arrival, departure) in &trip.calls {
                    if on_board {
                        current[stop] = current[stop].min(arrival);
                    }
                    if previous[stop] <= departure {
                        on_board = true;
                    }
                }
            }
            arrivals = current;
            labels.push(walk(&arrivals));
        }
        labels
    }

    /// Latest time every stop can be left to reach `destination` by `init`
    /// using at most `k` vehicles, 0 when unreachable
    fn reference_backward_labels(
        &self,
        destination: usize,
        init: DateTime,
        max_boardings: usize,
    ) -> Vec<Vec<DateTime>> {
        let transfers = self.shortest_transfers();
        let walk = |arrivals: &[DateTime]| {
            let mut board = arrivals.to_vec();
            for &(from, to, duration) in &transfers {
                if arrivals[to] != DateTimeUtils::MIN {
                    board[from] = board[from].max(arrivals[to].saturating_sub(duration));
                }
            }
            board
        };

        let mut arrivals = vec![DateTimeUtils::MIN; self.num_stops];
        arrivals[destination] = init;
        let mut labels = vec![walk(&arrivals)];
        for k in 1..=max_boardings {
            let previous = &labels[k - 1];
            let mut current = arrivals.clone();
            for trip in &self.trips {
                let mut on_board = false;
                for &(stop, arrival, departure) in trip.calls.iter().rev() {
                    if on_board {
                        current[stop] = current[stop].max(departure);
                    }
                    if previous[stop] != DateTimeUtils::MIN && previous[stop] >= arrival {
                        on_board = true;
                    }
                }
            }
            arrivals = current;
            labels.push(walk(&arrivals));
        }
        labels
    }
}

fn trip_strategy(num_stops: usize) -> impl Strategy<Value = RawTrip> {
    (
        subsequence((0..num_stops).collect::<Vec<_>>(), 2..=num_stops).prop_shuffle(),
        60u32..36_000,
    )
        .prop_flat_map(|(stops, start)| {
            let legs = prop::collection::vec((60u32..900, 0u32..120), stops.len() - 1);
            (Just(stops), Just(start), legs)
        })
        .prop_map(|(stops, start, legs)| RawTrip::new(stops, start, &legs))
}

fn transfer_strategy(num_stops: usize) -> impl Strategy<Value = (usize, usize, Time)> {
    (0..num_stops, 1..num_stops, 0u32..600)
        .prop_map(move |(from, shift, duration)| (from, (from + shift) % num_stops, duration))
}

fn network_strategy() -> impl Strategy<Value = RawNetwork> {
    (3usize..7)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec(trip_strategy(n), 1..10),
                prop::collection::vec(transfer_strategy(n), 0..6),
            )
        })
        .prop_map(|(num_stops, trips, transfers)| RawNetwork {
            num_stops,
            trips,
            transfers,
        })
}

/// Network, origin, destination and request time
fn query_strategy() -> impl Strategy<Value = (RawNetwork, usize, usize, DateTime)> {
    network_strategy().prop_flat_map(|network| {
        let n = network.num_stops;
        (Just(network), 0..n, 1..n, 0u32..36_000).prop_map(move |(net, o, shift, init)| {
            let d = (o + shift) % n;
            (net, o, d, init)
        })
    })
}

fn seed(stop: usize) -> Vec<SeedPoint> {
    vec![SeedPoint {
        stop,
        duration: 0,
        entry: 0,
    }]
}

fn params(direction: SearchDirection) -> SearchParams {
    SearchParams::default()
        .with_direction(direction)
        .with_max_transfers(MAX_TRANSFERS)
        .with_max_duration(None)
}

proptest! {
    #[test]
    fn labels_match_exhaustive_search_every_round(
        (network, origin, _destination, init) in query_strategy()
    ) {
        let data = network.build();
        let mut engine = RaptorEngine::new(&data);
        let params = params(SearchDirection::Forward);
        engine
            .run(
                &seed(origin),
                &[],
                init,
                Bound::unbounded(SearchDirection::Forward),
                &params,
                false,
            )
            .unwrap();

        let reference = network.reference_labels(origin, init, MAX_TRANSFERS + 1);
        for (k, expected) in reference.iter().enumerate() {
            for stop in 0..network.num_stops {
                let best = (0..=k)
                    .map(|round| engine.labels().get(round, stop))
                    .min()
                    .unwrap_or(DateTimeUtils::INF);
                // a better boarding further down a route is never missed
                prop_assert_eq!(
                    best,
                    expected[stop],
                    "stop {} with {} vehicles",
                    stop,
                    k
                );
            }
        }
    }

    #[test]
    fn backward_labels_match_exhaustive_search_every_round(
        (network, _origin, destination, init) in query_strategy()
    ) {
        let data = network.build();
        let mut engine = RaptorEngine::new(&data);
        let params = params(SearchDirection::Backward);
        engine
            .run(
                &seed(destination),
                &[],
                init,
                Bound::unbounded(SearchDirection::Backward),
                &params,
                false,
            )
            .unwrap();

        let reference = network.reference_backward_labels(destination, init, MAX_TRANSFERS + 1);
        for (k, expected) in reference.iter().enumerate() {
            for stop in 0..network.num_stops {
                let best = (0..=k)
                    .map(|round| engine.labels().get(round, stop))
                    .max()
                    .unwrap_or(DateTimeUtils::MIN);
                prop_assert_eq!(
                    best,
                    expected[stop],
                    "stop {} with {} vehicles",
                    stop,
                    k
                );
            }
        }
    }

    #[test]
    fn pareto_front_is_minimal_and_optimal(
        (network, origin, destination, init) in query_strategy()
    ) {
        let data = network.build();
        let mut engine = RaptorEngine::new(&data);
        let params = params(SearchDirection::Forward);
        let paths = engine
            .compute_all(&seed(origin), &seed(destination), init, None, &params)
            .unwrap();

        let reference = network.reference_labels(origin, init, MAX_TRANSFERS + 1);
        let optimum = reference[MAX_TRANSFERS + 1][destination];
        match paths.last() {
            Some(best) => prop_assert_eq!(best.arrival, optimum),
            None => prop_assert_eq!(optimum, DateTimeUtils::INF),
        }

        for pair in paths.windows(2) {
            prop_assert!(pair[0].arrival > pair[1].arrival);
            prop_assert!(pair[0].nb_transfers < pair[1].nb_transfers);
        }
        for path in &paths {
            let boardings = path.public_transport_items().count();
            prop_assert!(path.departure >= init);
            prop_assert_eq!(path.nb_transfers, boardings.saturating_sub(1));
            prop_assert_eq!(path.arrival, reference[boardings][destination]);
            for pair in path.items.windows(2) {
                prop_assert!(pair[0].arrival <= pair[1].departure);
            }
        }
    }

    #[test]
    fn backward_search_mirrors_forward(
        (network, origin, destination, init) in query_strategy()
    ) {
        let data = network.build();
        let mut engine = RaptorEngine::new(&data);
        let fwd = params(SearchDirection::Forward);
        let bwd = params(SearchDirection::Backward);

        let forward = engine
            .compute_all(&seed(origin), &seed(destination), init, None, &fwd)
            .unwrap();
        let Some(earliest) = forward.last() else {
            return Ok(());
        };
        let arrival = earliest.arrival;

        let backward = engine
            .compute_all(&seed(origin), &seed(destination), arrival, None, &bwd)
            .unwrap();
        let latest = backward.last().map(|p| p.departure);
        prop_assert!(latest.is_some_and(|d| d >= earliest.departure));
        prop_assert!(backward.iter().all(|p| p.arrival <= arrival));

        let departure = latest.unwrap_or(init);
        let again = engine
            .compute_all(&seed(origin), &seed(destination), departure, None, &fwd)
            .unwrap();
        prop_assert_eq!(again.last().map(|p| p.arrival), Some(arrival));
    }

    #[test]
    fn tighter_limit_never_improves_arrival(
        (network, origin, destination, init) in query_strategy()
    ) {
        let data = network.build();
        let mut engine = RaptorEngine::new(&data);
        let params = params(SearchDirection::Forward);
        let unbounded = engine
            .compute_all(&seed(origin), &seed(destination), init, None, &params)
            .unwrap();
        let Some(best) = unbounded.last().map(|p| p.arrival) else {
            return Ok(());
        };

        let at_best = engine
            .compute_all(&seed(origin), &seed(destination), init, Some(best), &params)
            .unwrap();
        prop_assert_eq!(at_best.last().map(|p| p.arrival), Some(best));
        prop_assert!(at_best.iter().all(|p| p.arrival <= best));

        let below_best = engine
            .compute_all(&seed(origin), &seed(destination), init, Some(best - 1), &params)
            .unwrap();
        prop_assert!(below_best.is_empty());
    }

    #[test]
    fn reused_engine_is_deterministic(
        (network, origin, destination, init) in query_strategy()
    ) {
        let data = network.build();
        let params = params(SearchDirection::Forward);

        let mut fresh = RaptorEngine::new(&data);
        let expected = fresh
            .compute_all(&seed(origin), &seed(destination), init, None, &params)
            .unwrap();

        let mut reused = RaptorEngine::new(&data);
        reused
            .compute_all(
                &seed(destination),
                &seed(origin),
                init + 3600,
                None,
                &params.clone().with_direction(SearchDirection::Backward),
            )
            .unwrap();
        reused
            .compute_all(&seed(destination), &seed(origin), init, None, &params)
            .unwrap();
        let actual = reused
            .compute_all(&seed(origin), &seed(destination), init, None, &params)
            .unwrap();
        prop_assert_eq!(actual, expected);
    }
}
