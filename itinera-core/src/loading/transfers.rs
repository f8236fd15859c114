use geo::{Distance, Haversine, Point};
use log::info;
use rayon::prelude::*;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::model::{Stop, Transfer};
use crate::{RaptorStopId, Time};

const METERS_PER_DEGREE: f64 = 111_320.0;

pub(crate) type StopPoint = GeomWithData<[f64; 2], RaptorStopId>;

/// Proximity index over stop coordinates (lon, lat)
pub(crate) fn stop_index(stops: &[Stop]) -> RTree<StopPoint> {
    RTree::bulk_load(
        stops
            .iter()
            .enumerate()
            .map(|(idx, stop)| StopPoint::new([stop.geometry.x(), stop.geometry.y()], idx))
            .collect(),
    )
}

/// Search radius in degrees covering `meters` around `point`
pub(crate) fn degree_radius(point: Point<f64>, meters: f64) -> f64 {
    let lat_scale = point.y().to_radians().cos().abs().max(0.01);
    meters / (METERS_PER_DEGREE * lat_scale)
}

/// Walking time along the great circle, rounded up to the second
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn walking_time(from: Point<f64>, to: Point<f64>, walking_speed: f64) -> Time {
    (Haversine.distance(from, to) / walking_speed).ceil() as Time
}

/// Calculate straight line footpaths between all stops closer than
/// `max_transfer_time` of walking
pub(crate) fn calculate_transfers(
    stops: &[Stop],
    max_transfer_time: Time,
    walking_speed: f64,
) -> Vec<(RaptorStopId, Vec<Transfer>)> {
    info!("Calculating transfers between {} stops", stops.len());
    let index = stop_index(stops);
    let max_distance = f64::from(max_transfer_time) * walking_speed;

    let transfers: Vec<(RaptorStopId, Vec<Transfer>)> = (0..stops.len())
        .into_par_iter()
        .filter_map(|source_idx| {
            let source = stops[source_idx].geometry;
            let radius = degree_radius(source, max_distance);
            let mut transfers: Vec<Transfer> = index
                .locate_within_distance([source.x(), source.y()], radius * radius)
                .filter(|candidate| candidate.data != source_idx)
                .filter_map(|candidate| {
                    let duration =
                        walking_time(source, stops[candidate.data].geometry, walking_speed);
                    (duration <= max_transfer_time).then_some(Transfer {
                        target_stop: candidate.data,
                        duration,
                    })
                })
                .collect();
            if transfers.is_empty() {
                None
            } else {
                transfers.sort_unstable_by_key(|t| t.target_stop);
                Some((source_idx, transfers))
            }
        })
        .collect();

    info!(
        "Calculated {} transfers between stops",
        transfers.iter().map(|(_, t)| t.len()).sum::<usize>()
    );
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Accessibility;

    fn stop(lon: f64, lat: f64) -> Stop {
        Stop {
            uri: String::new(),
            name: String::new(),
            geometry: Point::new(lon, lat),
            stop_area: None,
            accessibility: Accessibility::NONE,
            routes_start: 0,
            routes_len: 0,
            transfers_start: 0,
            transfers_len: 0,
            incoming_start: 0,
            incoming_len: 0,
        }
    }

    #[test]
    fn only_close_stops_are_connected() {
        // about 111 m and 11 km apart
        let stops = vec![stop(0.0, 0.0), stop(0.001, 0.0), stop(0.1, 0.0)];
        let transfers = calculate_transfers(&stops, 600, 1.0);
        assert_eq!(transfers.len(), 2);
        let (source, from_first) = &transfers[0];
        assert_eq!(*source, 0);
        assert_eq!(from_first.len(), 1);
        assert_eq!(from_first[0].target_stop, 1);
        assert!((110..=113).contains(&from_first[0].duration));
    }
}
