use geo::{Distance, Haversine};
use rstar::RTree;

use super::{StreetMode, StreetNetwork, StreetPath};
use crate::loading::transfers::{StopPoint, degree_radius, stop_index, walking_time};
use crate::{EntryPoint, PublicTransitData, RaptorStopId, SearchConfig, Time};

/// Street network approximated by straight walking lines
pub struct CrowFlyStreetNetwork {
    index: RTree<StopPoint>,
    walking_speed: f64,
    max_walking_duration: Time,
    max_nearest_stops: usize,
}

impl CrowFlyStreetNetwork {
    pub fn new(data: &PublicTransitData, config: &SearchConfig) -> Self {
        Self {
            index: stop_index(&data.stops),
            walking_speed: config.walking_speed,
            max_walking_duration: config.max_walking_duration,
            max_nearest_stops: config.max_nearest_stops,
        }
    }
}

impl StreetNetwork for CrowFlyStreetNetwork {
    fn stop_points_near(
        &self,
        data: &PublicTransitData,
        entry: &EntryPoint,
    ) -> Vec<(RaptorStopId, Time)> {
        let Some(point) = entry.coordinate(data) else {
            log::warn!("Entry point {} has no coordinate", entry.uri);
            return Vec::new();
        };
        let max_duration = if entry.max_duration > 0 {
            entry.max_duration
        } else {
            self.max_walking_duration
        };
        let radius = degree_radius(point, f64::from(max_duration) * self.walking_speed);

        self.index
            .nearest_neighbor_iter_with_distance_2(&[point.x(), point.y()])
            .take_while(|(_, distance_2)| *distance_2 <= radius * radius)
            .filter_map(|(candidate, _)| {
                let stop = data.stops.get(candidate.data)?;
                let duration = walking_time(point, stop.geometry, self.walking_speed);
                (duration <= max_duration).then_some((candidate.data, duration))
            })
            .take(self.max_nearest_stops)
            .collect()
    }

    fn direct_path(
        &self,
        data: &PublicTransitData,
        origin: &EntryPoint,
        destination: &EntryPoint,
    ) -> Option<StreetPath> {
        let from = origin.coordinate(data)?;
        let to = destination.coordinate(data)?;
        let duration = walking_time(from, to, self.walking_speed);
        (duration <= self.max_walking_duration).then(|| StreetPath {
            duration,
            length: Haversine.distance(from, to),
            mode: StreetMode::Walking,
        })
    }
}
