//! Origins and destinations of a request and their resolution into
//! weighted stop point sets.

use geo::{Centroid, MultiPoint, Point};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::street::StreetNetwork;
use crate::{PublicTransitData, RaptorStopId, Time};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryPointKind {
    StopPoint,
    StopArea,
    Coord(Point<f64>),
    Address(Point<f64>),
}

/// Caller specified origin or destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub uri: String,
    pub kind: EntryPointKind,
    /// Fixed offset added to every access duration of this entry
    pub access_duration: Time,
    /// Longest street access allowed, in seconds
    pub max_duration: Time,
}

impl EntryPoint {
    pub fn stop_point(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: EntryPointKind::StopPoint,
            access_duration: 0,
            max_duration: 0,
        }
    }

    pub fn stop_area(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: EntryPointKind::StopArea,
            access_duration: 0,
            max_duration: 0,
        }
    }

    pub fn coord(point: Point<f64>, max_duration: Time) -> Self {
        Self {
            uri: format!("{};{}", point.x(), point.y()),
            kind: EntryPointKind::Coord(point),
            access_duration: 0,
            max_duration,
        }
    }

    pub fn address(uri: impl Into<String>, point: Point<f64>, max_duration: Time) -> Self {
        Self {
            uri: uri.into(),
            kind: EntryPointKind::Address(point),
            access_duration: 0,
            max_duration,
        }
    }

    #[must_use]
    pub fn with_access_duration(mut self, access_duration: Time) -> Self {
        self.access_duration = access_duration;
        self
    }

    /// Geographic position, stop areas use the centroid of their stop points
    pub fn coordinate(&self, data: &PublicTransitData) -> Option<Point<f64>> {
        match &self.kind {
            EntryPointKind::Coord(point) | EntryPointKind::Address(point) => Some(*point),
            EntryPointKind::StopPoint => data
                .stop_by_uri(&self.uri)
                .and_then(|stop| data.transit_stop_location(stop)),
            EntryPointKind::StopArea => {
                let area = data.stop_area_by_uri(&self.uri)?;
                let points: MultiPoint = area
                    .stop_points
                    .iter()
                    .filter_map(|&stop| data.transit_stop_location(stop))
                    .collect();
                points.centroid()
            }
        }
    }
}

/// Stop point seeding (or terminating) a search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPoint {
    pub stop: RaptorStopId,
    /// Access or egress duration, entry offset included
    pub duration: Time,
    /// Index of the entry point the stop was resolved from
    pub entry: usize,
}

/// Resolves an entry point into the stop points it gives access to.
///
/// Stop points and stop areas resolve through the data indices, coordinates
/// and addresses through the street network. When a stop is reachable
/// several ways the shortest access is kept. The result is ordered by stop.
pub fn resolve_entry_point(
    data: &PublicTransitData,
    street_network: &dyn StreetNetwork,
    entry_point: &EntryPoint,
    entry: usize,
) -> Vec<SeedPoint> {
    let candidates: Vec<(RaptorStopId, Time)> = match &entry_point.kind {
        EntryPointKind::StopPoint => data
            .stop_by_uri(&entry_point.uri)
            .map(|stop| vec![(stop, 0)])
            .unwrap_or_default(),
        EntryPointKind::StopArea => data
            .stop_area_by_uri(&entry_point.uri)
            .map(|area| area.stop_points.iter().map(|&stop| (stop, 0)).collect())
            .unwrap_or_default(),
        EntryPointKind::Coord(_) | EntryPointKind::Address(_) => {
            street_network.stop_points_near(data, entry_point)
        }
    };

    let mut best: HashMap<RaptorStopId, Time> = HashMap::with_capacity(candidates.len());
    for (stop, duration) in candidates {
        if data.validate_stop(stop).is_err() {
            log::warn!("Entry point {} resolved to unknown stop {stop}", entry_point.uri);
            continue;
        }
        best.entry(stop)
            .and_modify(|d| *d = (*d).min(duration))
            .or_insert(duration);
    }

    let mut seeds: Vec<SeedPoint> = best
        .into_iter()
        .map(|(stop, duration)| SeedPoint {
            stop,
            duration: duration.saturating_add(entry_point.access_duration),
            entry,
        })
        .collect();
    seeds.sort_unstable_by_key(|seed| seed.stop);
    seeds
}
