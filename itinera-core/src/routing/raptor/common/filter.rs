use fixedbitset::FixedBitSet;
use hashbrown::HashSet;

use crate::config::{AccessibilityParams, SearchParams};
use crate::model::{SearchDirection, StopTime, Trip};
use crate::{PublicTransitData, RaptorStopId, RouteId};

/// Request constraints compiled against the data: forbidden routes and
/// stops as bit sets, accessibility requirements and the validity layer.
#[derive(Debug, Clone)]
pub struct TripFilter {
    forbidden_routes: FixedBitSet,
    forbidden_stops: FixedBitSet,
    accessibility: AccessibilityParams,
    disruption_active: bool,
}

impl TripFilter {
    pub fn new(data: &PublicTransitData, params: &SearchParams) -> Self {
        let forbidden: HashSet<&str> = params.forbidden_uris.iter().map(String::as_str).collect();
        let mut matched: HashSet<&str> = HashSet::with_capacity(forbidden.len());

        let mut forbidden_routes = FixedBitSet::with_capacity(data.routes.len());
        for (route_id, route) in data.routes.iter().enumerate() {
            let line = data.lines.get(route.line).map(|line| line.uri.as_str());
            let mode = data.modes.get(route.mode).map(|mode| mode.uri.as_str());
            for uri in [line, mode].into_iter().flatten() {
                if let Some(&uri) = forbidden.get(uri) {
                    forbidden_routes.insert(route_id);
                    matched.insert(uri);
                }
            }
        }

        let mut forbidden_stops = FixedBitSet::with_capacity(data.stops.len());
        for &uri in &forbidden {
            if let Some(stop) = data.stop_by_uri(uri) {
                forbidden_stops.insert(stop);
                matched.insert(uri);
            } else if let Some(area) = data.stop_area_by_uri(uri) {
                for &stop in &area.stop_points {
                    forbidden_stops.insert(stop);
                }
                matched.insert(uri);
            }
        }

        for uri in forbidden.difference(&matched) {
            log::warn!("Ignoring unknown forbidden uri {uri}");
        }

        Self {
            forbidden_routes,
            forbidden_stops,
            accessibility: params.accessibility,
            disruption_active: params.disruption_active,
        }
    }

    pub fn route_allowed(&self, route: RouteId) -> bool {
        !self.forbidden_routes.contains(route)
    }

    /// Stop may be boarded at, alighted at and walked to
    pub fn stop_usable(&self, data: &PublicTransitData, stop: RaptorStopId) -> bool {
        !self.forbidden_stops.contains(stop)
            && data
                .stops
                .get(stop)
                .is_some_and(|s| s.accessibility.contains(self.accessibility.stop_point))
    }

    /// Trip runs on `service_day` and carries the requested equipment
    pub fn trip_usable(&self, trip: &Trip, service_day: u32) -> bool {
        trip.is_active(service_day, self.disruption_active)
            && trip.accessibility.contains(self.accessibility.vehicle)
    }

    /// Boarding in the direction of the search: pick-up going forward,
    /// drop-off going backward.
    pub fn can_board(direction: SearchDirection, st: &StopTime) -> bool {
        match direction {
            SearchDirection::Forward => st.pick_up,
            SearchDirection::Backward => st.drop_off,
        }
    }

    pub fn can_alight(direction: SearchDirection, st: &StopTime) -> bool {
        Self::can_board(direction.reverse(), st)
    }
}
