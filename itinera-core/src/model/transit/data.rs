//! Public transit data structure and methods to work with it

use hashbrown::HashMap;

use super::types::{
    Line, PhysicalMode, RaptorStopId, Route, RouteId, Stop, StopArea, StopAreaId, StopTime, Time,
    Transfer, Trip, TripId,
};
use crate::model::time::{SECONDS_PER_DAY, SearchDirection, ValidityPeriod};
use crate::routing::raptor::RaptorError;

/// Main public transit data structure
/// laid out as flat arrays addressed by index, as in the RAPTOR paper
#[derive(Debug, Clone)]
pub struct PublicTransitData {
    /// All routes
    pub routes: Vec<Route>,
    /// Stops for each route
    pub route_stops: Vec<RaptorStopId>,
    /// Schedule for each route stop, trip after trip
    pub stop_times: Vec<StopTime>,
    /// Trips, grouped by route in departure order
    pub trips: Vec<Trip>,
    /// All stops
    pub stops: Vec<Stop>,
    /// Routes through each stop
    pub stop_routes: Vec<RouteId>,
    /// Outgoing footpaths of each stop
    pub transfers: Vec<Transfer>,
    /// Incoming footpaths of each stop
    pub incoming_transfers: Vec<Transfer>,
    pub stop_areas: Vec<StopArea>,
    pub lines: Vec<Line>,
    pub modes: Vec<PhysicalMode>,
    pub stop_index: HashMap<String, RaptorStopId>,
    pub stop_area_index: HashMap<String, StopAreaId>,
    pub validity: ValidityPeriod,
    /// Number of days the latest stop time runs past its service day
    pub max_overflow_days: u32,
}

impl PublicTransitData {
    /// check if such stop exists
    pub fn validate_stop(&self, stop: RaptorStopId) -> Result<(), RaptorError> {
        if stop >= self.stops.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(())
        }
    }

    /// Stops for specific route
    pub fn get_route_stops(&self, route_id: RouteId) -> Result<&[RaptorStopId], RaptorError> {
        self.routes
            .get(route_id)
            .ok_or(RaptorError::InvalidRoute)
            .and_then(|route| {
                self.route_stops
                    .get(route.stops_start..route.stops_start + route.num_stops)
                    .ok_or(RaptorError::InvalidRoute)
            })
    }

    /// `StopTime` slice for specific route and trip
    pub fn get_trip(&self, route_id: RouteId, trip_idx: usize) -> Result<&[StopTime], RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;

        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }

        let start = route.trips_start + trip_idx * route.num_stops;
        self.stop_times
            .get(start..start + route.num_stops)
            .ok_or(RaptorError::InvalidRoute)
    }

    /// Stop time of a trip at a route position
    pub fn stop_time(
        &self,
        route_id: RouteId,
        trip_idx: usize,
        pos: usize,
    ) -> Result<&StopTime, RaptorError> {
        self.get_trip(route_id, trip_idx)?
            .get(pos)
            .ok_or(RaptorError::InvalidStop)
    }

    /// Trip metadata from its index inside the route
    pub fn trip_info(&self, route_id: RouteId, trip_idx: usize) -> Result<&Trip, RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;
        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }
        self.trips
            .get(route.first_trip + trip_idx)
            .ok_or(RaptorError::InvalidTrip)
    }

    pub fn trip_id(&self, route_id: RouteId, trip_idx: usize) -> Result<TripId, RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;
        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }
        Ok(route.first_trip + trip_idx)
    }

    /// Returns transfers from the specified stop
    pub fn get_stop_transfers(&self, stop_id: RaptorStopId) -> Result<&[Transfer], RaptorError> {
        self.validate_stop(stop_id)?;
        let stop = &self.stops[stop_id];
        self.transfers
            .get(stop.transfers_start..stop.transfers_start + stop.transfers_len)
            .ok_or(RaptorError::InvalidStop)
    }

    /// Returns transfers arriving at the specified stop
    pub fn get_incoming_transfers(
        &self,
        stop_id: RaptorStopId,
    ) -> Result<&[Transfer], RaptorError> {
        self.validate_stop(stop_id)?;
        let stop = &self.stops[stop_id];
        self.incoming_transfers
            .get(stop.incoming_start..stop.incoming_start + stop.incoming_len)
            .ok_or(RaptorError::InvalidStop)
    }

    /// Footpaths followed by a search in `direction`
    pub fn footpaths(
        &self,
        stop_id: RaptorStopId,
        direction: SearchDirection,
    ) -> Result<&[Transfer], RaptorError> {
        match direction {
            SearchDirection::Forward => self.get_stop_transfers(stop_id),
            SearchDirection::Backward => self.get_incoming_transfers(stop_id),
        }
    }

    /// Returns routes through the specified stop
    pub fn routes_for_stop(&self, stop_id: RaptorStopId) -> Result<&[RouteId], RaptorError> {
        self.validate_stop(stop_id)?;
        let stop = &self.stops[stop_id];
        self.stop_routes
            .get(stop.routes_start..stop.routes_start + stop.routes_len)
            .ok_or(RaptorError::InvalidStop)
    }

    pub fn stop_by_uri(&self, uri: &str) -> Option<RaptorStopId> {
        self.stop_index.get(uri).copied()
    }

    pub fn stop_area_by_uri(&self, uri: &str) -> Option<&StopArea> {
        self.stop_area_index
            .get(uri)
            .and_then(|&idx| self.stop_areas.get(idx))
    }

    /// Get the name of a transit stop by ID
    pub fn transit_stop_name(&self, stop_id: RaptorStopId) -> Option<&str> {
        self.stops.get(stop_id).map(|stop| stop.name.as_str())
    }

    /// Get the location of a transit stop by ID
    pub fn transit_stop_location(&self, stop_id: RaptorStopId) -> Option<geo::Point<f64>> {
        self.stops.get(stop_id).map(|stop| stop.geometry)
    }

    /// Latest stop time of the whole data set expressed in days
    pub(crate) fn compute_overflow_days(stop_times: &[StopTime]) -> u32 {
        stop_times
            .iter()
            .map(|st| st.arrival.max(st.departure))
            .max()
            .map_or(0, |latest: Time| latest / SECONDS_PER_DAY)
    }
}
