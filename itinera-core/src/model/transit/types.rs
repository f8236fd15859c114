use std::ops::BitOr;

use fixedbitset::FixedBitSet;
use geo::Point;
use serde::{Deserialize, Serialize};

/// Index of a stop point in [`super::PublicTransitData::stops`]
pub type RaptorStopId = usize;
/// Index of a route in [`super::PublicTransitData::routes`]
pub type RouteId = usize;
/// Index of a trip in [`super::PublicTransitData::trips`]
pub type TripId = usize;
pub type LineId = usize;
pub type ModeId = usize;
pub type StopAreaId = usize;
/// Seconds
pub type Time = u32;

/// Accessibility properties of a stop point or a vehicle, as a bit set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Accessibility(u8);

impl Accessibility {
    pub const NONE: Self = Self(0);
    pub const WHEELCHAIR: Self = Self(1);
    pub const BIKE: Self = Self(1 << 1);
    pub const AIR_CONDITIONED: Self = Self(1 << 2);
    pub const VISUAL_ANNOUNCEMENT: Self = Self(1 << 3);
    pub const AUDIBLE_ANNOUNCEMENT: Self = Self(1 << 4);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Every property of `required` is present
    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }
}

impl BitOr for Accessibility {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Stop time relative to the midnight of the trip's service day.
/// Values past 86400 belong to trips running after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopTime {
    pub arrival: Time,
    pub departure: Time,
    /// Boarding allowed
    pub pick_up: bool,
    /// Alighting allowed
    pub drop_off: bool,
}

impl StopTime {
    pub fn new(arrival: Time, departure: Time) -> Self {
        Self {
            arrival,
            departure,
            pick_up: true,
            drop_off: true,
        }
    }
}

/// Sequence of stops served by FIFO trips
#[derive(Debug, Clone)]
pub struct Route {
    pub line: LineId,
    pub mode: ModeId,
    pub num_trips: usize,
    pub num_stops: usize,
    /// Offset in `route_stops`
    pub stops_start: usize,
    /// Offset in `stop_times`
    pub trips_start: usize,
    /// Offset in `trips`
    pub first_trip: TripId,
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub uri: String,
    pub route: RouteId,
    /// Trips sharing a block are run by the same vehicle
    pub block_id: Option<String>,
    pub accessibility: Accessibility,
    /// Service days on which the trip runs
    pub validity: FixedBitSet,
    /// Service days with disruptions applied
    pub adapted_validity: FixedBitSet,
}

impl Trip {
    pub fn is_active(&self, service_day: u32, disruption_active: bool) -> bool {
        let days = if disruption_active {
            &self.adapted_validity
        } else {
            &self.validity
        };
        days.contains(service_day as usize)
    }
}

#[derive(Debug, Clone)]
pub struct Stop {
    pub uri: String,
    pub name: String,
    pub geometry: Point<f64>,
    pub stop_area: Option<StopAreaId>,
    pub accessibility: Accessibility,
    pub routes_start: usize,
    pub routes_len: usize,
    pub transfers_start: usize,
    pub transfers_len: usize,
    pub incoming_start: usize,
    pub incoming_len: usize,
}

#[derive(Debug, Clone)]
pub struct StopArea {
    pub uri: String,
    pub name: String,
    pub stop_points: Vec<RaptorStopId>,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct PhysicalMode {
    pub uri: String,
    pub name: String,
}

/// Walking connection between two stop points.
///
/// In the outgoing table `target_stop` is the destination of the walk, in
/// the incoming table it is its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub target_stop: RaptorStopId,
    pub duration: Time,
}
