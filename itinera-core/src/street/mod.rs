//! Street network seam: access to stop points around fuzzy entry points and
//! direct street journeys.

mod crow_fly;

pub use crow_fly::CrowFlyStreetNetwork;

use serde::Serialize;

use crate::{EntryPoint, PublicTransitData, RaptorStopId, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreetMode {
    Walking,
    Bike,
    Car,
}

/// Direct journey between two entry points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreetPath {
    pub duration: Time,
    /// Meters
    pub length: f64,
    pub mode: StreetMode,
}

pub trait StreetNetwork: Send + Sync {
    /// Stop points reachable from a coordinate entry point with their
    /// access duration
    fn stop_points_near(
        &self,
        data: &PublicTransitData,
        entry: &EntryPoint,
    ) -> Vec<(RaptorStopId, Time)>;

    /// Journey without public transport, `None` when out of reach
    fn direct_path(
        &self,
        data: &PublicTransitData,
        origin: &EntryPoint,
        destination: &EntryPoint,
    ) -> Option<StreetPath>;
}
