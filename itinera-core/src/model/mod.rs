//! Data model for public transportation routing
//!
//! Contains types and structures for representing a transit network.

pub mod entry_point;
pub mod time;
pub mod transit;

pub use entry_point::{EntryPoint, EntryPointKind, SeedPoint};
pub use time::{DateTime, DateTimeUtils, SearchDirection, ValidityPeriod};
pub use transit::data::PublicTransitData;
pub use transit::types::{
    Accessibility, Line, PhysicalMode, RaptorStopId, Route, RouteId, Stop, StopArea, StopTime,
    Time, Transfer, Trip, TripId,
};
