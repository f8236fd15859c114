//! Public transit data model

pub mod data;
pub mod types;

pub use data::PublicTransitData;
pub use types::{RaptorStopId, Route, RouteId, Stop, StopTime, Time};
