//! Journey planning operations built on the round engine

pub mod isochrone;
pub mod journeys;
pub mod many_to_many;
pub mod raptor;

pub use isochrone::{IsochroneEntry, isochrone};
pub use journeys::{DatedPath, Services, compute, compute_many_dates};
pub use many_to_many::{NmResult, compute_nm};
