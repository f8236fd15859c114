//! Journey planning service on top of `itinera_core`.
//!
//! [`Planner`] owns the current transit data snapshot and answers requests
//! from any number of threads, each request running its own engine. New
//! data replaces the snapshot as a whole while requests in flight keep the
//! one they started with.

pub mod isochrone;
pub mod matrix;
pub mod planner;

pub use isochrone::bulk_isochrones;
pub use matrix::travel_time_matrix;
pub use planner::{Planner, Snapshot};

pub use itinera_core::prelude;
