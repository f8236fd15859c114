//! Round-based public transport journey planning.
//!
//! The crate is organised around an immutable [`PublicTransitData`] graph
//! shared by any number of [`RaptorEngine`] instances, one per in-flight
//! request.

pub mod config;
pub mod error;
pub mod fare;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod street;

pub use config::{AccessibilityParams, SearchConfig, SearchParams};
pub use error::Error;
pub use model::{
    Accessibility, DateTime, DateTimeUtils, EntryPoint, EntryPointKind, PublicTransitData,
    SearchDirection, SeedPoint, ValidityPeriod,
};
pub use model::transit::types::{LineId, ModeId, RaptorStopId, RouteId, StopAreaId, Time, TripId};
pub use routing::raptor::{Path, PathItem, RaptorEngine, RaptorError};
