// Re-export key components
pub use crate::config::{AccessibilityParams, SearchConfig, SearchParams};
pub use crate::error::Error;
pub use crate::fare::{Fare, FareCalculator, FareError, FlatFare, Ticket, apply_fares};
pub use crate::loading::TransitDataBuilder;
pub use crate::model::entry_point::resolve_entry_point;
pub use crate::model::{
    Accessibility, DateTime, DateTimeUtils, EntryPoint, EntryPointKind, PublicTransitData,
    SearchDirection, SeedPoint, ValidityPeriod,
};
pub use crate::routing::raptor::{ItemType, Path, PathItem, RaptorEngine};
pub use crate::routing::{
    DatedPath, IsochroneEntry, NmResult, Services, compute, compute_many_dates, compute_nm,
    isochrone,
};
pub use crate::street::{CrowFlyStreetNetwork, StreetMode, StreetNetwork, StreetPath};

// Core types for transit routing
pub use crate::RaptorStopId;
pub use crate::RouteId;
pub use crate::Time;
pub use crate::TripId;
