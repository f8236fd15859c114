//! Construction of [`crate::PublicTransitData`] from in-memory records.
//! Feed parsing stays with the caller.

mod builder;
pub(crate) mod transfers;

pub use builder::{PendingTrip, TransitDataBuilder};
