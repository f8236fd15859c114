// Building blocks of the round loop
mod bound;
mod filter;
mod state;
mod trip_search;

pub use bound::Bound;
pub use filter::TripFilter;
pub use state::{ArrivalProvenance, BoardProvenance, LabelStore, RaptorError};
pub use trip_search::{Boarding, alight_time, best_trip, board_time};
