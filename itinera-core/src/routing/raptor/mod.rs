// RAPTOR (Round-bAsed Public Transit Optimized Router)

pub mod common;
mod engine;
mod path;

pub use common::RaptorError;
pub use engine::RaptorEngine;
pub use path::{Fallback, ItemType, Path, PathItem, extract_path};
