use thiserror::Error;

use crate::routing::raptor::RaptorError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Requested datetime is outside of the data validity period")]
    DateOutOfBounds,
    #[error("No stop point found around the origin")]
    NoOriginPoint,
    #[error("No stop point found around the destination")]
    NoDestinationPoint,
    #[error("No stop point found around the origin nor the destination")]
    NoOriginNorDestinationPoint,
    #[error("No solution found")]
    NoSolution,
    #[error("Search cancelled")]
    Cancelled,
    #[error("Malformed label state: {0}")]
    MalformedLabelState(String),
    #[error("Raptor error: {0}")]
    Raptor(#[from] RaptorError),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}
