//! Fare computation seam, applied to paths after extraction

use serde::Serialize;
use thiserror::Error;

use crate::PublicTransitData;
use crate::routing::raptor::{ItemType, Path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub name: String,
    /// Price in the smallest currency unit
    pub cost: u32,
    /// Indices of the path items covered by the ticket
    pub sections: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fare {
    pub total: u32,
    pub currency: String,
    pub tickets: Vec<Ticket>,
}

#[derive(Error, Debug, PartialEq)]
pub enum FareError {
    #[error("No ticket covers section {0}")]
    NoTicket(usize),
    #[error("Unknown trip {0}")]
    UnknownTrip(usize),
    #[error("Fare computation failed: {0}")]
    Other(String),
}

pub trait FareCalculator: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when no fare can be determined for the path
    fn compute_fare(&self, data: &PublicTransitData, path: &Path) -> Result<Fare, FareError>;
}

/// One ticket per vehicle boarding, staying in the vehicle is free
#[derive(Debug, Clone)]
pub struct FlatFare {
    pub cost: u32,
    pub currency: String,
}

impl FlatFare {
    pub fn new(cost: u32, currency: impl Into<String>) -> Self {
        Self {
            cost,
            currency: currency.into(),
        }
    }
}

impl FareCalculator for FlatFare {
    fn compute_fare(&self, data: &PublicTransitData, path: &Path) -> Result<Fare, FareError> {
        let mut tickets: Vec<Ticket> = Vec::new();
        let mut stay_in = false;
        for (idx, item) in path.items.iter().enumerate() {
            match item.kind {
                ItemType::StayIn => stay_in = true,
                ItemType::PublicTransport => {
                    let trip = item.trip.ok_or(FareError::NoTicket(idx))?;
                    let trip = data.trips.get(trip).ok_or(FareError::UnknownTrip(trip))?;
                    match tickets.last_mut() {
                        Some(ticket) if stay_in => ticket.sections.push(idx),
                        _ => tickets.push(Ticket {
                            name: trip.uri.clone(),
                            cost: self.cost,
                            sections: vec![idx],
                        }),
                    }
                    stay_in = false;
                }
                _ => {}
            }
        }
        Ok(Fare {
            total: tickets.iter().map(|t| t.cost).sum(),
            currency: self.currency.clone(),
            tickets,
        })
    }
}

/// Attaches a fare to every path, a failure leaves the path without one
pub fn apply_fares(calculator: &dyn FareCalculator, data: &PublicTransitData, paths: &mut [Path]) {
    for path in paths {
        match calculator.compute_fare(data, path) {
            Ok(fare) => path.fare = Some(fare),
            Err(e) => log::warn!("Fare computation failed, keeping path without fare: {e}"),
        }
    }
}
