use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDateTime;
use itinera_core::prelude::*;
use log::info;

/// Transit data with the street network built over it
pub struct Snapshot {
    data: PublicTransitData,
    street_network: CrowFlyStreetNetwork,
}

impl Snapshot {
    pub fn new(data: PublicTransitData, config: &SearchConfig) -> Self {
        let street_network = CrowFlyStreetNetwork::new(&data, config);
        Self {
            data,
            street_network,
        }
    }

    pub fn data(&self) -> &PublicTransitData {
        &self.data
    }

    pub fn street_network(&self) -> &CrowFlyStreetNetwork {
        &self.street_network
    }

    /// Collaborators of a request on this snapshot
    pub fn services<'s>(&'s self, fare: Option<&'s dyn FareCalculator>) -> Services<'s> {
        let services = Services::new(&self.street_network);
        match fare {
            Some(fare) => services.with_fare(fare),
            None => services,
        }
    }
}

/// Thread safe journey planner.
///
/// ```ignore
/// let planner = Planner::new(data, SearchConfig::default());
/// let params = planner.params(SearchDirection::Forward);
/// let paths = planner.journeys(&origin, &destination, datetime, &params)?;
/// ```
pub struct Planner {
    snapshot: RwLock<Arc<Snapshot>>,
    config: SearchConfig,
    fare: Option<Arc<dyn FareCalculator>>,
}

impl Planner {
    pub fn new(data: PublicTransitData, config: SearchConfig) -> Self {
        let snapshot = Snapshot::new(data, &config);
        info!(
            "Planner ready with {} stops and {} routes",
            snapshot.data.stops.len(),
            snapshot.data.routes.len()
        );
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
            config,
            fare: None,
        }
    }

    #[must_use]
    pub fn with_fare(mut self, fare: Arc<dyn FareCalculator>) -> Self {
        self.fare = Some(fare);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Request parameters from the planner defaults
    pub fn params(&self, direction: SearchDirection) -> SearchParams {
        self.config.params(direction)
    }

    /// Snapshot used by requests starting now
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replaces the transit data, returns the previous snapshot
    pub fn swap_data(&self, data: PublicTransitData) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::new(data, &self.config));
        info!(
            "Swapping transit data: {} stops valid from {}",
            snapshot.data.stops.len(),
            snapshot.data.validity.start
        );
        let mut guard = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, snapshot)
    }

    /// # Errors
    ///
    /// See [`itinera_core::routing::compute`]
    pub fn journeys(
        &self,
        origin: &EntryPoint,
        destination: &EntryPoint,
        datetime: NaiveDateTime,
        params: &SearchParams,
    ) -> Result<Vec<Path>, Error> {
        let snapshot = self.snapshot();
        let mut engine = RaptorEngine::new(snapshot.data());
        let services = snapshot.services(self.fare.as_deref());
        compute(&mut engine, services, origin, destination, datetime, params)
    }

    /// Journeys serialized as a JSON array
    ///
    /// # Errors
    ///
    /// Same as [`Planner::journeys`]
    pub fn journeys_json(
        &self,
        origin: &EntryPoint,
        destination: &EntryPoint,
        datetime: NaiveDateTime,
        params: &SearchParams,
    ) -> Result<String, Error> {
        let paths = self.journeys(origin, destination, datetime, params)?;
        Ok(serde_json::to_string(&paths)?)
    }

    /// # Errors
    ///
    /// See [`itinera_core::routing::compute_many_dates`]
    pub fn journeys_many_dates(
        &self,
        origin: &EntryPoint,
        destination: &EntryPoint,
        datetimes: &[NaiveDateTime],
        params: &SearchParams,
    ) -> Result<Vec<DatedPath>, Error> {
        let snapshot = self.snapshot();
        let mut engine = RaptorEngine::new(snapshot.data());
        let services = snapshot.services(self.fare.as_deref());
        compute_many_dates(&mut engine, services, origin, destination, datetimes, params)
    }

    /// # Errors
    ///
    /// See [`itinera_core::routing::isochrone`]
    pub fn isochrone(
        &self,
        origin: &EntryPoint,
        datetime: NaiveDateTime,
        duration_budget: Time,
        params: &SearchParams,
    ) -> Result<Vec<IsochroneEntry>, Error> {
        let snapshot = self.snapshot();
        let mut engine = RaptorEngine::new(snapshot.data());
        let services = snapshot.services(None);
        isochrone(&mut engine, services, origin, datetime, duration_budget, params)
    }

    /// # Errors
    ///
    /// See [`itinera_core::routing::compute_nm`]
    pub fn compute_nm(
        &self,
        origins: &[EntryPoint],
        destinations: &[EntryPoint],
        datetime: NaiveDateTime,
        params: &SearchParams,
    ) -> Result<Vec<NmResult>, Error> {
        let snapshot = self.snapshot();
        let mut engine = RaptorEngine::new(snapshot.data());
        let services = snapshot.services(self.fare.as_deref());
        compute_nm(&mut engine, services, origins, destinations, datetime, params)
    }
}
