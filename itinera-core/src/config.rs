//! Request defaults and per-request search parameters

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{Accessibility, Error, SearchDirection, Time};

/// Defaults applied to every request of a planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_transfers: usize,
    /// Longest journey considered, in seconds
    pub max_duration: Time,
    /// Longest walk between an entry point and a stop point
    pub max_walking_duration: Time,
    /// Number of stop points considered around a coordinate
    pub max_nearest_stops: usize,
    /// Meters per second
    pub walking_speed: f64,
    /// Longest generated footpath between two stop points
    pub max_transfer_time: Time,
    pub disruption_active: bool,
    pub timeout_ms: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_transfers: 10,
            max_duration: 36_000,
            max_walking_duration: 1_200,
            max_nearest_stops: 10,
            walking_speed: 1.12,
            max_transfer_time: 1_800,
            disruption_active: false,
            timeout_ms: None,
        }
    }
}

impl SearchConfig {
    /// # Errors
    ///
    /// Returns an error if the document is not a valid configuration
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid configuration
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), Error> {
        if !(self.walking_speed.is_finite() && self.walking_speed > 0.0) {
            return Err(Error::InvalidData(format!(
                "walking_speed must be positive, got {}",
                self.walking_speed
            )));
        }
        Ok(())
    }

    /// Parameters of a request using these defaults
    pub fn params(&self, direction: SearchDirection) -> SearchParams {
        SearchParams {
            direction,
            max_transfers: self.max_transfers,
            max_duration: Some(self.max_duration),
            accessibility: AccessibilityParams::default(),
            forbidden_uris: Vec::new(),
            disruption_active: self.disruption_active,
            cancel: None,
            deadline: self
                .timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        }
    }
}

/// Properties required from the stop points and vehicles of a journey
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityParams {
    pub stop_point: Accessibility,
    pub vehicle: Accessibility,
}

/// Constraints of a single request
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub direction: SearchDirection,
    pub max_transfers: usize,
    /// `None` lets the search run until the round limit
    pub max_duration: Option<Time>,
    pub accessibility: AccessibilityParams,
    /// Uris of lines, physical modes, stop points or stop areas to avoid
    pub forbidden_uris: Vec<String>,
    /// Use the disrupted validity of trips
    pub disruption_active: bool,
    pub cancel: Option<Arc<AtomicBool>>,
    pub deadline: Option<Instant>,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchConfig::default().params(SearchDirection::Forward)
    }
}

impl SearchParams {
    #[must_use]
    pub fn with_direction(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_max_transfers(mut self, max_transfers: usize) -> Self {
        self.max_transfers = max_transfers;
        self
    }

    #[must_use]
    pub fn with_max_duration(mut self, max_duration: Option<Time>) -> Self {
        self.max_duration = max_duration;
        self
    }

    #[must_use]
    pub fn with_forbidden_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_uris = uris.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
