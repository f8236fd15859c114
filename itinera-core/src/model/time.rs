//! Integer datetime encoding and the search direction strategy.
//!
//! A [`DateTime`] counts seconds since midnight of the first day of the
//! data validity period: `day * 86400 + seconds_of_day`. The round loop
//! never touches calendar types; conversion from and to `chrono` happens
//! once at the edges of a request.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use itertools::Either;
use serde::{Deserialize, Serialize};

use crate::Time;

/// Seconds since the start of the validity period
pub type DateTime = u32;

pub const SECONDS_PER_DAY: u32 = 86_400;

pub struct DateTimeUtils;

impl DateTimeUtils {
    /// Unreached value of a forward (earliest arrival) search
    pub const INF: DateTime = u32::MAX;
    /// Unreached value of a backward (latest departure) search
    pub const MIN: DateTime = 0;

    pub const fn set(day: u32, seconds: u32) -> DateTime {
        day * SECONDS_PER_DAY + seconds
    }

    pub const fn date(dt: DateTime) -> u32 {
        dt / SECONDS_PER_DAY
    }

    pub const fn hour(dt: DateTime) -> u32 {
        dt % SECONDS_PER_DAY
    }

    /// Absolute time of a stop time expressed relative to `service_day`
    pub const fn on_day(service_day: u32, seconds: Time) -> DateTime {
        (service_day * SECONDS_PER_DAY).saturating_add(seconds)
    }
}

/// Calendar days covered by the transit data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityPeriod {
    pub start: NaiveDate,
    /// Number of days, the period is `[start, start + days)`
    pub days: u32,
}

impl ValidityPeriod {
    pub fn new(start: NaiveDate, days: u32) -> Self {
        Self { start, days }
    }

    pub fn end(&self) -> NaiveDate {
        self.start + TimeDelta::days(i64::from(self.days))
    }

    pub fn contains_day(&self, day: u32) -> bool {
        day < self.days
    }

    /// Converts a calendar datetime, `None` when outside of the period
    pub fn to_datetime(&self, datetime: NaiveDateTime) -> Option<DateTime> {
        let day = (datetime.date() - self.start).num_days();
        let day = u32::try_from(day).ok().filter(|d| self.contains_day(*d))?;
        let seconds = (datetime.time() - NaiveTime::MIN).num_seconds();
        let seconds = u32::try_from(seconds).ok()?;
        Some(DateTimeUtils::set(day, seconds))
    }

    pub fn to_naive(&self, dt: DateTime) -> NaiveDateTime {
        self.start.and_time(NaiveTime::MIN) + TimeDelta::seconds(i64::from(dt))
    }
}

/// Direction of a search.
///
/// Every comparison, sentinel and trip selection rule of the round loop
/// goes through this type so both directions share one implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDirection {
    /// Depart after the requested time, minimize arrival
    #[default]
    Forward,
    /// Arrive before the requested time, maximize departure
    Backward,
}

impl SearchDirection {
    pub fn clockwise(self) -> bool {
        matches!(self, Self::Forward)
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Unreached sentinel
    pub fn worst(self) -> DateTime {
        match self {
            Self::Forward => DateTimeUtils::INF,
            Self::Backward => DateTimeUtils::MIN,
        }
    }

    pub fn is_reached(self, t: DateTime) -> bool {
        t != self.worst()
    }

    /// Strictly better
    pub fn better(self, a: DateTime, b: DateTime) -> bool {
        match self {
            Self::Forward => a < b,
            Self::Backward => a > b,
        }
    }

    pub fn better_or_equal(self, a: DateTime, b: DateTime) -> bool {
        a == b || self.better(a, b)
    }

    pub fn best_of(self, a: DateTime, b: DateTime) -> DateTime {
        if self.better(b, a) { b } else { a }
    }

    /// Moves `t` along the direction of the search by `duration`
    pub fn combine(self, t: DateTime, duration: Time) -> DateTime {
        if !self.is_reached(t) {
            return t;
        }
        match self {
            Self::Forward => t.saturating_add(duration),
            Self::Backward => t.saturating_sub(duration),
        }
    }

    /// Elapsed seconds between the request time and a label
    pub fn elapsed(self, from: DateTime, to: DateTime) -> Time {
        match self {
            Self::Forward => to.saturating_sub(from),
            Self::Backward => from.saturating_sub(to),
        }
    }

    /// Stop positions of a route in traversal order, starting at `start`
    pub fn positions(self, start: usize, num_stops: usize) -> impl Iterator<Item = usize> {
        match self {
            Self::Forward => Either::Left(start..num_stops),
            Self::Backward => Either::Right((0..=start.min(num_stops.saturating_sub(1))).rev()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_encoding_splits_day_and_hour() {
        let dt = DateTimeUtils::set(3, 8 * 3600 + 15);
        assert_eq!(DateTimeUtils::date(dt), 3);
        assert_eq!(DateTimeUtils::hour(dt), 8 * 3600 + 15);
    }

    #[test]
    fn direction_comparisons_flip() {
        let fwd = SearchDirection::Forward;
        let bwd = SearchDirection::Backward;
        assert!(fwd.better(10, 20));
        assert!(bwd.better(20, 10));
        assert!(!fwd.better(10, 10));
        assert!(fwd.better_or_equal(10, 10));
        assert_eq!(fwd.combine(100, 5), 105);
        assert_eq!(bwd.combine(100, 5), 95);
        assert_eq!(fwd.best_of(7, 3), 3);
        assert_eq!(bwd.best_of(7, 3), 7);
    }

    #[test]
    fn combine_keeps_sentinels() {
        let fwd = SearchDirection::Forward;
        let bwd = SearchDirection::Backward;
        assert_eq!(fwd.combine(DateTimeUtils::INF, 60), DateTimeUtils::INF);
        assert_eq!(bwd.combine(DateTimeUtils::MIN, 60), DateTimeUtils::MIN);
        // underflow collapses onto the backward sentinel
        assert_eq!(bwd.combine(30, 60), DateTimeUtils::MIN);
    }

    #[test]
    fn positions_follow_traversal_order() {
        let fwd: Vec<_> = SearchDirection::Forward.positions(1, 4).collect();
        let bwd: Vec<_> = SearchDirection::Backward.positions(2, 4).collect();
        assert_eq!(fwd, vec![1, 2, 3]);
        assert_eq!(bwd, vec![2, 1, 0]);
        assert_eq!(SearchDirection::Forward.positions(4, 4).count(), 0);
        assert_eq!(SearchDirection::Backward.positions(9, 4).next(), Some(3));
    }

    #[test]
    fn validity_period_rejects_dates_outside() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let period = ValidityPeriod::new(start, 2);
        let inside = start.and_hms_opt(8, 0, 0).unwrap();
        assert_eq!(period.to_datetime(inside), Some(8 * 3600));

        let last_second = period.end().and_time(NaiveTime::MIN) - TimeDelta::seconds(1);
        assert_eq!(
            period.to_datetime(last_second),
            Some(DateTimeUtils::set(1, SECONDS_PER_DAY - 1))
        );
        let past_end = period.end().and_time(NaiveTime::MIN);
        assert_eq!(period.to_datetime(past_end), None);
        let before = start.and_hms_opt(0, 0, 0).unwrap() - TimeDelta::seconds(1);
        assert_eq!(period.to_datetime(before), None);
        assert_eq!(period.to_naive(8 * 3600), inside);
    }
}
