use crate::Time;
use crate::model::{DateTime, SearchDirection};

/// Pruning threshold of a search. A candidate time is kept only when it is
/// strictly better than the bound; the bound never loosens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    value: DateTime,
    direction: SearchDirection,
}

impl Bound {
    pub fn unbounded(direction: SearchDirection) -> Self {
        Self {
            value: direction.worst(),
            direction,
        }
    }

    /// Bound admitting `t` itself
    pub fn inclusive(direction: SearchDirection, t: DateTime) -> Self {
        Self {
            value: direction.combine(t, 1),
            direction,
        }
    }

    /// Bound admitting every time at most `max_duration` away from `init`
    pub fn from_duration(direction: SearchDirection, init: DateTime, max_duration: Time) -> Self {
        Self::inclusive(direction, direction.combine(init, max_duration))
    }

    pub fn value(&self) -> DateTime {
        self.value
    }

    pub fn admits(&self, t: DateTime) -> bool {
        self.direction.better(t, self.value)
    }

    /// Tightens to `t` when it is better, returns whether the bound moved
    pub fn tighten(&mut self, t: DateTime) -> bool {
        if self.admits(t) {
            self.value = t;
            true
        } else {
            false
        }
    }

    /// Keeps the tighter of the two bounds
    pub fn merge(&mut self, other: Bound) {
        debug_assert_eq!(self.direction, other.direction);
        self.tighten(other.value);
    }
}
