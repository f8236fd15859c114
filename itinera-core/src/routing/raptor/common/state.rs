use thiserror::Error;

use crate::model::{DateTime, SearchDirection};
use crate::{RaptorStopId, RouteId, Time};

#[derive(Error, Debug, PartialEq)]
pub enum RaptorError {
    #[error("Invalid stop ID")]
    InvalidStop,
    #[error("Invalid route ID")]
    InvalidRoute,
    #[error("Invalid trip index")]
    InvalidTrip,
    #[error("Invalid time value")]
    InvalidTime,
    #[error("Invalid journey")]
    InvalidJourney,
}

/// How a stop was reached by a vehicle (or seeded)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrivalProvenance {
    #[default]
    Unreached,
    /// Round 0 seed
    Access { entry: usize, duration: Time },
    /// Positions are route positions in scan order: the trip was caught at
    /// `from_pos` and the label was written at `to_pos`.
    Vehicle {
        route: RouteId,
        trip: usize,
        service_day: u32,
        from_pos: usize,
        to_pos: usize,
    },
}

/// How a stop became available for the next boarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardProvenance {
    #[default]
    Unreached,
    /// Straight from the arrival label of the same stop and round
    SameStop,
    /// Footpath from (forward) or towards (backward) `via`
    Walk { via: RaptorStopId, duration: Time },
}

/// Per round, per stop labels of a search.
///
/// Two layers are kept, mirroring the arrival and board times of a stop:
/// the arrival layer holds times reached by a vehicle and the board layer
/// times from which the next vehicle can be caught, after an optional
/// footpath. Only the board layer is visible through [`LabelStore::get`].
#[derive(Debug)]
pub struct LabelStore {
    direction: SearchDirection,
    num_stops: usize,
    rounds: usize,
    arrival_times: Vec<Vec<DateTime>>,
    arrival_provenance: Vec<Vec<ArrivalProvenance>>,
    board_times: Vec<Vec<DateTime>>,
    board_provenance: Vec<Vec<BoardProvenance>>,
    best_arrival: Vec<DateTime>,
    best_board: Vec<DateTime>,
    best_board_round: Vec<usize>,
}

impl LabelStore {
    pub fn new(num_stops: usize, rounds: usize, direction: SearchDirection) -> Self {
        let worst = direction.worst();
        LabelStore {
            direction,
            num_stops,
            rounds,
            arrival_times: vec![vec![worst; num_stops]; rounds],
            arrival_provenance: vec![vec![ArrivalProvenance::Unreached; num_stops]; rounds],
            board_times: vec![vec![worst; num_stops]; rounds],
            board_provenance: vec![vec![BoardProvenance::Unreached; num_stops]; rounds],
            best_arrival: vec![worst; num_stops],
            best_board: vec![worst; num_stops],
            best_board_round: vec![usize::MAX; num_stops],
        }
    }

    /// Restores every label to the unreached sentinel of `direction`,
    /// growing the store when more rounds are needed.
    pub fn reset(&mut self, rounds: usize, direction: SearchDirection) {
        let worst = direction.worst();
        let num_stops = self.num_stops;
        let allocated = self.arrival_times.len();
        for round in 0..rounds.min(allocated) {
            self.arrival_times[round].fill(worst);
            self.arrival_provenance[round].fill(ArrivalProvenance::Unreached);
            self.board_times[round].fill(worst);
            self.board_provenance[round].fill(BoardProvenance::Unreached);
        }
        for _ in allocated..rounds {
            self.arrival_times.push(vec![worst; num_stops]);
            self.arrival_provenance
                .push(vec![ArrivalProvenance::Unreached; num_stops]);
            self.board_times.push(vec![worst; num_stops]);
            self.board_provenance
                .push(vec![BoardProvenance::Unreached; num_stops]);
        }
        self.best_arrival.fill(worst);
        self.best_board.fill(worst);
        self.best_board_round.fill(usize::MAX);
        self.rounds = rounds;
        self.direction = direction;
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn num_stops(&self) -> usize {
        self.num_stops
    }

    fn in_range(&self, round: usize, stop: RaptorStopId) -> bool {
        round < self.rounds && stop < self.num_stops
    }

    /// Board label, unreached sentinel when never written
    pub fn get(&self, round: usize, stop: RaptorStopId) -> DateTime {
        if self.in_range(round, stop) {
            self.board_times[round][stop]
        } else {
            self.direction.worst()
        }
    }

    /// Writes a board label if it improves on every previous round.
    pub fn set(
        &mut self,
        round: usize,
        stop: RaptorStopId,
        time: DateTime,
        provenance: BoardProvenance,
    ) -> bool {
        debug_assert!(self.in_range(round, stop), "label ({round}, {stop}) out of range");
        if !self.in_range(round, stop) || !self.direction.better(time, self.best_board[stop]) {
            return false;
        }
        self.board_times[round][stop] = time;
        self.board_provenance[round][stop] = provenance;
        self.best_board[stop] = time;
        self.best_board_round[stop] = round;
        true
    }

    pub fn arrival(&self, round: usize, stop: RaptorStopId) -> DateTime {
        if self.in_range(round, stop) {
            self.arrival_times[round][stop]
        } else {
            self.direction.worst()
        }
    }

    /// Writes an arrival label if it improves on every previous round.
    pub fn set_arrival(
        &mut self,
        round: usize,
        stop: RaptorStopId,
        time: DateTime,
        provenance: ArrivalProvenance,
    ) -> bool {
        debug_assert!(self.in_range(round, stop), "label ({round}, {stop}) out of range");
        if !self.in_range(round, stop) || !self.direction.better(time, self.best_arrival[stop]) {
            return false;
        }
        self.arrival_times[round][stop] = time;
        self.arrival_provenance[round][stop] = provenance;
        self.best_arrival[stop] = time;
        true
    }

    pub fn board_provenance(&self, round: usize, stop: RaptorStopId) -> BoardProvenance {
        if self.in_range(round, stop) {
            self.board_provenance[round][stop]
        } else {
            BoardProvenance::Unreached
        }
    }

    pub fn arrival_provenance(&self, round: usize, stop: RaptorStopId) -> ArrivalProvenance {
        if self.in_range(round, stop) {
            self.arrival_provenance[round][stop]
        } else {
            ArrivalProvenance::Unreached
        }
    }

    /// Best board label across all rounds
    pub fn best(&self, stop: RaptorStopId) -> DateTime {
        self.best_board
            .get(stop)
            .copied()
            .unwrap_or(self.direction.worst())
    }

    /// Smallest round achieving [`LabelStore::best`]
    pub fn best_round(&self, stop: RaptorStopId) -> Option<usize> {
        self.best_board_round
            .get(stop)
            .copied()
            .filter(|&round| round != usize::MAX)
    }

    pub fn best_arrival(&self, stop: RaptorStopId) -> DateTime {
        self.best_arrival
            .get(stop)
            .copied()
            .unwrap_or(self.direction.worst())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateTimeUtils;

    #[test]
    fn labels_only_improve() {
        let mut labels = LabelStore::new(3, 3, SearchDirection::Forward);
        assert_eq!(labels.get(0, 1), DateTimeUtils::INF);
        assert!(labels.set(0, 1, 100, BoardProvenance::SameStop));
        assert!(!labels.set(1, 1, 100, BoardProvenance::SameStop));
        assert!(!labels.set(1, 1, 120, BoardProvenance::SameStop));
        assert!(labels.set(2, 1, 90, BoardProvenance::SameStop));
        assert_eq!(labels.best(1), 90);
        assert_eq!(labels.best_round(1), Some(2));
        assert_eq!(labels.get(1, 1), DateTimeUtils::INF);
        assert_eq!(labels.best_round(0), None);
    }

    #[test]
    fn backward_labels_prefer_later_times() {
        let mut labels = LabelStore::new(2, 2, SearchDirection::Backward);
        assert_eq!(labels.get(0, 0), DateTimeUtils::MIN);
        assert!(labels.set(0, 0, 100, BoardProvenance::SameStop));
        assert!(!labels.set(1, 0, 90, BoardProvenance::SameStop));
        assert!(labels.set(1, 0, 110, BoardProvenance::SameStop));
        assert_eq!(labels.best(0), 110);
    }

    #[test]
    fn layers_are_independent() {
        let mut labels = LabelStore::new(2, 2, SearchDirection::Forward);
        let access = ArrivalProvenance::Access {
            entry: 0,
            duration: 0,
        };
        assert!(labels.set_arrival(0, 0, 50, access));
        assert_eq!(labels.get(0, 0), DateTimeUtils::INF);
        assert_eq!(labels.arrival(0, 0), 50);
        assert_eq!(labels.arrival_provenance(0, 0), access);
    }

    #[test]
    fn reset_switches_direction_and_grows() {
        let mut labels = LabelStore::new(2, 1, SearchDirection::Forward);
        labels.set(0, 1, 10, BoardProvenance::SameStop);
        labels.reset(3, SearchDirection::Backward);
        assert_eq!(labels.rounds(), 3);
        assert_eq!(labels.get(0, 1), DateTimeUtils::MIN);
        assert_eq!(labels.get(2, 1), DateTimeUtils::MIN);
        assert_eq!(labels.best_round(1), None);
        assert_eq!(labels.board_provenance(0, 1), BoardProvenance::Unreached);
    }
}
