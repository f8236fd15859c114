use chrono::NaiveDateTime;
use itinera_core::prelude::*;
use itinera_core::routing::raptor::common::Bound;
use log::warn;
use rayon::prelude::*;

use crate::Snapshot;

/// Travel times between every pair of `points`, `None` when unreachable.
///
/// Row `i` holds the times from `points[i]` going forward, or to
/// `points[i]` going backward. A resolved point is 0 seconds away from
/// itself. Rows are computed in parallel with one
/// engine per worker thread; a failed row is logged and left empty.
///
/// # Errors
///
/// Returns [`Error::DateOutOfBounds`] when `datetime` is outside the data
/// period
pub fn travel_time_matrix(
    snapshot: &Snapshot,
    points: &[EntryPoint],
    datetime: NaiveDateTime,
    params: &SearchParams,
) -> Result<Vec<Vec<Option<Time>>>, Error> {
    let data = snapshot.data();
    let init = data
        .validity
        .to_datetime(datetime)
        .ok_or(Error::DateOutOfBounds)?;
    let direction = params.direction;
    let seeds: Vec<Vec<SeedPoint>> = points
        .iter()
        .enumerate()
        .map(|(idx, point)| resolve_entry_point(data, snapshot.street_network(), point, idx))
        .collect();
    let bound = params
        .max_duration
        .map_or(Bound::unbounded(direction), |max| {
            Bound::from_duration(direction, init, max)
        });

    let matrix = seeds
        .par_iter()
        .enumerate()
        .map_init(
            || RaptorEngine::new(data),
            |engine, (row, sources)| {
                if sources.is_empty() {
                    return vec![None; points.len()];
                }
                if let Err(e) = engine.run(sources, &[], init, bound, params, false) {
                    warn!("Travel times from point {row} failed: {e}");
                    return vec![None; points.len()];
                }
                let labels = engine.labels();
                seeds
                    .iter()
                    .enumerate()
                    .map(|(col, targets)| {
                        if col == row {
                            return Some(0);
                        }
                        targets
                            .iter()
                            .filter_map(|target| {
                                let best = labels.best(target.stop);
                                direction.is_reached(best).then(|| {
                                    let reached = direction.combine(best, target.duration);
                                    direction.elapsed(init, reached)
                                })
                            })
                            .min()
                    })
                    .collect::<Vec<_>>()
            },
        )
        .collect::<Vec<_>>();

    Ok(matrix)
}
