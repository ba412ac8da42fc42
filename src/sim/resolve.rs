//! Lane collision and wagon collection
//!
//! Runs once per tick, after scrolling, so every check sees this tick's
//! geometry. Tests use the train's eased lateral position against windows
//! narrower than a lane, so a half-finished lane change does not clip the
//! neighbouring track.

use super::rows::{Row, RowId};
use crate::consts::*;
use crate::lane_offset;

/// What one resolver pass observed
#[derive(Debug, Default)]
pub struct Outcome {
    /// An obstacle overlapped the train. First hit wins; nothing else is
    /// checked for the rest of the tick.
    pub hit: bool,
    /// A wagon was collected this tick (marked on the row already)
    pub collected: Option<RowId>,
    /// Rows that crossed the pass threshold and want recycling
    pub passed: Vec<RowId>,
}

/// Evaluate all active rows against the train.
///
/// Mutates the rows only to latch the `collected` and `passed` flags; the
/// state machine applies everything else from the returned outcome.
pub fn resolve(rows: &mut [Row], lateral: f32, track_count: usize) -> Outcome {
    let mut outcome = Outcome::default();

    for row in rows.iter_mut() {
        // Pass check is independent of hit/collect; latch before anything
        // else so a row is reported exactly once.
        if !row.passed && row.forward > PLAYER_Z + PASS_THRESHOLD {
            row.passed = true;
            outcome.passed.push(row.id);
            continue;
        }

        for obstacle in &row.obstacles {
            let obstacle_x = lane_offset(obstacle.lane, track_count, LANE_WIDTH);
            if (row.forward - PLAYER_Z).abs() < OBSTACLE_HIT_RANGE
                && (obstacle_x - lateral).abs() < OBSTACLE_HIT_WIDTH
            {
                outcome.hit = true;
                return outcome;
            }
        }

        if !row.collected
            && outcome.collected.is_none()
            && (row.forward - PLAYER_Z).abs() < COLLECT_RANGE
            && (lane_offset(row.safe_lane, track_count, LANE_WIDTH) - lateral).abs()
                < COLLECT_WIDTH
        {
            row.collected = true;
            outcome.collected = Some(row.id);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::RecordingBackend;
    use crate::sim::rows::RowManager;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rows_at(z: f32, track_count: usize, seed: u64) -> (RowManager, RecordingBackend) {
        let mut rows = RowManager::new(track_count);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut backend = RecordingBackend::new();
        rows.spawn_row(z, &mut rng, &mut backend);
        (rows, backend)
    }

    #[test]
    fn test_obstacle_hit_in_unsafe_lane() {
        let (mut rows, _backend) = rows_at(PLAYER_Z, 2, 1);
        let unsafe_lane = rows.rows()[0].obstacles[0].lane;
        let lateral = lane_offset(unsafe_lane, 2, LANE_WIDTH);

        let outcome = resolve(rows.rows_mut(), lateral, 2);
        assert!(outcome.hit);
        assert!(outcome.collected.is_none());
    }

    #[test]
    fn test_collection_in_safe_lane() {
        let (mut rows, _backend) = rows_at(PLAYER_Z, 2, 1);
        let safe = rows.rows()[0].safe_lane;
        let lateral = lane_offset(safe, 2, LANE_WIDTH);

        let outcome = resolve(rows.rows_mut(), lateral, 2);
        assert!(!outcome.hit);
        assert_eq!(outcome.collected, Some(rows.rows()[0].id));
        assert!(rows.rows()[0].collected);
    }

    #[test]
    fn test_collection_is_idempotent() {
        let (mut rows, _backend) = rows_at(PLAYER_Z, 2, 1);
        let safe = rows.rows()[0].safe_lane;
        let lateral = lane_offset(safe, 2, LANE_WIDTH);

        assert!(resolve(rows.rows_mut(), lateral, 2).collected.is_some());
        assert!(resolve(rows.rows_mut(), lateral, 2).collected.is_none());
    }

    #[test]
    fn test_near_miss_mid_lane_change() {
        let (mut rows, _backend) = rows_at(PLAYER_Z, 2, 1);
        let unsafe_lane = rows.rows()[0].obstacles[0].lane;
        let obstacle_x = lane_offset(unsafe_lane, 2, LANE_WIDTH);
        // Just outside the hit half-width: close, but no collision
        let lateral = obstacle_x + OBSTACLE_HIT_WIDTH + 0.05;

        let outcome = resolve(rows.rows_mut(), lateral, 2);
        assert!(!outcome.hit);
    }

    #[test]
    fn test_out_of_range_row_is_ignored() {
        let (mut rows, _backend) = rows_at(-SPAWN_LEAD, 2, 1);
        let safe = rows.rows()[0].safe_lane;
        let lateral = lane_offset(safe, 2, LANE_WIDTH);

        let outcome = resolve(rows.rows_mut(), lateral, 2);
        assert!(!outcome.hit);
        assert!(outcome.collected.is_none());
        assert!(outcome.passed.is_empty());
    }

    #[test]
    fn test_pass_latched_once() {
        let (mut rows, _backend) = rows_at(PLAYER_Z + PASS_THRESHOLD + 1.0, 2, 1);
        let first = resolve(rows.rows_mut(), 0.0, 2);
        assert_eq!(first.passed.len(), 1);
        let second = resolve(rows.rows_mut(), 0.0, 2);
        assert!(second.passed.is_empty());
    }

    #[test]
    fn test_single_track_never_hits() {
        let (mut rows, _backend) = rows_at(PLAYER_Z, 1, 5);
        let outcome = resolve(rows.rows_mut(), 0.0, 1);
        assert!(!outcome.hit);
        assert!(outcome.collected.is_some());
    }
}
