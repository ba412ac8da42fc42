//! Row spawning and recycling
//!
//! A row is one unit of forward progress: a wagon on a randomly chosen safe
//! lane and one obstacle on every other lane, all sharing a depth coordinate.
//! Exactly two rows are live during play; rows that scroll past the train are
//! recycled by identity (fresh handles, fresh safe lane), never wrapped.

use rand::Rng;

use super::entity::{EntityBackend, EntityId};
use crate::consts::*;
use crate::lane_offset;

/// Stable identity of a live row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u64);

/// One obstacle slot within a row
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub lane: usize,
    pub id: EntityId,
}

/// A wagon plus the obstacles guarding the other lanes
#[derive(Debug)]
pub struct Row {
    pub id: RowId,
    /// Depth coordinate; spawns far away (negative) and grows toward the train
    pub forward: f32,
    pub safe_lane: usize,
    pub wagon: EntityId,
    pub obstacles: Vec<Obstacle>,
    /// Set the first time the train overlaps the wagon; collection fires once
    pub collected: bool,
    /// Set once the row has scrolled beyond the train; gates recycling
    pub passed: bool,
}

/// Owns the active rows and keeps the two-row look-ahead topped up
#[derive(Debug)]
pub struct RowManager {
    track_count: usize,
    rows: Vec<Row>,
    next_row: u64,
    wagon_color: u8,
}

impl RowManager {
    pub fn new(track_count: usize) -> Self {
        Self {
            track_count: track_count.max(1),
            rows: Vec::with_capacity(2),
            next_row: 0,
            wagon_color: 0,
        }
    }

    /// Only legal while no rows are live (menu-time track selection)
    pub fn set_track_count(&mut self, track_count: usize) {
        debug_assert!(self.rows.is_empty());
        self.track_count = track_count.max(1);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn active_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Spawn a row at the given depth.
    ///
    /// The safe lane is uniform over the track count; every other lane gets an
    /// obstacle with a cosmetic variant. Wagon colors cycle through a fixed
    /// palette so consecutive wagons look different.
    pub fn spawn_row(
        &mut self,
        forward: f32,
        rng: &mut impl Rng,
        backend: &mut dyn EntityBackend,
    ) -> RowId {
        let id = RowId(self.next_row);
        self.next_row += 1;

        let safe_lane = rng.random_range(0..self.track_count);
        self.wagon_color = (self.wagon_color + 1) % WAGON_COLORS;
        let wagon = backend.create_wagon(
            lane_offset(safe_lane, self.track_count, LANE_WIDTH),
            forward,
            self.wagon_color,
        );

        let mut obstacles = Vec::with_capacity(self.track_count.saturating_sub(1));
        for lane in 0..self.track_count {
            if lane == safe_lane {
                continue;
            }
            let variant = rng.random_range(0..OBSTACLE_VARIANTS);
            let handle = backend.create_obstacle(
                lane_offset(lane, self.track_count, LANE_WIDTH),
                forward,
                variant,
            );
            obstacles.push(Obstacle { lane, id: handle });
        }

        log::debug!("spawned row {id:?} at z={forward:.1}, safe lane {safe_lane}");
        self.rows.push(Row {
            id,
            forward,
            safe_lane,
            wagon,
            obstacles,
            collected: false,
            passed: false,
        });
        id
    }

    /// Release every handle a row owns. Must run before the row is dropped.
    fn recycle_row(row: Row, backend: &mut dyn EntityBackend) {
        backend.release(row.wagon);
        for obstacle in &row.obstacles {
            backend.release(obstacle.id);
        }
    }

    /// Tear down all live rows, releasing their handles
    pub fn clear(&mut self, backend: &mut dyn EntityBackend) {
        for row in self.rows.drain(..) {
            Self::recycle_row(row, backend);
        }
    }

    /// Reset the round layout: two fresh rows at the standard lead distances
    pub fn start_round(&mut self, rng: &mut impl Rng, backend: &mut dyn EntityBackend) {
        self.clear(backend);
        self.spawn_row(-SPAWN_LEAD, rng, backend);
        self.spawn_row(-SPAWN_LEAD - ROW_SPACING, rng, backend);
    }

    /// A row crossed beyond the train: recycle it and top the look-ahead back
    /// up to two. Unknown ids (already recycled) are a no-op.
    pub fn on_row_passed(
        &mut self,
        id: RowId,
        rng: &mut impl Rng,
        backend: &mut dyn EntityBackend,
    ) {
        let Some(index) = self.rows.iter().position(|r| r.id == id) else {
            log::warn!("pass event for unknown row {id:?}");
            return;
        };
        let row = self.rows.remove(index);
        log::debug!("recycling row {:?} at z={:.1}", row.id, row.forward);
        Self::recycle_row(row, backend);

        let furthest = self
            .rows
            .iter()
            .map(|r| r.forward)
            .fold(f32::INFINITY, f32::min);
        let spawn_z = if furthest.is_finite() {
            furthest - ROW_SPACING
        } else {
            -SPAWN_LEAD
        };
        self.spawn_row(spawn_z, rng, backend);
    }

    /// Scroll all rows forward by the given displacement
    pub fn advance(&mut self, dz: f32) {
        for row in &mut self.rows {
            row.forward += dz;
        }
    }

    /// Push current depths to the backend for every live handle
    pub fn sync_backend(&self, backend: &mut dyn EntityBackend) {
        for row in &self.rows {
            backend.set_forward(row.wagon, row.forward);
            for obstacle in &row.obstacles {
                backend.set_forward(obstacle.id, row.forward);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::RecordingBackend;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fixture(track_count: usize) -> (RowManager, Pcg32, RecordingBackend) {
        (
            RowManager::new(track_count),
            Pcg32::seed_from_u64(42),
            RecordingBackend::new(),
        )
    }

    #[test]
    fn test_start_round_creates_two_rows_at_lead_distances() {
        let (mut rows, mut rng, mut backend) = fixture(2);
        rows.start_round(&mut rng, &mut backend);
        assert_eq!(rows.active_count(), 2);
        assert!((rows.rows()[0].forward - (-SPAWN_LEAD)).abs() < f32::EPSILON);
        assert!((rows.rows()[1].forward - (-SPAWN_LEAD - ROW_SPACING)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_start_round_releases_previous_handles() {
        let (mut rows, mut rng, mut backend) = fixture(3);
        rows.start_round(&mut rng, &mut backend);
        rows.start_round(&mut rng, &mut backend);
        // Two rows of 1 wagon + 2 obstacles each
        assert_eq!(backend.live_count(), 6);
        assert_eq!(backend.created - backend.released, 6);
    }

    #[test]
    fn test_on_row_passed_restores_two_rows_behind_furthest() {
        let (mut rows, mut rng, mut backend) = fixture(2);
        rows.start_round(&mut rng, &mut backend);
        let first = rows.rows()[0].id;
        let remaining_z = rows.rows()[1].forward;

        rows.on_row_passed(first, &mut rng, &mut backend);
        assert_eq!(rows.active_count(), 2);
        let spawned = &rows.rows()[1];
        assert!((spawned.forward - (remaining_z - ROW_SPACING)).abs() < f32::EPSILON);
        assert_eq!(backend.live_count(), 4);
    }

    #[test]
    fn test_on_row_passed_unknown_id_is_noop() {
        let (mut rows, mut rng, mut backend) = fixture(2);
        rows.start_round(&mut rng, &mut backend);
        let first = rows.rows()[0].id;
        rows.on_row_passed(first, &mut rng, &mut backend);

        let before = backend.released;
        rows.on_row_passed(first, &mut rng, &mut backend);
        assert_eq!(rows.active_count(), 2);
        assert_eq!(backend.released, before);
    }

    #[test]
    fn test_single_track_row_has_no_obstacles() {
        let (mut rows, mut rng, mut backend) = fixture(1);
        rows.start_round(&mut rng, &mut backend);
        for row in rows.rows() {
            assert_eq!(row.safe_lane, 0);
            assert!(row.obstacles.is_empty());
        }
        assert_eq!(backend.live_count(), 2);
    }

    #[test]
    fn test_clear_releases_everything() {
        let (mut rows, mut rng, mut backend) = fixture(3);
        rows.start_round(&mut rng, &mut backend);
        rows.clear(&mut backend);
        assert_eq!(rows.active_count(), 0);
        assert_eq!(backend.live_count(), 0);
    }

    proptest! {
        /// One wagon lane, track_count - 1 obstacle lanes, never overlapping
        #[test]
        fn prop_row_shape(track_count in 1usize..6, seed in any::<u64>()) {
            let mut rows = RowManager::new(track_count);
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut backend = RecordingBackend::new();

            rows.spawn_row(-SPAWN_LEAD, &mut rng, &mut backend);
            let row = &rows.rows()[0];

            prop_assert!(row.safe_lane < track_count);
            prop_assert_eq!(row.obstacles.len(), track_count - 1);
            prop_assert!(row.obstacles.iter().all(|o| o.lane != row.safe_lane));
            prop_assert!(row.obstacles.iter().all(|o| o.lane < track_count));
        }
    }
}
