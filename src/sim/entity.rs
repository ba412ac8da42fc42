//! Boundary to the presentation-side entity factory
//!
//! The simulation never touches meshes or materials. It asks the backend for
//! opaque handles, pushes forward positions through them once per tick, and
//! releases them when a row is recycled. Everything visual lives on the other
//! side of this trait.

use std::collections::HashMap;

/// Opaque handle to a renderable entity owned by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Factory and position sink for the entities the simulation places on the
/// tracks. Lateral placement is passed as a world x offset so the backend
/// needs no knowledge of lane math.
pub trait EntityBackend {
    /// Create a wagon (the collectible) at the given lateral offset and depth.
    /// `color` indexes a small fixed paint palette and is purely cosmetic.
    fn create_wagon(&mut self, lane_x: f32, z: f32, color: u8) -> EntityId;

    /// Create an obstacle. `variant` picks one of a few cosmetic looks
    /// (fallen tree, rock pile, barrier) with no gameplay meaning.
    fn create_obstacle(&mut self, lane_x: f32, z: f32, variant: u8) -> EntityId;

    /// Release a handle. The id must not be used afterwards.
    fn release(&mut self, id: EntityId);

    /// Update an entity's forward (depth) position.
    fn set_forward(&mut self, id: EntityId, z: f32);

    /// Toggle visibility without releasing (collected wagons hide until their
    /// row is recycled).
    fn set_active(&mut self, id: EntityId, active: bool);
}

/// What a recorded entity currently looks like
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedEntity {
    pub lane_x: f32,
    pub z: f32,
    pub active: bool,
    pub is_wagon: bool,
}

/// In-memory backend used by the headless demo and by tests.
///
/// Tracks every live handle so invariants ("no leaked handles after a round
/// reset") can be asserted directly.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u32,
    pub live: HashMap<EntityId, RecordedEntity>,
    pub created: u32,
    pub released: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, lane_x: f32, z: f32, is_wagon: bool) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.created += 1;
        self.live.insert(
            id,
            RecordedEntity {
                lane_x,
                z,
                active: true,
                is_wagon,
            },
        );
        id
    }

    /// Number of currently live handles
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl EntityBackend for RecordingBackend {
    fn create_wagon(&mut self, lane_x: f32, z: f32, _color: u8) -> EntityId {
        self.insert(lane_x, z, true)
    }

    fn create_obstacle(&mut self, lane_x: f32, z: f32, _variant: u8) -> EntityId {
        self.insert(lane_x, z, false)
    }

    fn release(&mut self, id: EntityId) {
        if self.live.remove(&id).is_none() {
            log::warn!("release of unknown entity {id:?}");
        } else {
            self.released += 1;
        }
    }

    fn set_forward(&mut self, id: EntityId, z: f32) {
        if let Some(e) = self.live.get_mut(&id) {
            e.z = z;
        }
    }

    fn set_active(&mut self, id: EntityId, active: bool) {
        if let Some(e) = self.live.get_mut(&id) {
            e.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_release_balances() {
        let mut backend = RecordingBackend::new();
        let wagon = backend.create_wagon(0.0, -40.0, 0);
        let obstacle = backend.create_obstacle(1.2, -40.0, 1);
        assert_eq!(backend.live_count(), 2);

        backend.release(wagon);
        backend.release(obstacle);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.created, backend.released);
    }

    #[test]
    fn test_double_release_is_harmless() {
        let mut backend = RecordingBackend::new();
        let id = backend.create_wagon(0.0, 0.0, 0);
        backend.release(id);
        backend.release(id);
        assert_eq!(backend.released, 1);
    }
}
