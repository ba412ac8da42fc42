//! Scrolling world layers
//!
//! Everything except the rows is cyclic: track segments, the bridge, road
//! markings and the half-rate scenery wrap back by a fixed span once they
//! slide past the camera. Rows are excluded on purpose - each one carries
//! per-instance identity and a fresh safe-lane roll, so they are recycled by
//! the row manager instead of wrapped.
//!
//! Two parallax rates only: track-synchronous (full speed) and world scenery
//! (half speed). Cars, windmill blades and steam are decorative and keep
//! moving even while gameplay is frozen in the Hit phase.

use glam::Vec3;
use rand::Rng;

use super::pool::Pool;
use crate::consts::*;

/// Cosmetic scenery classes placed alongside the tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryKind {
    Tree,
    House,
    Windmill,
    Pond,
    Signal,
    Sheep,
    Cow,
    Umbrella,
}

/// One scenery object in the half-rate layer
#[derive(Debug, Clone, Copy)]
pub struct SceneryItem {
    pub kind: SceneryKind,
    pub x: f32,
    pub z: f32,
    pub scale: f32,
}

/// A car on the background road, moving at its own speed
#[derive(Debug, Clone, Copy)]
pub struct Car {
    pub z: f32,
    pub speed: f32,
    pub color: u8,
}

/// One steam puff rising from the chimney
#[derive(Debug, Clone, Copy)]
pub struct SteamPuff {
    pub pos: Vec3,
    pub life: f32,
    pub scale: f32,
    pub opacity: f32,
}

impl Default for SteamPuff {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, 1.8, -0.95),
            life: 0.0,
            scale: 0.8,
            opacity: 0.0,
        }
    }
}

const STEAM_CAPACITY: usize = 8;
const STEAM_INTERVAL: f32 = 0.25;
const CAR_COUNT: usize = 4;
const CAR_COLORS: u8 = 8;
const DASH_COUNT: usize = 30;

/// Advances and wraps every scrolling entity except the rows
#[derive(Debug)]
pub struct Scroller {
    /// Track segment depths; together they tile the visible ground loop
    pub segments: Vec<f32>,
    pub bridge_z: f32,
    /// Road center-line dash depths
    pub dashes: Vec<f32>,
    pub scenery: Vec<SceneryItem>,
    pub cars: Vec<Car>,
    /// Shared blade angle for all windmills
    pub windmill_angle: f32,
    /// Train wheel spin, driven by scroll speed
    pub wheel_angle: f32,
    pub steam: Pool<SteamPuff>,
    steam_timer: f32,
}

impl Scroller {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut scroller = Self {
            segments: Vec::new(),
            bridge_z: BRIDGE_START_Z,
            dashes: Vec::new(),
            scenery: Vec::new(),
            cars: Vec::new(),
            windmill_angle: 0.0,
            wheel_angle: 0.0,
            steam: Pool::new(vec![SteamPuff::default(); STEAM_CAPACITY]),
            steam_timer: 0.0,
        };
        scroller.rebuild(rng);
        scroller
    }

    /// Lay the whole world out fresh (start / restart)
    pub fn rebuild(&mut self, rng: &mut impl Rng) {
        self.segments = (0..SEG_COUNT).map(|s| -(s as f32) * SEG_LEN).collect();
        self.bridge_z = BRIDGE_START_Z;
        self.dashes = (0..DASH_COUNT).map(|i| 20.0 - i as f32 * 6.0).collect();
        self.windmill_angle = 0.0;
        self.wheel_angle = 0.0;
        self.steam = Pool::new(vec![SteamPuff::default(); STEAM_CAPACITY]);
        self.steam_timer = 0.0;

        self.scenery.clear();
        for i in 0..10 {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Tree,
                x: 7.0 + rng.random_range(0.0..3.0),
                z: -(i as f32) * 12.0 - 8.0,
                scale: 0.9 + rng.random_range(0.0..0.4),
            });
        }
        for (x, z) in [(13.0, -25.0), (15.0, -55.0), (12.0, -100.0)] {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::House,
                x,
                z,
                scale: 1.0,
            });
        }
        for (x, z) in [(16.0, -40.0), (18.0, -95.0)] {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Windmill,
                x,
                z,
                scale: 1.0,
            });
        }
        for (x, z, scale) in [(14.0, -65.0, 1.0), (12.0, -120.0, 0.8)] {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Pond,
                x,
                z,
                scale,
            });
        }
        for (x, z) in [(-4.0, -18.0), (4.0, -50.0)] {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Signal,
                x,
                z,
                scale: 1.0,
            });
        }
        for i in 0..5 {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Sheep,
                x: 9.0 + rng.random_range(0.0..3.0),
                z: -15.0 - i as f32 * 22.0,
                scale: 1.0,
            });
        }
        for (x, z) in [(11.0, -45.0), (13.0, -85.0)] {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Cow,
                x,
                z,
                scale: 1.0,
            });
        }
        for i in 0..4 {
            self.scenery.push(SceneryItem {
                kind: SceneryKind::Umbrella,
                x: -18.0 - rng.random_range(0.0..2.0),
                z: -20.0 - i as f32 * 30.0,
                scale: 1.0,
            });
        }

        self.cars.clear();
        for i in 0..CAR_COUNT {
            self.cars.push(Car {
                z: -20.0 - i as f32 * 35.0,
                speed: 5.0 + rng.random_range(0.0..4.0),
                color: rng.random_range(0..CAR_COLORS),
            });
        }
    }

    /// Advance the track-synchronous and scenery layers. Runs only during
    /// Play; the Hit freeze stops everything gameplay-relative.
    pub fn advance_world(&mut self, dt: f32, scroll_speed: f32) {
        let dz = scroll_speed * dt;

        for seg in &mut self.segments {
            *seg += dz;
            if *seg > SEG_LEN {
                *seg -= SEG_LEN * SEG_COUNT as f32;
            }
        }

        self.bridge_z += dz;
        if self.bridge_z > BRIDGE_WRAP_Z {
            self.bridge_z -= BRIDGE_SPAN;
        }

        for dash in &mut self.dashes {
            *dash += dz;
            if *dash > DASH_WRAP_Z {
                *dash -= DASH_SPAN;
            }
        }

        for item in &mut self.scenery {
            item.z += dz * SCENERY_RATE;
            if item.z > SCENERY_WRAP_Z {
                item.z -= SCENERY_SPAN;
            }
        }

        self.wheel_angle += dz * 2.0;
    }

    /// Advance motion that never freezes: road traffic, windmill blades and
    /// the steam pool. `emit_steam` is true while the train is "driving"
    /// (Starting and Play).
    pub fn advance_decor(&mut self, dt: f32, rng: &mut impl Rng, emit_steam: bool) {
        for car in &mut self.cars {
            car.z += car.speed * dt;
            if car.z > 30.0 {
                car.z = -120.0 - rng.random_range(0.0..30.0);
                car.speed = 5.0 + rng.random_range(0.0..4.0);
                car.color = rng.random_range(0..CAR_COLORS);
            }
        }

        self.windmill_angle += dt * 1.5;

        if emit_steam {
            self.steam_timer += dt;
            if self.steam_timer > STEAM_INTERVAL {
                self.steam_timer = 0.0;
                let jitter = rng.random_range(-0.075..0.075);
                if let Some((_, puff)) = self.steam.acquire() {
                    *puff = SteamPuff {
                        pos: Vec3::new(jitter, 1.8, -0.95),
                        life: 0.0,
                        scale: 0.8,
                        opacity: 0.8,
                    };
                }
            }
        }

        let mut expired = Vec::new();
        for (index, puff) in self.steam.iter_active_mut() {
            puff.life += dt;
            puff.pos.y += dt * 1.5;
            puff.pos.z -= dt * 0.3;
            puff.scale += dt * 0.8;
            puff.opacity = (0.8 - puff.life).max(0.0);
            if puff.life > 1.0 {
                expired.push(index);
            }
        }
        for index in expired {
            self.steam.release(index);
        }
    }
}
