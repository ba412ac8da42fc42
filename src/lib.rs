//! Wagon Dash - a lane-runner where a little train catches runaway wagons
//!
//! Core modules:
//! - `sim`: Deterministic gameplay simulation (rows, scrolling, collisions, phases)
//! - `audio`: Procedurally generated Web Audio sound effects
//! - `settings`: Language preference and audio settings

pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{Language, Settings};

/// Game configuration constants
pub mod consts {
    /// Maximum frame delta fed to the simulation (seconds). Large stalls are
    /// clamped so the world never jumps past a whole row.
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Lateral distance between adjacent track centers
    pub const LANE_WIDTH: f32 = 2.4;
    /// Default number of tracks (menu also offers 3)
    pub const DEFAULT_TRACKS: usize = 2;
    /// Easing rate of the train toward its target lane (per second)
    pub const LANE_EASE: f32 = 12.0;

    /// Forward position of the train; the world scrolls past it
    pub const PLAYER_Z: f32 = 2.0;

    /// Scroll speed at level 1 (world units per second)
    pub const BASE_SPEED: f32 = 8.0;
    /// Speed gained per completed level
    pub const SPEED_INCREMENT: f32 = 0.8;
    /// Wagons needed to finish a level
    pub const STARS_TO_WIN: u32 = 5;

    /// Track segment length and count; together they form the ground loop
    pub const SEG_LEN: f32 = 12.0;
    pub const SEG_COUNT: usize = 10;

    /// Forward gap between consecutive rows
    pub const ROW_SPACING: f32 = 25.0;
    /// How far ahead the first row of a round spawns
    pub const SPAWN_LEAD: f32 = 40.0;
    /// A row counts as passed once it is this far beyond the train
    pub const PASS_THRESHOLD: f32 = 8.0;

    /// Collision windows. Literal tuning values from playtesting - generous on
    /// purpose, not derived from lane geometry.
    pub const OBSTACLE_HIT_RANGE: f32 = 1.2;
    pub const OBSTACLE_HIT_WIDTH: f32 = 1.0;
    pub const COLLECT_RANGE: f32 = 1.0;
    pub const COLLECT_WIDTH: f32 = 0.8;

    /// Delay between pressing start and the first round (seconds)
    pub const START_DELAY: f32 = 0.5;
    /// How long the "try again" pause lasts after hitting an obstacle
    pub const RETRY_DELAY: f32 = 1.8;
    /// Level-complete celebration length
    pub const WIN_DELAY: f32 = 4.0;

    /// Number of distinct obstacle looks (fallen tree, rocks, barrier)
    pub const OBSTACLE_VARIANTS: u8 = 3;
    /// Number of wagon paint colors cycled through
    pub const WAGON_COLORS: u8 = 5;

    /// Scenery scrolls at half the track rate for a cheap parallax effect
    pub const SCENERY_RATE: f32 = 0.5;
    /// Wrap thresholds and spans for the cyclic world layers
    pub const SCENERY_WRAP_Z: f32 = 15.0;
    pub const SCENERY_SPAN: f32 = 130.0;
    pub const BRIDGE_WRAP_Z: f32 = 25.0;
    pub const BRIDGE_SPAN: f32 = 140.0;
    pub const BRIDGE_START_Z: f32 = -70.0;
    pub const DASH_WRAP_Z: f32 = 25.0;
    pub const DASH_SPAN: f32 = 180.0;
}

/// Lateral world offset of a lane center.
///
/// Lanes are numbered left to right and centered around x = 0, so a 2-track
/// layout sits at -1.2 / +1.2 and a 3-track layout at -2.4 / 0 / +2.4.
/// Pure - safe to call from the menu before a run starts.
#[inline]
pub fn lane_offset(index: usize, track_count: usize, lane_width: f32) -> f32 {
    (index as f32 - (track_count as f32 - 1.0) / 2.0) * lane_width
}
