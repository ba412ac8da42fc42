//! Game state and core run-state types
//!
//! All authoritative gameplay state lives here: the phase machine scalars,
//! the player's lane, and the owned row/scroller collections. Only the tick
//! driver and its delegates mutate this; the render layer just reads.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rows::RowManager;
use super::scroll::Scroller;
use crate::consts::*;
use crate::lane_offset;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen; nothing ticks
    Menu,
    /// Start pressed, world rebuilt, waiting for the first round
    Starting,
    /// Active gameplay
    Play,
    /// Obstacle hit; world frozen until the retry delay elapses
    Hit,
    /// Level complete celebration
    Win,
}

/// UI commands pushed into the state machine outside the frame tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Restart,
    Quit,
}

/// A lane-change request from input capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneIntent {
    /// Relative step (swipe/arrow key); saturates at the outer lanes
    Shift(i32),
    /// Absolute lane (tap zone / lane button); clamped into range
    Select(usize),
}

/// Events produced for the presentation layer (audio, HUD), drained each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    LaneChanged { lane: usize },
    Hit,
    Collected { stars: u32 },
    LevelUp { level: u32 },
    Win,
}

/// The player's train.
///
/// `current_lane` is authoritative for intent; collision tests use the eased
/// `lateral` so a train mid-switch is judged where it visually is.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub current_lane: usize,
    pub lateral: f32,
}

impl Player {
    /// Snap to a lane (round start, restart)
    pub fn at_lane(lane: usize, track_count: usize) -> Self {
        Self {
            current_lane: lane,
            lateral: lane_offset(lane, track_count, LANE_WIDTH),
        }
    }

    /// Ease the lateral position toward the current lane center
    pub fn ease_toward_lane(&mut self, dt: f32, track_count: usize) {
        let target = lane_offset(self.current_lane, track_count, LANE_WIDTH);
        self.lateral += (target - self.lateral) * (LANE_EASE * dt).min(1.0);
    }
}

/// What a pending delayed transition will do when its countdown ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingKind {
    /// Starting -> Play (first round of a run)
    BeginPlay,
    /// Hit -> Play (fresh round, stars and level kept)
    RetryRound,
    /// Win -> Play (next level: stars reset, speed bumped)
    NextLevel,
}

/// A scheduled phase transition.
///
/// Tagged with the round generation at scheduling time; a transition whose
/// generation no longer matches the state is stale and must not fire.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pending {
    pub kind: PendingKind,
    pub remaining: f32,
    pub generation: u64,
}

/// Scroll speed for a given level: a single linear rule
#[inline]
pub fn scroll_speed_for_level(level: u32) -> f32 {
    BASE_SPEED + (level.saturating_sub(1)) as f32 * SPEED_INCREMENT
}

/// Complete game state for one run
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    track_count: usize,
    pub player: Player,
    stars: u32,
    level: u32,
    scroll_speed: f32,
    phase: GamePhase,
    paused: bool,
    prev_phase: GamePhase,
    /// Bumped on start/restart/quit; stale delayed transitions check this
    pub(crate) generation: u64,
    pub(crate) pending: Option<Pending>,
    pub rows: RowManager,
    pub scroller: Scroller,
    pub(crate) events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Create a fresh state sitting in the menu
    pub fn new(seed: u64, track_count: usize) -> Self {
        let track_count = track_count.max(1);
        let mut rng = Pcg32::seed_from_u64(seed);
        let scroller = Scroller::new(&mut rng);
        let start_lane = (track_count - 1) / 2;
        Self {
            seed,
            rng,
            track_count,
            player: Player::at_lane(start_lane, track_count),
            stars: 0,
            level: 1,
            scroll_speed: scroll_speed_for_level(1),
            phase: GamePhase::Menu,
            paused: false,
            prev_phase: GamePhase::Play,
            generation: 0,
            pending: None,
            rows: RowManager::new(track_count),
            scroller,
            events: Vec::new(),
            time_ticks: 0,
        }
    }

    pub fn stars(&self) -> u32 {
        self.stars
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn track_count(&self) -> usize {
        self.track_count
    }

    /// Change the track count from the menu. Ignored mid-run: the lane layout
    /// is immutable once a run has started.
    pub fn set_track_count(&mut self, track_count: usize) {
        if self.phase != GamePhase::Menu {
            log::warn!("track count change ignored outside the menu");
            return;
        }
        self.track_count = track_count.max(1);
        self.rows.set_track_count(self.track_count);
        let start_lane = (self.track_count - 1) / 2;
        self.player = Player::at_lane(start_lane, self.track_count);
    }

    /// Hand the queued presentation events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        if paused && !self.paused {
            self.prev_phase = self.phase;
            self.paused = true;
        } else if !paused && self.paused {
            self.paused = false;
            self.phase = self.prev_phase;
        }
    }

    pub(crate) fn add_star(&mut self) -> u32 {
        self.stars += 1;
        self.stars
    }

    pub(crate) fn reset_progress(&mut self) {
        self.stars = 0;
        self.level = 1;
        self.scroll_speed = scroll_speed_for_level(1);
    }

    /// Level completed: clear stars, bump level, recompute speed immediately
    pub(crate) fn advance_level(&mut self) -> u32 {
        self.stars = 0;
        self.level += 1;
        self.scroll_speed = scroll_speed_for_level(self.level);
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_rule() {
        assert!((scroll_speed_for_level(1) - BASE_SPEED).abs() < f32::EPSILON);
        assert!((scroll_speed_for_level(3) - (BASE_SPEED + 2.0 * SPEED_INCREMENT)).abs() < 1e-6);
    }

    #[test]
    fn test_player_ease_converges_on_lane_center() {
        let mut player = Player::at_lane(0, 2);
        player.current_lane = 1;
        for _ in 0..120 {
            player.ease_toward_lane(1.0 / 60.0, 2);
        }
        let target = lane_offset(1, 2, LANE_WIDTH);
        assert!((player.lateral - target).abs() < 0.01);
    }

    #[test]
    fn test_track_count_locked_outside_menu() {
        let mut state = GameState::new(7, 2);
        state.set_phase(GamePhase::Play);
        state.set_track_count(3);
        assert_eq!(state.track_count(), 2);
    }

    #[test]
    fn test_pause_remembers_phase() {
        let mut state = GameState::new(7, 2);
        state.set_phase(GamePhase::Hit);
        state.set_paused(true);
        assert!(state.paused());
        state.set_paused(false);
        assert_eq!(state.phase(), GamePhase::Hit);
    }
}
