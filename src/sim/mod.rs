//! Deterministic gameplay simulation
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Seeded RNG only (safe lanes, variants, scenery all flow through one Pcg32)
//! - One tick runs to completion before the next; fixed order within a tick
//! - No rendering or platform dependencies (entities are reached through the
//!   `EntityBackend` boundary)

pub mod entity;
pub mod pool;
pub mod resolve;
pub mod rows;
pub mod scroll;
pub mod state;
pub mod tick;

pub use entity::{EntityBackend, EntityId, RecordingBackend};
pub use resolve::{Outcome, resolve};
pub use rows::{Row, RowId, RowManager};
pub use scroll::{Car, SceneryItem, SceneryKind, Scroller, SteamPuff};
pub use state::{
    Command, GameEvent, GamePhase, GameState, LaneIntent, Player, scroll_speed_for_level,
};
pub use tick::{apply_command, apply_intent, tick};
