//! Per-frame driver and phase transitions
//!
//! One tick runs to completion before the next: scroll first, then resolve
//! against the freshly scrolled geometry, then let the state machine react.
//! Commands and lane intents arrive between ticks via `apply_command` /
//! `apply_intent`; an intent affects collision no earlier than the next tick.
//!
//! Delayed transitions (start lead-in, hit retry, win celebration) are
//! in-state countdowns tagged with the round generation. Restart and quit bump
//! the generation, so a countdown that was scheduled before the reset can
//! never fire into the new round.

use super::entity::EntityBackend;
use super::resolve::resolve;
use super::state::{
    Command, GameEvent, GamePhase, GameState, LaneIntent, Pending, PendingKind, Player,
};
use crate::consts::*;

/// Handle a UI command. Safe to call in any phase; commands that make no
/// sense for the current phase are ignored.
pub fn apply_command(state: &mut GameState, command: Command, backend: &mut dyn EntityBackend) {
    match command {
        Command::Start => {
            if state.phase() == GamePhase::Menu {
                begin_run(state);
            }
        }
        Command::Pause => {
            if !matches!(state.phase(), GamePhase::Menu | GamePhase::Win) {
                state.set_paused(true);
            }
        }
        Command::Resume => state.set_paused(false),
        Command::Restart => {
            state.set_paused(false);
            teardown(state, backend);
            begin_run(state);
        }
        Command::Quit => {
            state.set_paused(false);
            teardown(state, backend);
            state.reset_progress();
            state.set_phase(GamePhase::Menu);
        }
    }
}

/// Handle a lane-change intent. Applied immediately, but only takes effect on
/// collision geometry at the next tick. Ignored outside unpaused Play.
pub fn apply_intent(state: &mut GameState, intent: LaneIntent) {
    if state.paused() || state.phase() != GamePhase::Play {
        return;
    }
    let last = state.track_count() - 1;
    let current = state.player.current_lane;
    let target = match intent {
        LaneIntent::Shift(delta) => (current as i64 + delta as i64).clamp(0, last as i64) as usize,
        LaneIntent::Select(lane) => lane.min(last),
    };
    if target != current {
        state.player.current_lane = target;
        state.events.push(GameEvent::LaneChanged { lane: target });
    }
}

/// Advance the game by one frame.
///
/// Order within the tick is fixed: pending transition countdown, lane easing,
/// decorative motion, then (in Play only) world scroll, collision resolution
/// and the state machine's reaction, and finally a position sync so the
/// backend sees a consistent snapshot.
pub fn tick(state: &mut GameState, backend: &mut dyn EntityBackend, dt: f32) {
    if state.paused() || state.phase() == GamePhase::Menu {
        return;
    }
    let dt = dt.min(MAX_FRAME_DT);
    state.time_ticks += 1;

    if let Some(mut pending) = state.pending.take() {
        pending.remaining -= dt;
        if pending.remaining > 0.0 {
            state.pending = Some(pending);
        } else if pending.generation == state.generation {
            fire_transition(state, pending.kind, backend);
        } else {
            log::warn!("discarding stale {:?} transition", pending.kind);
        }
    }

    let track_count = state.track_count();
    state.player.ease_toward_lane(dt, track_count);

    let driving = matches!(state.phase(), GamePhase::Starting | GamePhase::Play);
    state.scroller.advance_decor(dt, &mut state.rng, driving);

    if state.phase() == GamePhase::Play {
        let speed = state.scroll_speed();
        state.scroller.advance_world(dt, speed);
        state.rows.advance(speed * dt);

        let lateral = state.player.lateral;
        let outcome = resolve(state.rows.rows_mut(), lateral, track_count);

        if outcome.hit {
            state.events.push(GameEvent::Hit);
            state.set_phase(GamePhase::Hit);
            state.pending = Some(Pending {
                kind: PendingKind::RetryRound,
                remaining: RETRY_DELAY,
                generation: state.generation,
            });
        } else {
            if let Some(row_id) = outcome.collected {
                if let Some(row) = state.rows.get(row_id) {
                    backend.set_active(row.wagon, false);
                }
                let stars = state.add_star();
                state.events.push(GameEvent::Collected { stars });
                if stars >= STARS_TO_WIN {
                    state.events.push(GameEvent::Win);
                    state.set_phase(GamePhase::Win);
                    state.pending = Some(Pending {
                        kind: PendingKind::NextLevel,
                        remaining: WIN_DELAY,
                        generation: state.generation,
                    });
                }
            }
            if state.phase() == GamePhase::Play {
                for row_id in outcome.passed {
                    state.rows.on_row_passed(row_id, &mut state.rng, backend);
                }
            }
        }
    }

    state.rows.sync_backend(backend);
}

/// Begin (or re-begin) a run: reset progress, rebuild the world, center the
/// train, and schedule the Starting -> Play hand-off.
fn begin_run(state: &mut GameState) {
    state.generation += 1;
    state.pending = None;
    state.reset_progress();
    state.scroller.rebuild(&mut state.rng);
    let start_lane = (state.track_count() - 1) / 2;
    state.player = Player::at_lane(start_lane, state.track_count());
    state.set_phase(GamePhase::Starting);
    state.pending = Some(Pending {
        kind: PendingKind::BeginPlay,
        remaining: START_DELAY,
        generation: state.generation,
    });
}

/// Synchronously tear down live row handles and invalidate any pending
/// transition. Runs on restart and quit, before anything new is created.
fn teardown(state: &mut GameState, backend: &mut dyn EntityBackend) {
    state.generation += 1;
    state.pending = None;
    state.rows.clear(backend);
}

fn fire_transition(state: &mut GameState, kind: PendingKind, backend: &mut dyn EntityBackend) {
    match kind {
        PendingKind::BeginPlay | PendingKind::RetryRound => {
            state.rows.start_round(&mut state.rng, backend);
            state.set_phase(GamePhase::Play);
        }
        PendingKind::NextLevel => {
            let level = state.advance_level();
            state.events.push(GameEvent::LevelUp { level });
            log::info!("level {level}, scroll speed {:.1}", state.scroll_speed());
            state.rows.start_round(&mut state.rng, backend);
            state.set_phase(GamePhase::Play);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane_offset;
    use crate::sim::entity::RecordingBackend;

    const DT: f32 = 1.0 / 60.0;

    fn start_playing(track_count: usize) -> (GameState, RecordingBackend) {
        let mut state = GameState::new(1234, track_count);
        let mut backend = RecordingBackend::new();
        apply_command(&mut state, Command::Start, &mut backend);
        assert_eq!(state.phase(), GamePhase::Starting);
        for _ in 0..60 {
            tick(&mut state, &mut backend, DT);
            if state.phase() == GamePhase::Play {
                break;
            }
        }
        assert_eq!(state.phase(), GamePhase::Play);
        (state, backend)
    }

    /// Pin the train to the given lane, bypassing the easing lag
    fn pin_lane(state: &mut GameState, lane: usize) {
        state.player.current_lane = lane;
        state.player.lateral = lane_offset(lane, state.track_count(), LANE_WIDTH);
    }

    /// Safe lane of the row nearest the train
    fn nearest_safe_lane(state: &GameState) -> usize {
        state
            .rows
            .rows()
            .iter()
            .min_by(|a, b| {
                (a.forward - PLAYER_Z)
                    .abs()
                    .total_cmp(&(b.forward - PLAYER_Z).abs())
            })
            .map(|r| r.safe_lane)
            .unwrap()
    }

    #[test]
    fn test_start_enters_play_with_two_rows() {
        let (state, backend) = start_playing(2);
        assert_eq!(state.rows.active_count(), 2);
        // 2 rows x (1 wagon + 1 obstacle) on two tracks
        assert_eq!(backend.live_count(), 4);
    }

    #[test]
    fn test_two_rows_invariant_across_many_passes() {
        let (mut state, mut backend) = start_playing(2);
        for _ in 0..4000 {
            // Stay on the safe lane so the run never ends in a hit
            let safe = nearest_safe_lane(&state);
            pin_lane(&mut state, safe);
            tick(&mut state, &mut backend, DT);
            assert_eq!(state.rows.active_count(), 2);
        }
    }

    #[test]
    fn test_collect_scenario() {
        let (mut state, mut backend) = start_playing(2);
        let safe = state.rows.rows()[0].safe_lane;
        pin_lane(&mut state, safe);

        let mut events = Vec::new();
        for _ in 0..600 {
            tick(&mut state, &mut backend, DT);
            events.extend(state.drain_events());
            if state.stars() == 1 {
                break;
            }
        }

        let collects = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Collected { .. }))
            .count();
        assert_eq!(collects, 1);
        assert_eq!(state.stars(), 1);
        assert!(!events.contains(&GameEvent::Hit));
    }

    #[test]
    fn test_hit_scenario_and_retry() {
        let (mut state, mut backend) = start_playing(2);
        let unsafe_lane = 1 - state.rows.rows()[0].safe_lane;

        let mut events = Vec::new();
        for _ in 0..600 {
            pin_lane(&mut state, unsafe_lane);
            tick(&mut state, &mut backend, DT);
            events.extend(state.drain_events());
            if state.phase() == GamePhase::Hit {
                break;
            }
        }
        assert_eq!(state.phase(), GamePhase::Hit);
        assert!(events.contains(&GameEvent::Hit));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::Collected { .. }))
        );

        // Hit freezes the world: rows stop moving
        let frozen_z = state.rows.rows()[0].forward;
        tick(&mut state, &mut backend, DT);
        assert!((state.rows.rows()[0].forward - frozen_z).abs() < f32::EPSILON);

        // Retry delay elapses back into Play with stars untouched
        for _ in 0..((RETRY_DELAY / DT) as usize + 5) {
            tick(&mut state, &mut backend, DT);
        }
        assert_eq!(state.phase(), GamePhase::Play);
        assert_eq!(state.stars(), 0);
        assert_eq!(state.rows.active_count(), 2);
    }

    #[test]
    fn test_win_scenario_levels_up_once() {
        let (mut state, mut backend) = start_playing(2);

        let mut events = Vec::new();
        for _ in 0..20_000 {
            let safe = nearest_safe_lane(&state);
            pin_lane(&mut state, safe);
            tick(&mut state, &mut backend, DT);
            events.extend(state.drain_events());
            if state.phase() == GamePhase::Win {
                break;
            }
        }
        assert_eq!(state.phase(), GamePhase::Win);
        assert!(events.contains(&GameEvent::Win));
        let collects = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Collected { .. }))
            .count();
        assert_eq!(collects as u32, STARS_TO_WIN);

        // Celebration ends: level 2, stars reset, fresh round
        for _ in 0..((WIN_DELAY / DT) as usize + 5) {
            tick(&mut state, &mut backend, DT);
            events.extend(state.drain_events());
        }
        assert_eq!(state.phase(), GamePhase::Play);
        assert_eq!(state.level(), 2);
        assert_eq!(state.stars(), 0);
        let level_ups = events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
            .count();
        assert_eq!(level_ups, 1);
        assert!((state.scroll_speed() - (BASE_SPEED + SPEED_INCREMENT)).abs() < 1e-6);
    }

    #[test]
    fn test_restart_during_retry_cancels_stale_transition() {
        let (mut state, mut backend) = start_playing(2);
        let unsafe_lane = 1 - state.rows.rows()[0].safe_lane;
        for _ in 0..600 {
            pin_lane(&mut state, unsafe_lane);
            tick(&mut state, &mut backend, DT);
            if state.phase() == GamePhase::Hit {
                break;
            }
        }
        assert_eq!(state.phase(), GamePhase::Hit);

        apply_command(&mut state, Command::Restart, &mut backend);
        assert_eq!(state.phase(), GamePhase::Starting);

        // Run well past both the old retry delay and the new start delay;
        // the stale retry must never fire into the fresh round.
        for _ in 0..((RETRY_DELAY / DT) as usize + 60) {
            tick(&mut state, &mut backend, DT);
        }
        assert_eq!(state.phase(), GamePhase::Play);
        assert_eq!(state.rows.active_count(), 2);
        assert_eq!(backend.live_count(), 4);
    }

    #[test]
    fn test_stale_generation_never_fires() {
        let (mut state, mut backend) = start_playing(2);
        // Forge a pending transition from a previous generation
        state.pending = Some(Pending {
            kind: PendingKind::RetryRound,
            remaining: DT / 2.0,
            generation: state.generation - 1,
        });
        let rows_before: Vec<_> = state.rows.rows().iter().map(|r| r.id).collect();
        tick(&mut state, &mut backend, DT);
        let rows_after: Vec<_> = state.rows.rows().iter().map(|r| r.id).collect();
        // No start_round happened: same row identities
        assert_eq!(rows_before, rows_after);
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_quit_tears_down_handles() {
        let (mut state, mut backend) = start_playing(3);
        apply_command(&mut state, Command::Quit, &mut backend);
        assert_eq!(state.phase(), GamePhase::Menu);
        assert_eq!(state.rows.active_count(), 0);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.stars(), 0);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let (mut state, mut backend) = start_playing(2);
        apply_command(&mut state, Command::Pause, &mut backend);
        assert!(state.paused());

        let z = state.rows.rows()[0].forward;
        let ticks = state.time_ticks;
        tick(&mut state, &mut backend, DT);
        assert_eq!(state.time_ticks, ticks);
        assert!((state.rows.rows()[0].forward - z).abs() < f32::EPSILON);

        // Intents are ignored while paused
        let lane = state.player.current_lane;
        apply_intent(&mut state, LaneIntent::Shift(1));
        assert_eq!(state.player.current_lane, lane);

        apply_command(&mut state, Command::Resume, &mut backend);
        assert!(!state.paused());
        assert_eq!(state.phase(), GamePhase::Play);
    }

    #[test]
    fn test_lane_intents_saturate_at_edges() {
        let (mut state, _backend) = start_playing(3);
        apply_intent(&mut state, LaneIntent::Shift(-5));
        assert_eq!(state.player.current_lane, 0);
        apply_intent(&mut state, LaneIntent::Shift(1));
        assert_eq!(state.player.current_lane, 1);
        apply_intent(&mut state, LaneIntent::Select(99));
        assert_eq!(state.player.current_lane, 2);
    }

    #[test]
    fn test_intents_ignored_outside_play() {
        let mut state = GameState::new(5, 2);
        apply_intent(&mut state, LaneIntent::Shift(1));
        assert_eq!(state.player.current_lane, 0);

        let mut backend = RecordingBackend::new();
        apply_command(&mut state, Command::Start, &mut backend);
        // Still Starting: intent must be ignored
        apply_intent(&mut state, LaneIntent::Shift(1));
        assert_eq!(state.player.current_lane, 0);
    }

    #[test]
    fn test_pause_ignored_in_menu_and_win() {
        let mut state = GameState::new(5, 2);
        let mut backend = RecordingBackend::new();
        apply_command(&mut state, Command::Pause, &mut backend);
        assert!(!state.paused());

        state.set_phase(GamePhase::Win);
        apply_command(&mut state, Command::Pause, &mut backend);
        assert!(!state.paused());
    }
}
