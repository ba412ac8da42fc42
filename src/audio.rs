//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed. On native
//! builds the manager is a silent stub; the headless demo only logs.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Train horn on game start
    Horn,
    /// Lane change blip
    Tap,
    /// Wagon caught
    Collect,
    /// Obstacle hit
    Wrong,
    /// Level complete fanfare
    Celebration,
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::SoundEffect;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Set master volume (0.0 - 1.0)
        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        /// Set SFX volume (0.0 - 1.0)
        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        /// Mute/unmute all audio (the pause menu mutes)
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Horn => self.play_horn(ctx, vol),
                SoundEffect::Tap => self.play_tap(ctx, vol),
                SoundEffect::Collect => self.play_arpeggio(ctx, vol * 0.15, &[523.0, 659.0, 784.0], 0.08),
                SoundEffect::Wrong => self.play_wrong(ctx, vol),
                SoundEffect::Celebration => self.play_arpeggio(
                    ctx,
                    vol * 0.12,
                    &[523.0, 587.0, 659.0, 784.0, 880.0, 1046.5],
                    0.1,
                ),
            }
        }

        /// Create an oscillator wired through a gain node
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Two-note horn: G4 stepping up to C5
        fn play_horn(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 392.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            osc.frequency().set_value_at_time(392.0, t).ok();
            osc.frequency().set_value_at_time(523.0, t + 0.15).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        /// Short blip on lane change
        fn play_tap(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 800.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.08, t).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.04).ok();
        }

        /// Sad downward slide
        fn play_wrong(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            osc.frequency().set_value_at_time(200.0, t).ok();
            osc.frequency().set_value_at_time(150.0, t + 0.15).ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        /// Rising note ladder used for both collect and celebration
        fn play_arpeggio(&self, ctx: &AudioContext, gain_level: f32, freqs: &[f32], step: f64) {
            let t = ctx.current_time();
            for (i, freq) in freqs.iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) else {
                    continue;
                };
                let at = t + i as f64 * step;
                gain.gain().set_value_at_time(gain_level, at).ok();
                osc.start_with_when(at).ok();
                osc.stop_with_when(at + 0.12).ok();
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

/// Native stub: same surface, no sound
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct AudioManager {
    muted: bool,
}

#[cfg(not(target_arch = "wasm32"))]
impl AudioManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume(&self) {}

    pub fn set_master_volume(&mut self, _vol: f32) {}

    pub fn set_sfx_volume(&mut self, _vol: f32) {}

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn play(&self, effect: SoundEffect) {
        if !self.muted {
            log::debug!("sfx {effect:?}");
        }
    }
}
