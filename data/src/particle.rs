use std::time::{Duration, Instant};

use iced_core::Point;
use rand::Rng;

use crate::layout::Layout;

/// One-shot delay between a render pass finishing its transitions and the
/// first emission interval being armed (two bar stages).
pub const ARM_DELAY: Duration = Duration::from_millis(2000);

const SPAWN_INTERVAL_MS: std::ops::Range<u64> = 500..1000;
const SPAWN_DELAY_MS: std::ops::Range<u64> = 1000..5000;
const SPAWN_DURATION_MS: std::ops::Range<u64> = 1000..5000;

const START_Y_OFFSET: f32 = 104.0;
const START_OPACITY: f32 = 0.8;

/// A fire-and-forget decorative particle: spawned at a randomized position
/// inside a pair's band, drifting up and out while fading to nothing. It has
/// no persisted identity; once its animation completes it is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpec {
    pub pair: String,
    pub start: Point,
    pub start_radius: f32,
    pub start_opacity: f32,
    pub delay: Duration,
    pub duration: Duration,
    pub end: Point,
    pub end_radius: f32,
    pub end_opacity: f32,
}

impl ParticleSpec {
    pub fn spawned(pair: &str, band_x: f32, layout: &Layout, rng: &mut impl Rng) -> Self {
        ParticleSpec {
            pair: pair.to_string(),
            start: Point::new(
                band_x + rng.random_range(15.0..30.0),
                layout.outer_height - START_Y_OFFSET,
            ),
            start_radius: rng.random_range(2.0..4.0),
            start_opacity: START_OPACITY,
            delay: Duration::from_millis(rng.random_range(SPAWN_DELAY_MS)),
            duration: Duration::from_millis(rng.random_range(SPAWN_DURATION_MS)),
            end: Point::new(band_x + rng.random_range(4.0..40.0), -layout.margin_top),
            end_radius: rng.random_range(4.0..8.0),
            end_opacity: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No timer armed.
    Idle,
    /// The one-shot arm delay is running.
    Armed { fires_at: Instant },
    /// The repeating emission timer is running.
    Emitting { next_spawn: Instant },
    /// Visibility was lost; the repeating timer is cleared. Re-entering
    /// `Emitting` requires a fresh `Armed` cycle.
    Suspended,
}

/// Timer-driven particle generator, gated by surface visibility.
///
/// The emitter holds deadlines rather than real timers: the host polls it
/// with the current instant on every scheduler tick, and each expired
/// deadline either advances the state machine or spawns one particle per
/// pair. Randomness comes from an injected [`Rng`] so tests stay
/// deterministic, and `reset` drops every pending deadline so a superseded
/// render pass can never fire into a torn-down scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emitter {
    state: State,
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter { state: State::Idle }
    }
}

impl Emitter {
    /// Arms the one-shot delay for a freshly built render pass.
    pub fn arm(&mut self, now: Instant) {
        self.state = State::Armed {
            fires_at: now + ARM_DELAY,
        };
    }

    /// Clears any pending deadline. Called on teardown and before every
    /// rebuild so stale deadlines never outlive their render pass.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Handles a visibility-change notification. Idempotent: repeated
    /// notifications of the current state are no-ops.
    pub fn set_visibility(&mut self, now: Instant, visible: bool) {
        if visible {
            if matches!(self.state, State::Idle | State::Suspended) {
                self.arm(now);
            }
        } else if self.state != State::Suspended {
            self.state = State::Suspended;
        }
    }

    /// Advances expired deadlines. Entering `Emitting` requires visibility;
    /// an arm delay firing while hidden falls back to `Idle`, and a spawn
    /// deadline firing while hidden suspends the emitter.
    pub fn poll(
        &mut self,
        now: Instant,
        visible: bool,
        bands: &[(String, f32)],
        layout: &Layout,
        rng: &mut impl Rng,
    ) -> Vec<ParticleSpec> {
        match self.state {
            State::Armed { fires_at } if now >= fires_at => {
                if visible {
                    self.state = State::Emitting {
                        next_spawn: now + random_interval(rng),
                    };
                } else {
                    self.state = State::Idle;
                }

                Vec::new()
            }
            State::Emitting { next_spawn } if now >= next_spawn => {
                if !visible {
                    self.state = State::Suspended;
                    return Vec::new();
                }

                self.state = State::Emitting {
                    next_spawn: now + random_interval(rng),
                };

                bands
                    .iter()
                    .map(|(pair, band_x)| ParticleSpec::spawned(pair, *band_x, layout, rng))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// The next pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            State::Armed { fires_at } => Some(fires_at),
            State::Emitting { next_spawn } => Some(next_spawn),
            State::Idle | State::Suspended => None,
        }
    }
}

fn random_interval(rng: &mut impl Rng) -> Duration {
    Duration::from_millis(rng.random_range(SPAWN_INTERVAL_MS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn bands() -> Vec<(String, f32)> {
        vec![("A".to_string(), 0.0), ("B".to_string(), 80.0)]
    }

    #[test]
    fn arm_then_poll_enters_emitting_when_visible() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        assert!(matches!(emitter.state(), State::Armed { .. }));

        let spawned = emitter.poll(now + ARM_DELAY, true, &bands(), &layout, &mut rng);
        assert!(spawned.is_empty());
        assert!(matches!(emitter.state(), State::Emitting { .. }));
    }

    #[test]
    fn arm_delay_firing_while_hidden_falls_back_to_idle() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        emitter.poll(now + ARM_DELAY, false, &bands(), &layout, &mut rng);

        assert_eq!(emitter.state(), State::Idle);
        assert!(emitter.next_deadline().is_none());
    }

    #[test]
    fn emitting_spawns_one_particle_per_pair() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        emitter.poll(now + ARM_DELAY, true, &bands(), &layout, &mut rng);

        let deadline = emitter.next_deadline().unwrap();
        let spawned = emitter.poll(deadline, true, &bands(), &layout, &mut rng);

        assert_eq!(spawned.len(), bands().len());
        assert!(matches!(emitter.state(), State::Emitting { .. }));

        // the repeating timer re-armed with a fresh deadline
        assert!(emitter.next_deadline().unwrap() > deadline);
    }

    #[test]
    fn spawned_particles_stay_inside_randomization_bounds() {
        let layout = Layout::default();
        let mut rng = rng();

        for _ in 0..100 {
            let spec = ParticleSpec::spawned("A", 120.0, &layout, &mut rng);

            assert!(spec.start.x >= 135.0 && spec.start.x < 150.0);
            assert!(spec.start_radius >= 2.0 && spec.start_radius < 4.0);
            assert!(spec.delay >= Duration::from_millis(1000));
            assert!(spec.delay < Duration::from_millis(5000));
            assert!(spec.duration >= Duration::from_millis(1000));
            assert!(spec.duration < Duration::from_millis(5000));
            assert!(spec.end.x >= 124.0 && spec.end.x < 160.0);
            assert!(spec.end.y < 0.0);
            assert!(spec.end_radius >= 4.0 && spec.end_radius < 8.0);
            assert_eq!(spec.end_opacity, 0.0);
        }
    }

    #[test]
    fn hiding_while_emitting_clears_the_repeating_timer() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        emitter.poll(now + ARM_DELAY, true, &bands(), &layout, &mut rng);

        emitter.set_visibility(now + ARM_DELAY, false);

        assert_eq!(emitter.state(), State::Suspended);
        assert!(emitter.next_deadline().is_none());
    }

    #[test]
    fn visibility_regained_restarts_the_cycle_from_scratch() {
        let mut emitter = Emitter::default();
        let now = Instant::now();

        // false -> true while idle arms a fresh cycle
        emitter.set_visibility(now, true);
        assert_eq!(
            emitter.next_deadline(),
            Some(now + ARM_DELAY),
            "regained visibility must restart with the full arm delay"
        );

        emitter.set_visibility(now, false);
        assert_eq!(emitter.state(), State::Suspended);

        emitter.set_visibility(now, true);
        assert!(matches!(emitter.state(), State::Armed { .. }));
    }

    #[test]
    fn repeated_notifications_are_no_ops() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        emitter.poll(now + ARM_DELAY, true, &bands(), &layout, &mut rng);
        let state = emitter.state();

        emitter.set_visibility(now + ARM_DELAY, true);
        assert_eq!(emitter.state(), state);

        emitter.set_visibility(now + ARM_DELAY, false);
        emitter.set_visibility(now + ARM_DELAY, false);
        assert_eq!(emitter.state(), State::Suspended);
    }

    #[test]
    fn reset_drops_every_pending_deadline() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        emitter.reset();
        assert!(emitter.next_deadline().is_none());

        emitter.arm(now);
        emitter.poll(now + ARM_DELAY, true, &bands(), &layout, &mut rng);
        emitter.reset();

        assert_eq!(emitter.state(), State::Idle);
        assert!(emitter.next_deadline().is_none());
    }

    #[test]
    fn never_emits_while_hidden() {
        let layout = Layout::default();
        let mut rng = rng();
        let mut emitter = Emitter::default();
        let now = Instant::now();

        emitter.arm(now);
        emitter.poll(now + ARM_DELAY, true, &bands(), &layout, &mut rng);

        let deadline = emitter.next_deadline().unwrap();
        let spawned = emitter.poll(deadline, false, &bands(), &layout, &mut rng);

        assert!(spawned.is_empty());
        assert_eq!(emitter.state(), State::Suspended);
    }
}
