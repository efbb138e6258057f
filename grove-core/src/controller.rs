//! Growth/shrink state machine driven by heart-rate samples.
//!
//! The controller never sleeps or schedules anything itself. A caller:
//! 1. feeds samples through [`GrowthController::on_sample`],
//! 2. asks [`GrowthController::next_tick`] when (and for which generation)
//!    the next step is due,
//! 3. calls [`GrowthController::tick_for`] with that generation once the
//!    interval elapses.
//!
//! Both entry points return the [`Command`]s the renderer should apply, in
//! order.

use std::time::Duration;

use log::{debug, info, trace};

use crate::{
    command::Command,
    config::Config,
    error::ConfigError,
    sample::{Sample, SampleWindow},
    types::{Generation, Timestamp},
};

/// Which way the scale is currently moving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthState {
    #[default]
    Idle,
    Growing,
    Shrinking,
}

/// When the next [`GrowthController::tick_for`] call is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSchedule {
    pub generation: Generation,
    pub interval: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Grow,
    Shrink,
}

/// Maps a stream of heart-rate samples to a bounded, animated scale.
///
/// ### Invariants
/// - `initial_scale <= scale <= target_scale` at all times.
/// - `Growing` is entered only below `target_scale` and while the latest
///   rate is under the threshold; `Shrinking` mirrors this towards
///   `initial_scale`. The first tick that finds the scale already at the
///   bound returns to `Idle`.
/// - Every state change bumps `generation`, which invalidates ticks that
///   were scheduled for the previous state.
#[derive(Debug, Clone)]
pub struct GrowthController {
    cfg: Config,
    state: GrowthState,
    scale: f64,
    generation: Generation,
    last_timestamp: Option<Timestamp>,
    history: SampleWindow,
}

impl GrowthController {
    /// Creates an idle controller at `cfg.initial_scale`.
    ///
    /// ### Errors
    /// Returns the first [`Config::validate`] failure.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            state: GrowthState::Idle,
            scale: cfg.initial_scale,
            generation: 0,
            last_timestamp: None,
            history: SampleWindow::with_capacity(cfg.history_len),
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn state(&self) -> GrowthState {
        self.state
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }

    /// Recently accepted samples, oldest first.
    pub fn history(&self) -> &SampleWindow {
        &self.history
    }

    /// The pending step, or `None` while idle.
    pub fn next_tick(&self) -> Option<TickSchedule> {
        let interval = match self.state {
            GrowthState::Idle => return None,
            GrowthState::Growing => self.cfg.tick_interval_growing(),
            GrowthState::Shrinking => self.cfg.tick_interval_shrinking(),
        };
        Some(TickSchedule {
            generation: self.generation,
            interval,
        })
    }

    /// Accepts one heart-rate reading and re-evaluates the direction.
    ///
    /// Samples with a non-finite rate, or a timestamp not strictly after
    /// the last accepted one, are ignored and produce no commands.
    pub fn on_sample(&mut self, sample: Sample) -> Vec<Command> {
        if !sample.rate.is_finite() {
            debug!(
                "ignoring sample t={} with non-finite rate {}",
                sample.timestamp, sample.rate
            );
            return Vec::new();
        }
        if let Some(last) = self.last_timestamp
            && sample.timestamp <= last
        {
            debug!(
                "ignoring sample t={} (last accepted t={})",
                sample.timestamp, last
            );
            return Vec::new();
        }

        self.last_timestamp = Some(sample.timestamp);
        self.history.push(sample);

        let dir = if sample.rate < self.cfg.growth_threshold {
            Direction::Grow
        } else {
            Direction::Shrink
        };

        let (wanted, can_move, command) = match dir {
            Direction::Grow => (
                GrowthState::Growing,
                self.scale < self.cfg.target_scale,
                Command::StartAnimation,
            ),
            Direction::Shrink => (
                GrowthState::Shrinking,
                self.scale > self.cfg.initial_scale,
                Command::StopAnimation,
            ),
        };

        if self.state == wanted {
            return Vec::new();
        }
        // Already resting at the bound this direction heads for.
        if !can_move && self.state == GrowthState::Idle {
            return Vec::new();
        }

        self.transition(if can_move { wanted } else { GrowthState::Idle });
        vec![command]
    }

    /// Applies one step for the current generation.
    pub fn tick(&mut self) -> Vec<Command> {
        self.tick_for(self.generation)
    }

    /// Applies one step if `generation` is still current.
    ///
    /// A stale generation (the state changed since the tick was scheduled)
    /// or an idle controller yields no commands.
    pub fn tick_for(&mut self, generation: Generation) -> Vec<Command> {
        if generation != self.generation {
            trace!(
                "discarding stale tick (gen {} != {})",
                generation, self.generation
            );
            return Vec::new();
        }

        let (lo, hi) = (self.cfg.initial_scale, self.cfg.target_scale);
        let next = match self.state {
            GrowthState::Idle => return Vec::new(),
            GrowthState::Growing => (self.scale + self.cfg.growth_increment).clamp(lo, hi),
            GrowthState::Shrinking => (self.scale - self.cfg.shrink_increment).clamp(lo, hi),
        };

        if next == self.scale {
            let reached_target = self.state == GrowthState::Growing && self.scale == hi;
            self.transition(GrowthState::Idle);
            if reached_target {
                info!("tree fully grown at scale {hi}, spawning neighbour");
                return vec![Command::SpawnInstance];
            }
            return Vec::new();
        }

        trace!("{:?} step {} -> {}", self.state, self.scale, next);
        self.scale = next;
        vec![Command::UpdateScale(next)]
    }

    fn transition(&mut self, to: GrowthState) {
        debug!(
            "{:?} -> {:?} at scale {} (gen {})",
            self.state,
            to,
            self.scale,
            self.generation + 1
        );
        self.state = to;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    const EPS: f64 = 1e-9;

    fn scenario_config() -> Config {
        Config {
            initial_scale: 0.5,
            target_scale: 9.0,
            growth_threshold: 80.0,
            growth_increment: 0.01,
            shrink_increment: 0.005,
            ..Config::default()
        }
    }

    fn small_config() -> Config {
        Config {
            initial_scale: 1.0,
            target_scale: 2.0,
            growth_threshold: 80.0,
            growth_increment: 0.25,
            shrink_increment: 0.5,
            ..Config::default()
        }
    }

    fn controller(cfg: Config) -> GrowthController {
        GrowthController::new(cfg).unwrap()
    }

    /// Ticks until idle, collecting everything emitted.
    fn run_until_idle(c: &mut GrowthController, max_ticks: usize) -> Vec<Command> {
        let mut out = Vec::new();
        for _ in 0..max_ticks {
            if c.state() == GrowthState::Idle {
                break;
            }
            out.extend(c.tick());
        }
        out
    }

    #[test]
    fn new_controller_is_idle_at_initial_scale() {
        let c = controller(scenario_config());
        assert_eq!(c.state(), GrowthState::Idle);
        assert_eq!(c.scale(), 0.5);
        assert_eq!(c.next_tick(), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = Config {
            growth_increment: 0.0,
            ..scenario_config()
        };
        assert!(GrowthController::new(cfg).is_err());
    }

    #[test]
    fn scenario_grow_then_flip_to_shrink() {
        let mut c = controller(scenario_config());

        let cmds = c.on_sample(Sample::new(1, 70.0));
        assert_eq!(cmds, vec![Command::StartAnimation]);
        assert_eq!(c.state(), GrowthState::Growing);
        let growing_gen = c.generation();

        let mut emitted = Vec::new();
        for _ in 0..10 {
            emitted.extend(c.tick());
        }
        assert!((c.scale() - 0.6).abs() < EPS, "scale = {}", c.scale());
        assert_eq!(emitted.len(), 10);
        assert!(!emitted.contains(&Command::SpawnInstance));

        let cmds = c.on_sample(Sample::new(2, 85.0));
        assert_eq!(cmds, vec![Command::StopAnimation]);
        assert_eq!(c.state(), GrowthState::Shrinking);

        // A growth tick scheduled before the flip must not fire.
        let before = c.scale();
        assert!(c.tick_for(growing_gen).is_empty());
        assert_eq!(c.scale(), before);

        // The shrink sequence runs on the new generation.
        let cmds = c.tick();
        assert_eq!(cmds.len(), 1);
        assert!((c.scale() - 0.595).abs() < EPS);
    }

    #[test]
    fn duplicate_timestamp_is_ignored() {
        let mut c = controller(scenario_config());

        assert_eq!(
            c.on_sample(Sample::new(5, 60.0)),
            vec![Command::StartAnimation]
        );
        let generation = c.generation();

        assert!(c.on_sample(Sample::new(5, 90.0)).is_empty());
        assert_eq!(c.state(), GrowthState::Growing);
        assert_eq!(c.generation(), generation);
        assert_eq!(c.history().len(), 1);
    }

    #[test]
    fn same_sample_twice_emits_nothing_the_second_time() {
        let mut c = controller(scenario_config());
        let s = Sample::new(3, 95.0);
        c.on_sample(Sample::new(1, 60.0));
        c.tick();

        assert_eq!(c.on_sample(s), vec![Command::StopAnimation]);
        assert!(c.on_sample(s).is_empty());
    }

    #[test]
    fn older_timestamp_is_ignored() {
        let mut c = controller(scenario_config());
        c.on_sample(Sample::new(10, 60.0));
        assert!(c.on_sample(Sample::new(4, 100.0)).is_empty());
        assert_eq!(c.last_timestamp(), Some(10));
        assert_eq!(c.state(), GrowthState::Growing);
    }

    #[test]
    fn non_finite_rate_is_ignored() {
        let mut c = controller(scenario_config());
        assert!(c.on_sample(Sample::new(1, f64::NAN)).is_empty());
        assert!(c.on_sample(Sample::new(2, f64::INFINITY)).is_empty());
        assert_eq!(c.last_timestamp(), None);
        assert!(c.history().is_empty());

        // Rejected timestamps are not consumed.
        assert_eq!(
            c.on_sample(Sample::new(1, 70.0)),
            vec![Command::StartAnimation]
        );
    }

    #[test]
    fn steady_low_rate_converges_to_target_with_one_spawn() {
        let mut c = controller(small_config());
        let mut all = c.on_sample(Sample::new(1, 65.0));
        all.extend(run_until_idle(&mut c, 100));

        // More low samples and ticks after full growth change nothing.
        for t in 2..10 {
            all.extend(c.on_sample(Sample::new(t, 60.0)));
            all.extend(c.tick());
        }

        assert_eq!(c.scale(), 2.0);
        assert_eq!(c.state(), GrowthState::Idle);
        let spawns = all
            .iter()
            .filter(|cmd| **cmd == Command::SpawnInstance)
            .count();
        assert_eq!(spawns, 1);
        assert_eq!(
            all,
            vec![
                Command::StartAnimation,
                Command::UpdateScale(1.25),
                Command::UpdateScale(1.5),
                Command::UpdateScale(1.75),
                Command::UpdateScale(2.0),
                Command::SpawnInstance,
            ]
        );
    }

    #[test]
    fn high_rate_after_growth_shrinks_monotonically_without_spawn() {
        let mut c = controller(scenario_config());
        c.on_sample(Sample::new(1, 70.0));
        for _ in 0..40 {
            c.tick();
        }
        let peak = c.scale();
        assert!(peak > 0.5);

        assert_eq!(
            c.on_sample(Sample::new(2, 110.0)),
            vec![Command::StopAnimation]
        );

        let mut prev = peak;
        let mut t = 3;
        while c.state() != GrowthState::Idle {
            for cmd in c.tick() {
                match cmd {
                    Command::UpdateScale(v) => {
                        assert!(v < prev, "{v} should be below {prev}");
                        prev = v;
                    }
                    other => panic!("unexpected {other:?} while shrinking"),
                }
            }
            assert!(c.on_sample(Sample::new(t, 120.0)).is_empty());
            t += 1;
        }
        assert_eq!(c.scale(), 0.5);
    }

    #[test]
    fn infinite_shrink_increment_snaps_back() {
        let cfg = Config {
            shrink_increment: f64::INFINITY,
            ..small_config()
        };
        let mut c = controller(cfg);
        c.on_sample(Sample::new(1, 60.0));
        c.tick();
        c.tick();

        c.on_sample(Sample::new(2, 100.0));
        assert_eq!(c.tick(), vec![Command::UpdateScale(1.0)]);
        assert!(c.tick().is_empty());
        assert_eq!(c.state(), GrowthState::Idle);
    }

    #[test]
    fn high_rate_at_initial_scale_stays_idle() {
        let mut c = controller(scenario_config());
        assert!(c.on_sample(Sample::new(1, 120.0)).is_empty());
        assert_eq!(c.state(), GrowthState::Idle);
        assert_eq!(c.generation(), 0);
    }

    #[test]
    fn flip_before_first_growth_tick_halts_growth() {
        let mut c = controller(scenario_config());
        c.on_sample(Sample::new(1, 60.0));
        let growing_gen = c.generation();

        // Still at the initial scale, so there is nothing to shrink.
        assert_eq!(
            c.on_sample(Sample::new(2, 90.0)),
            vec![Command::StopAnimation]
        );
        assert_eq!(c.state(), GrowthState::Idle);
        assert!(c.tick_for(growing_gen).is_empty());
        assert_eq!(c.scale(), 0.5);
    }

    #[test]
    fn next_tick_uses_interval_of_current_direction() {
        let cfg = Config {
            tick_interval_growing_ms: 40,
            tick_interval_shrinking_ms: 250,
            ..small_config()
        };
        let mut c = controller(cfg);

        c.on_sample(Sample::new(1, 60.0));
        let grow = c.next_tick().unwrap();
        assert_eq!(grow.interval, Duration::from_millis(40));
        c.tick();

        c.on_sample(Sample::new(2, 90.0));
        let shrink = c.next_tick().unwrap();
        assert_eq!(shrink.interval, Duration::from_millis(250));
        assert!(shrink.generation > grow.generation);
    }

    #[test]
    fn every_transition_bumps_generation() {
        let mut c = controller(small_config());
        let mut seen = vec![c.generation()];
        c.on_sample(Sample::new(1, 60.0));
        seen.push(c.generation());
        c.tick();
        c.on_sample(Sample::new(2, 90.0));
        seen.push(c.generation());
        c.on_sample(Sample::new(3, 60.0));
        seen.push(c.generation());
        assert!(seen.windows(2).all(|w| w[1] > w[0]), "{seen:?}");
    }

    #[test]
    fn random_streams_keep_scale_in_bounds_and_state_consistent() {
        let cfg = small_config();
        let mut rng = StdRng::seed_from_u64(0x5eed);

        for _ in 0..50 {
            let mut c = controller(cfg);
            let mut t = 0;
            for _ in 0..300 {
                let cmds = if rng.random_bool(0.3) {
                    t += rng.random_range(0..3);
                    c.on_sample(Sample::new(t, rng.random_range(50.0..=110.0)))
                } else {
                    c.tick()
                };

                assert!(cmds.len() <= 1);
                for cmd in cmds {
                    if let Command::UpdateScale(v) = cmd {
                        assert!((cfg.initial_scale..=cfg.target_scale).contains(&v));
                    }
                }
                assert!(c.scale() >= cfg.initial_scale && c.scale() <= cfg.target_scale);

                let latest = c.history().latest().map(|s| s.rate);
                match c.state() {
                    GrowthState::Growing => {
                        assert!(latest.is_some_and(|r| r < cfg.growth_threshold));
                    }
                    GrowthState::Shrinking => {
                        assert!(latest.is_some_and(|r| r >= cfg.growth_threshold));
                    }
                    GrowthState::Idle => {}
                }
            }
        }
    }
}
