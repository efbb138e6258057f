//! Wall-clock driver for [`GrowthController`] ticks.
//!
//! Frame loops and timers call [`TickClock::poll`] with the current time;
//! the clock runs every step that has come due for the controller's
//! current generation and re-arms whenever the generation changes.

use log::warn;

use crate::{command::Command, controller::GrowthController, types::Generation};

/// Upper bound on steps run by a single [`TickClock::poll`].
pub const DEFAULT_MAX_CATCH_UP: u32 = 64;

/// Slack for float error when comparing elapsed time with an interval.
const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Armed {
    generation: Generation,
    /// Time (seconds) the last step was due.
    since: f64,
}

#[derive(Debug, Clone)]
pub struct TickClock {
    armed: Option<Armed>,
    max_catch_up: u32,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            armed: None,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
        }
    }

    pub fn with_max_catch_up(mut self, max: u32) -> Self {
        self.max_catch_up = max.max(1);
        self
    }

    /// Drops any pending schedule; the next poll re-arms from scratch.
    pub fn disarm(&mut self) {
        self.armed = None;
    }

    /// Runs all steps due at `now` (seconds, monotonic).
    ///
    /// A newly seen generation is armed at `now` and its first step falls
    /// one interval later. If more than `max_catch_up` steps are due (e.g.
    /// after the window was hidden) the rest are skipped and the clock
    /// resynchronises to `now`.
    pub fn poll(&mut self, ctrl: &mut GrowthController, now: f64) -> Vec<Command> {
        let mut out = Vec::new();
        let mut ran = 0;

        while let Some(sched) = ctrl.next_tick() {
            let interval = sched.interval.as_secs_f64();
            let armed = match self.armed {
                Some(a) if a.generation == sched.generation => a,
                _ => {
                    self.armed = Some(Armed {
                        generation: sched.generation,
                        since: now,
                    });
                    return out;
                }
            };

            if now - armed.since + EPSILON < interval {
                return out;
            }
            if ran == self.max_catch_up {
                warn!("tick clock fell behind by more than {ran} steps, resynchronising");
                self.armed = Some(Armed { since: now, ..armed });
                return out;
            }

            self.armed = Some(Armed {
                since: armed.since + interval,
                ..armed
            });
            out.extend(ctrl.tick_for(sched.generation));
            ran += 1;
        }

        self.armed = None;
        out
    }
}
