use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{
    command::Command,
    controller::{GrowthController, GrowthState, TickSchedule},
    sample::Sample,
    types::Generation,
};

/// Point-in-time copy of the controller's observable state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub state: GrowthState,
    pub scale: f64,
    pub generation: Generation,
}

/// Cloneable handle for hosts that deliver samples and ticks on
/// different threads.
///
/// Every call holds the lock for the whole transition, so a state change
/// and the scale update it implies are never observed apart.
#[derive(Debug, Clone)]
pub struct SharedController {
    inner: Arc<Mutex<GrowthController>>,
}

impl SharedController {
    pub fn new(ctrl: GrowthController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ctrl)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GrowthController> {
        self.inner.lock()
    }

    pub fn on_sample(&self, sample: Sample) -> Vec<Command> {
        self.lock().on_sample(sample)
    }

    pub fn tick_for(&self, generation: Generation) -> Vec<Command> {
        self.lock().tick_for(generation)
    }

    pub fn next_tick(&self) -> Option<TickSchedule> {
        self.lock().next_tick()
    }

    pub fn snapshot(&self) -> Snapshot {
        let c = self.lock();
        Snapshot {
            state: c.state(),
            scale: c.scale(),
            generation: c.generation(),
        }
    }

    /// Runs `f` with exclusive access, e.g. to drive a [`crate::schedule::TickClock`].
    pub fn with<T>(&self, f: impl FnOnce(&mut GrowthController) -> T) -> T {
        f(&mut self.lock())
    }
}
