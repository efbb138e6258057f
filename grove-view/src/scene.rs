//! Renderer-side state: applies controller [`Command`]s to a set of trees.
//!
//! Scale changes are not applied instantly. Each tree eases from its
//! current scale to the new one over [`TRANSITION_SECS`].

use glam::Vec2;
use grove_core::command::Command;

/// Duration of an eased scale change, in seconds.
pub const TRANSITION_SECS: f64 = 2.0;

/// World-space distance between a tree and the neighbour it spawns.
pub const NEIGHBOUR_SPACING: f32 = 40.0;

/// Peak sway angle (radians) while the animation plays.
const SWAY_AMPLITUDE: f32 = 0.06;

/// Smoothstep ease-in-out on `t` in `[0, 1]`.
fn ease_in_out(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone)]
pub struct TreeInstance {
    pub pos: Vec2,
    from: f32,
    to: f32,
    started: f64,
}

impl TreeInstance {
    fn new(pos: Vec2, scale: f32, now: f64) -> Self {
        Self {
            pos,
            from: scale,
            to: scale,
            started: now,
        }
    }

    /// Starts easing towards `to`, continuing from wherever the previous
    /// transition currently is.
    pub fn retarget(&mut self, to: f32, now: f64) {
        self.from = self.scale_at(now);
        self.to = to;
        self.started = now;
    }

    pub fn scale_at(&self, now: f64) -> f32 {
        let t = ((now - self.started) / TRANSITION_SECS).clamp(0.0, 1.0) as f32;
        self.from + (self.to - self.from) * ease_in_out(t)
    }

    pub fn target_scale(&self) -> f32 {
        self.to
    }
}

/// All trees on screen plus the shared animation flag.
///
/// The controller drives the first tree; spawned neighbours grow once to
/// the scale their parent had when it spawned them.
#[derive(Debug, Clone)]
pub struct Scene {
    trees: Vec<TreeInstance>,
    animating: bool,
    initial_scale: f32,
}

impl Scene {
    pub fn new(initial_scale: f64, now: f64) -> Self {
        let initial_scale = initial_scale as f32;
        Self {
            trees: vec![TreeInstance::new(Vec2::ZERO, initial_scale, now)],
            animating: false,
            initial_scale,
        }
    }

    pub fn trees(&self) -> &[TreeInstance] {
        &self.trees
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Whether any tree is still mid-transition at `now`.
    pub fn in_transition(&self, now: f64) -> bool {
        self.trees
            .iter()
            .any(|t| now - t.started < TRANSITION_SECS && t.from != t.to)
    }

    pub fn apply(&mut self, cmd: Command, now: f64) {
        match cmd {
            Command::UpdateScale(v) => self.trees[0].retarget(v as f32, now),
            Command::StartAnimation => self.animating = true,
            Command::StopAnimation => self.animating = false,
            Command::SpawnInstance => self.spawn_neighbour(now),
        }
    }

    pub fn apply_all(&mut self, cmds: impl IntoIterator<Item = Command>, now: f64) {
        for cmd in cmds {
            self.apply(cmd, now);
        }
    }

    /// Sway angle for the tree at `index`, zero while paused.
    pub fn sway(&self, index: usize, now: f64) -> f32 {
        if !self.animating {
            return 0.0;
        }
        let phase = index as f64 * 0.7;
        SWAY_AMPLITUDE * (now * 1.5 + phase).sin() as f32
    }

    // Neighbours alternate right and left of the first tree.
    fn spawn_neighbour(&mut self, now: f64) {
        let n = self.trees.len();
        let ring = n.div_ceil(2) as f32;
        let side = if n % 2 == 1 { 1.0 } else { -1.0 };
        let pos = Vec2::new(side * ring * NEIGHBOUR_SPACING, 0.0);

        let mut tree = TreeInstance::new(pos, self.initial_scale, now);
        tree.retarget(self.trees[0].target_scale(), now);
        self.trees.push(tree);
    }
}
