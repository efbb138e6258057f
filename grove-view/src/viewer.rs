//! Interactive heart-rate tree viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the growth controller, the
//! sample source and the renderer-side [`Scene`], and implements
//! [`eframe::App`] to drive and draw them.

use eframe::App;
use glam::Vec2;
use grove_core::{
    command::Command,
    controller::{GrowthController, GrowthState},
    schedule::TickClock,
    source::SyntheticSource,
};
use log::debug;

use crate::scene::Scene;

/// Delay between pressing "Update Heart Rate" and the reading arriving.
const SAMPLE_DELAY: f64 = 1.0;

/// Trunk length of a tree at scale 1.0, in world units.
const BASE_HEIGHT: f32 = 4.0;

/// Main application state for the viewer.
///
/// [`Viewer`] glues together:
/// - The core: a [`GrowthController`] stepped by a [`TickClock`].
/// - A [`SyntheticSource`] standing in for the live heart-rate feed.
/// - A [`Scene`] that applies emitted commands with eased transitions.
/// - UI state (pan/zoom, auto-sampling).
///
/// The per-frame update is:
/// 1. Deliver any due heart-rate sample.
/// 2. Poll the tick clock for due growth/shrink steps.
/// 3. Apply the resulting commands to the scene and draw it.
///
/// ### Fields
/// - `ctrl` - Growth controller for the current session.
/// - `fresh` - Untouched copy of `ctrl`, restored on reset.
/// - `clock` - Converts frame time into controller ticks.
/// - `source` - Heart-rate sample generator.
/// - `scene` - Trees and animation state shown on screen.
///
/// - `sampling` - Whether samples are delivered automatically.
/// - `sample_interval` - Seconds between automatic samples.
/// - `last_sample_time` - Time of the last delivered sample (egui time).
/// - `pending_sample_at` - Time a manually requested sample is due.
///
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
pub struct Viewer {
    ctrl: GrowthController,
    fresh: GrowthController,
    clock: TickClock,
    source: SyntheticSource,
    scene: Scene,

    sampling: bool,
    sample_interval: f64,
    last_sample_time: f64,
    pending_sample_at: Option<f64>,

    zoom: f32,
    pan: egui::Vec2,
}

impl Viewer {
    /// Creates a viewer around a freshly constructed controller.
    ///
    /// The scene starts with a single tree at the controller's initial
    /// scale; automatic sampling is off until the user presses Run.
    pub fn new(ctrl: GrowthController, source: SyntheticSource) -> Self {
        let scene = Scene::new(ctrl.scale(), 0.0);
        Self {
            fresh: ctrl.clone(),
            ctrl,
            clock: TickClock::new(),
            source,
            scene,
            sampling: false,
            sample_interval: 1.0,
            last_sample_time: 0.0,
            pending_sample_at: None,
            zoom: 12.0,
            pan: egui::vec2(0.0, 150.0),
        }
    }

    /// Starts a new session with the same configuration.
    ///
    /// Camera settings are kept; the controller, tick clock and scene
    /// are restored and auto-sampling stops.
    fn reset(&mut self, now: f64) {
        self.ctrl = self.fresh.clone();
        self.clock.disarm();
        self.scene = Scene::new(self.ctrl.scale(), now);
        self.sampling = false;
        self.pending_sample_at = None;
    }

    /// Schedules one reading [`SAMPLE_DELAY`] seconds from `now`.
    fn request_sample(&mut self, now: f64) {
        self.pending_sample_at = Some(now + SAMPLE_DELAY);
    }

    fn deliver_sample(&mut self, now: f64) {
        let sample = self.source.next_sample();
        debug!("sample t={} rate={:.2}", sample.timestamp, sample.rate);
        let cmds = self.ctrl.on_sample(sample);
        self.apply(cmds, now);
        self.last_sample_time = now;
    }

    fn apply(&mut self, cmds: Vec<Command>, now: f64) {
        self.scene.apply_all(cmds, now);
    }

    /// Advances everything that is time-driven up to `now`.
    fn advance(&mut self, now: f64) {
        if let Some(due) = self.pending_sample_at
            && now >= due
        {
            self.pending_sample_at = None;
            self.deliver_sample(now);
        }

        if self.sampling && now - self.last_sample_time >= self.sample_interval {
            self.deliver_sample(now);
        }

        let cmds = self.clock.poll(&mut self.ctrl, now);
        self.apply(cmds, now);
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Builds the top panel UI (sampling controls, reset, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let now = ctx.input(|i| i.time);

                if ui
                    .button(if self.sampling { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.sampling = !self.sampling;
                }

                ui.add(
                    egui::DragValue::new(&mut self.sample_interval)
                        .prefix("sample every ")
                        .suffix(" s")
                        .range(0.1..=10.0)
                        .speed(0.05),
                );

                if ui.button("Update Heart Rate").clicked() {
                    self.request_sample(now);
                }

                if ui.button("Reset").clicked() {
                    self.reset(now);
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=40.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (state, scale, heart rate).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("trees = {}", self.scene.trees().len()));
                ui.label(format!("gen = {}", self.ctrl.generation()));
                ui.label(format!("scale = {:.3}", self.ctrl.scale()));
                ui.label(format!("{:?}", self.ctrl.state()));
                ui.separator();

                let history = self.ctrl.history();
                if let Some((lo, hi)) = history.rate_range() {
                    ui.label(format!(
                        "last {} readings: {lo:.1}–{hi:.1} BPM",
                        history.len()
                    ));
                }
                let rate = history.latest().map_or(0.0, |s| s.rate);
                ui.label(format!("Current heart rate: {rate:.2} BPM"));
            });
        });
    }

    /// Draws one tree: a trunk leaning by the sway angle and a round canopy.
    fn draw_tree(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        base: Vec2,
        scale: f32,
        sway: f32,
    ) {
        let height = BASE_HEIGHT * scale;
        let up = Vec2::from_angle(sway).rotate(Vec2::Y);
        let top = base + up * height;

        let trunk_w = (0.15 * height * self.zoom).max(1.0);
        painter.line_segment(
            [
                self.world_to_screen(base, rect),
                self.world_to_screen(top, rect),
            ],
            egui::Stroke::new(trunk_w, egui::Color32::from_rgb(110, 80, 50)),
        );
        painter.circle_filled(
            self.world_to_screen(top, rect),
            (0.45 * height * self.zoom).max(2.0),
            egui::Color32::from_rgb(60, 150, 70),
        );
    }

    /// Builds the central panel where the trees are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);
            let now = ctx.input(|i| i.time);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(1.0, 40.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Ground line.
            let left = self.world_to_screen(Vec2::new(-1000.0, 0.0), rect);
            let right = self.world_to_screen(Vec2::new(1000.0, 0.0), rect);
            painter.line_segment(
                [left, right],
                egui::Stroke::new(1.0, egui::Color32::DARK_GREEN),
            );

            for (i, tree) in self.scene.trees().iter().enumerate() {
                let sway = self.scene.sway(i, now);
                self.draw_tree(&painter, rect, tree.pos, tree.scale_at(now), sway);
            }
        });
    }

    fn needs_repaint(&self, now: f64) -> bool {
        self.sampling
            || self.pending_sample_at.is_some()
            || self.ctrl.state() != GrowthState::Idle
            || self.scene.is_animating()
            || self.scene.in_transition(now)
    }
}

impl App for Viewer {
    /// eframe callback that advances the session and builds all panels.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.advance(now);

        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);

        if self.needs_repaint(now) {
            ctx.request_repaint();
        }
    }
}
