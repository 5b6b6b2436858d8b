//! Interactive venation growth viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the [`GrowthNetwork`] and
//! implements [`eframe::App`] to step, render and control the simulation.

use crate::scene;
use eframe::App;
use glam::Vec2;
use rand::rng;
use tracing::{info, warn};
use venation_core::{
    DisplayFlags, GrowthNetwork, NetworkError, RenderMode, Settings, StepReport, VenationType,
    types::NodeId,
};

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(18, 18, 24);
const BRANCH_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 230, 200);
const TIP_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 80, 80);
const NEW_NODE_COLOR: egui::Color32 = egui::Color32::RED;
const ATTRACTOR_COLOR: egui::Color32 = egui::Color32::LIGHT_RED;
const ATTRACTION_ZONE_COLOR: egui::Color32 = egui::Color32::from_rgb(60, 60, 110);
const KILL_ZONE_COLOR: egui::Color32 = egui::Color32::from_rgb(140, 50, 50);
const INFLUENCE_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const BOUNDS_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 120, 120);
const OBSTACLE_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 160, 60);

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle keyboard shortcuts and panel widgets.
/// 2. Unless paused, call [`Viewer::step_once`] exactly once.
/// 3. Render bounds, obstacles, attractors and the node forest.
///
/// ### Fields
/// - `network` - Simulation state; the only thing stepping mutates.
/// - `rng` - Random number generator used for attractor placement.
/// - `zoom` / `pan` - World-to-screen mapping.
/// - `last_report` - Outcome of the last step (new nodes are highlighted).
/// - `steps_since_reset` - Drives the delayed late root.
/// - `settings_error` - Last rejected settings edit, shown in the panel.
pub struct Viewer {
    network: GrowthNetwork,
    rng: rand::rngs::ThreadRng,

    zoom: f32,
    pan: egui::Vec2,

    last_report: StepReport,
    steps_since_reset: usize,
    late_root_planted: bool,
    settings_error: Option<String>,
}

impl Viewer {
    /// Creates a viewer with the default scene.
    ///
    /// ### Returns
    /// `Err` if `settings` are invalid or the scene cannot be built.
    pub fn new(settings: Settings, display: DisplayFlags) -> Result<Self, NetworkError> {
        let mut rng = rng();
        let mut network = GrowthNetwork::new(settings)?;
        *network.display_mut() = display;
        scene::populate(&mut network, &mut rng)?;

        Ok(Self {
            network,
            rng,
            zoom: 0.5,
            pan: egui::vec2(0.0, 0.0),
            last_report: StepReport::default(),
            steps_since_reset: 0,
            late_root_planted: false,
            settings_error: None,
        })
    }

    /// Rebuilds the scene, keeping settings, display flags and camera.
    fn reset(&mut self) {
        if let Err(err) = scene::populate(&mut self.network, &mut self.rng) {
            warn!(%err, "scene reset failed");
        }
        self.last_report = StepReport::default();
        self.steps_since_reset = 0;
        self.late_root_planted = false;
    }

    /// Drops every node but keeps attractors, bounds and obstacles, and
    /// pauses the simulation.
    fn clear_nodes(&mut self) {
        self.network.clear_nodes();
        if !self.network.is_paused() {
            self.network.toggle_pause();
        }
        self.last_report = StepReport::default();
        self.late_root_planted = true;
    }

    /// Advances the simulation by a single step and plants the late root
    /// once enough steps have run.
    fn step_once(&mut self) {
        self.last_report = self.network.step();
        self.steps_since_reset += 1;

        if !self.late_root_planted && self.steps_since_reset >= scene::LATE_ROOT_DELAY_STEPS {
            match self.network.add_root(scene::LATE_ROOT) {
                Ok(id) => info!(id, "late root planted"),
                Err(err) => warn!(%err, "late root rejected"),
            }
            self.late_root_planted = true;
        }
    }

    /// Nodes grown in the last step. Growth only appends, so they form a
    /// run of consecutive ids at the end of the arena.
    fn is_new(&self, id: NodeId) -> bool {
        self.last_report
            .new_nodes
            .first()
            .is_some_and(|&first| id >= first)
    }

    /// Converts a world-space (canvas pixel) position to screen-space.
    ///
    /// The canvas center maps to the rect center; `zoom` scales around it
    /// and `pan` offsets the result.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let local = (p - scene::CANVAS_SIZE * 0.5) * self.zoom;
        egui::pos2(
            center.x + local.x + self.pan.x,
            center.y + local.y + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let local = Vec2::new(p.x - center.x - self.pan.x, p.y - center.y - self.pan.y);
        local / self.zoom + scene::CANVAS_SIZE * 0.5
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`]; returns `true` on change.
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) -> bool {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed))
                .changed()
        })
        .inner
    }

    /// Keyboard shortcuts, mirroring the panel buttons and checkboxes.
    /// Ignored while a text or drag field is being edited.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        use egui::Key;

        if ctx.wants_keyboard_input() {
            return;
        }

        let pressed: Vec<Key> = ctx.input(|i| {
            [
                Key::Space,
                Key::R,
                Key::C,
                Key::A,
                Key::N,
                Key::T,
                Key::Z,
                Key::K,
                Key::I,
                Key::B,
                Key::O,
                Key::L,
                Key::G,
            ]
            .into_iter()
            .filter(|k| i.key_pressed(*k))
            .collect()
        });

        for key in pressed {
            match key {
                Key::Space => self.network.toggle_pause(),
                Key::R => self.reset(),
                Key::C => self.clear_nodes(),
                Key::A => self.network.toggle_attractors(),
                Key::N => self.network.toggle_nodes(),
                Key::T => self.network.toggle_tips(),
                Key::Z => self.network.toggle_attraction_zones(),
                Key::K => self.network.toggle_kill_zones(),
                Key::I => self.network.toggle_influence_lines(),
                Key::B => self.network.toggle_bounds(),
                Key::O => self.network.toggle_obstacles(),
                Key::L => self.network.toggle_render_mode(),
                Key::G => self.network.toggle_canalization(),
                _ => {}
            }
        }
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let paused = self.network.is_paused();
                if ui.button(if paused { "▶ Run" } else { "⏸ Pause" }).clicked() {
                    self.network.toggle_pause();
                }
                if ui.button("Step").clicked() {
                    self.step_once();
                }
                if ui.button("Reset").clicked() {
                    self.reset();
                }
                if ui.button("Clear nodes").clicked() {
                    self.clear_nodes();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (node, tip and attractor counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("grown last step = {}", self.last_report.new_nodes.len()));
                ui.separator();
                ui.label(format!("nodes = {}", self.network.nodes().len()));
                ui.label(format!("tips = {}", self.network.tree().tips().count()));
                ui.label(format!("attractors = {}", self.network.attractors().len()));
            });
        });
    }

    /// Builds the right-hand panel for simulation settings and display flags.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Settings");

                let mut s = *self.network.settings();
                let mut changed = false;

                ui.horizontal(|ui| {
                    ui.label("venation:");
                    changed |= ui
                        .radio_value(&mut s.venation_type, VenationType::Closed, "Closed")
                        .changed();
                    changed |= ui
                        .radio_value(&mut s.venation_type, VenationType::Open, "Open")
                        .changed();
                });

                ui.separator();
                ui.label("Growth");
                changed |=
                    Self::labeled_drag_f32(ui, "segment_length:", &mut s.segment_length, 0.1..=20.0, 0.1);
                changed |= Self::labeled_drag_f32(
                    ui,
                    "attraction_distance:",
                    &mut s.attraction_distance,
                    0.1..=500.0,
                    0.5,
                );
                changed |= Self::labeled_drag_f32(
                    ui,
                    "kill_distance:",
                    &mut s.kill_distance,
                    0.1..=500.0,
                    0.5,
                );

                ui.separator();
                ui.label("Thickness");
                changed |= ui
                    .checkbox(&mut s.enable_canalization, "canalization")
                    .changed();
                changed |= ui
                    .checkbox(&mut s.enable_opacity_blending, "opacity blending")
                    .changed();
                changed |=
                    Self::labeled_drag_f32(ui, "max:", &mut s.max_thickness, 0.1..=20.0, 0.1);
                changed |=
                    Self::labeled_drag_f32(ui, "branch:", &mut s.branch_thickness, 0.1..=20.0, 0.1);
                changed |= Self::labeled_drag_f32(ui, "tip:", &mut s.tip_thickness, 0.1..=20.0, 0.1);
                changed |=
                    Self::labeled_drag_f32(ui, "blend:", &mut s.thickness_blend, 0.01..=1.0, 0.01);

                if changed {
                    self.settings_error = match self.network.set_settings(s) {
                        Ok(()) => None,
                        Err(err) => {
                            warn!(%err, "settings edit rejected");
                            Some(err.to_string())
                        }
                    };
                }
                if let Some(err) = &self.settings_error {
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                }

                ui.separator();
                ui.heading("Display");
                let d = self.network.display_mut();
                ui.checkbox(&mut d.show_nodes, "nodes (n)");
                ui.checkbox(&mut d.show_tips, "tips (t)");
                ui.checkbox(&mut d.show_attractors, "attractors (a)");
                ui.checkbox(&mut d.show_attraction_zones, "attraction zones (z)");
                ui.checkbox(&mut d.show_kill_zones, "kill zones (k)");
                ui.checkbox(&mut d.show_influence_lines, "influence lines (i)");
                ui.checkbox(&mut d.show_bounds, "bounds (b)");
                ui.checkbox(&mut d.show_obstacles, "obstacles (o)");
                ui.horizontal(|ui| {
                    ui.label("render (l):");
                    ui.radio_value(&mut d.render_mode, RenderMode::Dots, "Dots");
                    ui.radio_value(&mut d.render_mode, RenderMode::Lines, "Lines");
                });

                ui.separator();
                if ui.button("Reset settings to default").clicked() {
                    let paused = self.network.is_paused();
                    let defaults = Settings {
                        is_paused: paused,
                        ..Settings::default()
                    };
                    self.settings_error =
                        self.network.set_settings(defaults).err().map(|e| e.to_string());
                }
            });
    }

    fn draw_polygons(&self, painter: &egui::Painter, rect: egui::Rect) {
        let display = self.network.display();
        let border = display.bounds_border_thickness * self.zoom;

        let draw = |vertices: &[Vec2], stroke: egui::Stroke| {
            let points: Vec<egui::Pos2> = vertices
                .iter()
                .map(|&v| self.world_to_screen(v, rect))
                .collect();
            painter.add(egui::Shape::closed_line(points, stroke));
        };

        if display.show_bounds {
            for b in self.network.bounds() {
                draw(b.vertices(), egui::Stroke::new(border, BOUNDS_COLOR));
            }
        }
        if display.show_obstacles {
            for o in self.network.obstacles() {
                draw(o.vertices(), egui::Stroke::new(border.max(1.0), OBSTACLE_COLOR));
            }
        }
    }

    fn draw_attractors(&self, painter: &egui::Painter, rect: egui::Rect) {
        let display = self.network.display();
        let settings = self.network.settings();

        for a in self.network.attractors() {
            let p = self.world_to_screen(a.pos, rect);

            if display.show_attraction_zones {
                painter.circle_stroke(
                    p,
                    settings.attraction_distance * self.zoom,
                    egui::Stroke::new(1.0, ATTRACTION_ZONE_COLOR),
                );
            }
            if display.show_kill_zones {
                painter.circle_stroke(
                    p,
                    settings.kill_distance * self.zoom,
                    egui::Stroke::new(1.0, KILL_ZONE_COLOR),
                );
            }
            if display.show_influence_lines {
                for &id in &a.influenced_by {
                    if let Some(node) = self.network.nodes().get(id) {
                        let n = self.world_to_screen(node.pos, rect);
                        painter.line_segment([n, p], egui::Stroke::new(1.0, INFLUENCE_COLOR));
                    }
                }
            }
            if display.show_attractors {
                painter.circle_filled(p, 2.0, ATTRACTOR_COLOR);
            }
        }
    }

    /// Branch color, fading thinner segments when opacity blending is on.
    fn branch_color(&self, thickness: f32) -> egui::Color32 {
        let settings = self.network.settings();
        if !settings.enable_opacity_blending {
            return BRANCH_COLOR;
        }
        let t = (thickness / settings.max_thickness).clamp(0.0, 1.0);
        let alpha = (80.0 + 175.0 * t) as u8;
        egui::Color32::from_rgba_unmultiplied(BRANCH_COLOR.r(), BRANCH_COLOR.g(), BRANCH_COLOR.b(), alpha)
    }

    fn draw_nodes(&self, painter: &egui::Painter, rect: egui::Rect) {
        let display = self.network.display();
        let nodes = self.network.nodes();

        if display.show_nodes {
            for (id, node) in nodes.iter().enumerate() {
                let p = self.world_to_screen(node.pos, rect);
                let width = (node.thickness * self.zoom).max(1.0);
                let color = if self.is_new(id) {
                    NEW_NODE_COLOR
                } else {
                    self.branch_color(node.thickness)
                };

                match display.render_mode {
                    RenderMode::Lines => {
                        if let Some(parent) = node.parent {
                            let a = self.world_to_screen(nodes[parent].pos, rect);
                            painter.line_segment([a, p], egui::Stroke::new(width, color));
                        }
                    }
                    RenderMode::Dots => {
                        painter.circle_filled(p, width * 0.5, color);
                    }
                }
            }
        }

        if display.show_tips {
            for id in self.network.tree().tips() {
                let p = self.world_to_screen(nodes[id].pos, rect);
                let r = (nodes[id].thickness * self.zoom).max(1.5);
                painter.circle_filled(p, r, TIP_COLOR);
            }
        }
    }

    /// Builds the central panel where the network is drawn and stepped.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(BACKGROUND))
            .show(ctx, |ui| {
                let response =
                    ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
                let rect = response.rect;
                let painter = ui.painter_at(rect);

                if response.dragged() {
                    self.pan += response.drag_delta();
                }

                // Zoom around the mouse cursor.
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                    let world_before = self.screen_to_world(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                    let screen_after = self.world_to_screen(world_before, rect);
                    self.pan += pointer_screen - screen_after;
                }

                // One step per frame; the pause flag gates it.
                if !self.network.is_paused() {
                    self.step_once();
                }

                self.draw_polygons(&painter, rect);
                self.draw_attractors(&painter, rect);
                self.draw_nodes(&painter, rect);

                if !self.network.is_paused() {
                    ctx.request_repaint();
                }
            });
    }
}

impl App for Viewer {
    /// eframe callback that handles input and builds all panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
