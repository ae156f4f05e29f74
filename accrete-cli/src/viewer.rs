//! Interactive viewer for accrete simulations
//!
//! Draws the x/y plane of the body store with egui and reloads the run
//! configuration whenever the file changes on disk. Drag or WASD pans, the
//! scroll wheel or Q/E zooms.

use crate::camera::{scroll_zoom_factor, Camera};
use crate::{load_run_config, Overrides};
use accrete_core::{RunConfig, Simulation};
use eframe::egui;
use notify::{Event, RecommendedWatcher, Watcher};
use std::sync::mpsc;

/// Screen pixels per second of held pan key
const KEY_PAN_SPEED: f32 = 400.0;

/// Where the camera should jump on the next frame, once the viewport is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
    Bodies,
    Domain,
}

pub struct ViewerApp {
    overrides: Overrides,
    run_config: RunConfig,
    sim: Option<Simulation>,
    last_load_error: Option<String>,
    playing: bool,
    steps_per_frame: f32,
    last_step_ms: f64,
    camera: Camera,
    pending_framing: Option<Framing>,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
}

impl ViewerApp {
    pub fn new(run_config: RunConfig, overrides: Overrides, _cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            // the receiver is gone during shutdown
            let _ = tx.send(res);
        })
        .ok();

        if let (Some(w), Some(path)) = (watcher.as_mut(), overrides.config.as_ref()) {
            if let Err(e) = w.watch(path, notify::RecursiveMode::NonRecursive) {
                eprintln!("Not watching {}: {}", path.display(), e);
            }
        }

        let mut app = Self {
            overrides,
            run_config,
            sim: None,
            last_load_error: None,
            playing: false,
            steps_per_frame: 1.0,
            last_step_ms: 0.0,
            camera: Camera::default(),
            pending_framing: None,
            file_watcher: watcher,
            file_receiver: rx,
        };
        app.reset();
        app
    }

    /// Rebuild the simulation from the current run configuration
    fn reset(&mut self) {
        match Simulation::from_run_config(&self.run_config) {
            Ok(sim) => {
                self.sim = Some(sim);
                self.last_load_error = None;
                self.pending_framing = Some(Framing::Bodies);
            }
            Err(e) => {
                self.last_load_error = Some(e.to_string());
                self.sim = None;
                self.playing = false;
            }
        }
    }

    fn check_file_changes(&mut self) {
        let mut changed = false;
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if let Some(path) = &self.overrides.config {
                        changed |= paths.iter().any(|p| p.ends_with(path) || path.ends_with(p));
                    }
                }
                Ok(_) => {}
                Err(e) => eprintln!("File watcher error: {}", e),
            }
        }
        if !changed {
            return;
        }

        // command-line overrides still win over the edited file
        match load_run_config(&self.overrides) {
            Ok(run_config) => {
                self.run_config = run_config;
                self.reset();
            }
            // keep the running simulation, show why the new file was refused
            Err(e) => self.last_load_error = Some(e.to_string()),
        }
    }

    fn advance(&mut self) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        let started = std::time::Instant::now();
        let steps = self.steps_per_frame.max(1.0).round() as usize;
        for _ in 0..steps {
            if sim.is_finished() {
                self.playing = false;
                break;
            }
            if let Err(e) = sim.step() {
                self.last_load_error = Some(e.to_string());
                self.playing = false;
                break;
            }
        }
        self.last_step_ms = started.elapsed().as_secs_f64() * 1000.0 / steps as f64;
    }

    fn apply_framing(&mut self, viewport: egui::Rect) {
        let (Some(framing), Some(sim)) = (self.pending_framing.take(), self.sim.as_ref()) else {
            return;
        };
        match framing {
            Framing::Bodies => {
                let stats = sim.stats();
                let center = stats.center_of_mass.truncate();
                self.camera
                    .fit(egui::vec2(center.x, center.y), stats.extent, viewport);
            }
            Framing::Domain => self.camera.fit(egui::Vec2::ZERO, sim.config().edge, viewport),
        }
    }

    /// Mouse drag, scroll wheel and WASD/QE keys
    fn handle_camera_input(&mut self, ui: &egui::Ui, response: &egui::Response, viewport: egui::Rect) {
        if response.dragged() {
            self.camera.pan_pixels(response.drag_delta());
        }

        let (scroll, keys, dt) = ui.input(|i| {
            let axis = |pos: egui::Key, neg: egui::Key| {
                (i.key_down(pos) as i32 - i.key_down(neg) as i32) as f32
            };
            let keys = (
                axis(egui::Key::A, egui::Key::D),
                axis(egui::Key::W, egui::Key::S),
                axis(egui::Key::Q, egui::Key::E),
            );
            (i.smooth_scroll_delta.y, keys, i.stable_dt)
        });

        if response.hovered() && scroll != 0.0 {
            let anchor = response.hover_pos().unwrap_or(viewport.center());
            self.camera.zoom_at(anchor, scroll_zoom_factor(scroll), viewport);
        }

        let (pan_x, pan_y, zoom) = keys;
        if pan_x != 0.0 || pan_y != 0.0 {
            // keys move the view like dragging the world the other way
            self.camera
                .pan_pixels(egui::vec2(pan_x, pan_y) * KEY_PAN_SPEED * dt);
        }
        if zoom != 0.0 {
            self.camera
                .zoom_at(viewport.center(), (zoom * 2.0 * dt).exp(), viewport);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }

                if ui.button("⏮ Reset").clicked() {
                    self.reset();
                    self.playing = false;
                }

                if ui.button("⏭ Step").clicked() {
                    if let Some(sim) = self.sim.as_mut() {
                        if let Err(e) = sim.step() {
                            self.last_load_error = Some(e.to_string());
                        }
                    }
                }

                ui.separator();
                ui.label("Steps/frame:");
                ui.add(egui::Slider::new(&mut self.steps_per_frame, 1.0..=20.0));
                ui.separator();

                if ui.button("Fit to bodies").clicked() {
                    self.pending_framing = Some(Framing::Bodies);
                }
                if ui.button("Show domain").clicked() {
                    self.pending_framing = Some(Framing::Domain);
                }
                ui.separator();

                if let Some(sim) = &self.sim {
                    let stats = sim.stats();
                    ui.label(format!(
                        "Step {}  Bodies {}  Mass {:.4}  {:.2} ms/step",
                        sim.current_step, stats.count, stats.total_mass, self.last_step_ms
                    ));
                }
            });
        });

        if let Some(error) = &self.last_load_error {
            egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
                ui.set_max_height(100.0);
                ui.label(egui::RichText::new(format!("Error: {}", error)).color(egui::Color32::RED));
            });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let viewport = ui.max_rect();
                let response = ui.interact(viewport, ui.id().with("canvas"), egui::Sense::drag());

                self.apply_framing(viewport);
                self.handle_camera_input(ui, &response, viewport);

                let Some(sim) = &self.sim else {
                    return;
                };
                let painter = ui.painter_at(viewport);
                let camera = self.camera;

                let edge = sim.config().edge;
                painter.rect_stroke(
                    egui::Rect::from_two_pos(
                        camera.to_screen(egui::vec2(-edge, -edge), viewport),
                        camera.to_screen(egui::vec2(edge, edge), viewport),
                    ),
                    0.0,
                    egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                );

                let store = sim.store();
                for (pos, &radius) in store.positions().iter().zip(store.radii()) {
                    let screen = camera.to_screen(egui::vec2(pos.x, pos.y), viewport);
                    let r = (radius * camera.zoom).max(1.0);
                    if viewport.expand(r).contains(screen) {
                        painter.circle_filled(screen, r, egui::Color32::LIGHT_BLUE);
                    }
                }
            });

        if self.playing {
            self.advance();
            ctx.request_repaint();
        } else if ctx.input(|i| i.pointer.any_down() || !i.keys_down.is_empty()) {
            ctx.request_repaint();
        }
    }
}
