//! Backdrop viewer application
//!
//! Implements the egui App trait: composites the background video onto a
//! black stage every frame and exposes the playback controls.

use std::time::Instant;

use egui::{Color32, Key, RichText, Vec2};
use tracing::info;

use crate::utils::color::to_color_image;
use crate::video::FfmpegDecoder;

use super::session::{BackdropSession, SEEK_STEP, TRANSPARENCY_STEP};
use super::state::StageState;

pub struct BackdropApp {
    /// None when the video could not be opened
    session: Option<BackdropSession<FfmpegDecoder>>,
    /// Why the session is missing
    load_error: Option<String>,
    /// Stage start, the reference for the start delay
    started_at: Instant,
    stage_texture: Option<egui::TextureHandle>,

    /// Slider mirrors
    transparency: i32,
    volume: f32,
}

impl BackdropApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        session: Result<BackdropSession<FfmpegDecoder>, String>,
        transparency: i32,
        volume: f32,
    ) -> Self {
        let (session, load_error) = match session {
            Ok(session) => (Some(session), None),
            Err(e) => (None, Some(e)),
        };

        Self {
            session,
            load_error,
            started_at: Instant::now(),
            stage_texture: None,
            transparency: transparency.clamp(0, 255),
            volume,
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let (space, restart, left, right, up, down) = ctx.input(|i| {
            (
                i.key_pressed(Key::Space),
                i.key_pressed(Key::R),
                i.key_pressed(Key::ArrowLeft),
                i.key_pressed(Key::ArrowRight),
                i.key_pressed(Key::ArrowUp),
                i.key_pressed(Key::ArrowDown),
            )
        });

        if space {
            session.toggle_pause();
        }
        if restart {
            session.restart();
            info!("Restarted from keyboard");
        }
        if left {
            session.seek(-SEEK_STEP);
        }
        if right {
            session.seek(SEEK_STEP);
        }
        if up {
            session.adjust_transparency(TRANSPARENCY_STEP);
        }
        if down {
            session.adjust_transparency(-TRANSPARENCY_STEP);
        }
        if up || down {
            self.transparency = i32::from(session.player().transparency());
        }
    }

    /// Tick the session and upload the stage if it changed
    fn render_stage(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let redrawn = session.tick(self.started_at.elapsed());
        if !redrawn && self.stage_texture.is_some() {
            return;
        }

        let image = to_color_image(session.stage());
        if let Some(ref mut texture) = self.stage_texture {
            texture.set(image, egui::TextureOptions::LINEAR);
        } else {
            self.stage_texture =
                Some(ctx.load_texture("stage", image, egui::TextureOptions::LINEAR));
        }
    }

    fn info_panel(&self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        let file = session.player().get_file_data();
        let playback = session.player().get_playback_data();

        ui.heading("File");
        egui::Grid::new("file_data").striped(true).show(ui, |ui| {
            ui.label("Name");
            ui.label(file.name.as_str());
            ui.end_row();
            ui.label("Duration");
            ui.label(format!("{:.2}s", file.duration));
            ui.end_row();
            ui.label("Frame rate");
            ui.label(format!("{:.2}", file.frame_rate));
            ui.end_row();
            ui.label("Frames");
            ui.label(file.frame_count.to_string());
            ui.end_row();
            ui.label("Size");
            ui.label(format!("{}x{} ({})", file.original_size.0, file.original_size.1, file.aspect_ratio));
            ui.end_row();
        });

        ui.separator();
        ui.heading("Playback");
        egui::Grid::new("playback_data").striped(true).show(ui, |ui| {
            ui.label("Stage");
            ui.label(session.state().display_name());
            ui.end_row();
            ui.label("Active");
            ui.label(playback.active.to_string());
            ui.end_row();
            ui.label("Time");
            ui.label(format!("{:.2}s", playback.time));
            ui.end_row();
            ui.label("Frame");
            ui.label(session.player().frame_index().to_string());
            ui.end_row();
            ui.label("Paused");
            ui.label(playback.paused.to_string());
            ui.end_row();
            ui.label("Volume");
            ui.label(format!("{:.2}", playback.volume));
            ui.end_row();
            ui.label("Display");
            ui.label(format!("{}x{}", playback.size.0, playback.size.1));
            ui.end_row();
        });
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        ui.horizontal(|ui| {
            let paused = session.player().get_playback_data().paused;
            if ui.button(if paused { "Play" } else { "Pause" }).clicked() {
                session.toggle_pause();
            }
            if ui.button("Restart").clicked() {
                session.restart();
            }
            if ui.button(format!("-{SEEK_STEP}s")).clicked() {
                session.seek(-SEEK_STEP);
            }
            if ui.button(format!("+{SEEK_STEP}s")).clicked() {
                session.seek(SEEK_STEP);
            }
            if ui.button("Close").clicked() {
                session.close();
            }
        });

        ui.horizontal(|ui| {
            if ui
                .add(egui::Slider::new(&mut self.transparency, 0..=255).text("Transparency"))
                .changed()
            {
                session.set_transparency(self.transparency);
            }
            if ui
                .add(egui::Slider::new(&mut self.volume, 0.0..=1.0).text("Volume"))
                .changed()
            {
                session.set_volume(self.volume);
            }
        });

        if session.state() == StageState::Finished {
            ui.label(RichText::new("Video finished").color(Color32::YELLOW));
        }
    }
}

impl eframe::App for BackdropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.render_stage(ctx);

        egui::SidePanel::right("info").min_width(220.0).show(ctx, |ui| {
            self.info_panel(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref error) = self.load_error {
                ui.label(RichText::new(format!("Background video unavailable: {error}")).color(Color32::RED));
                return;
            }

            self.controls(ui);
            ui.separator();

            if let Some(ref texture) = self.stage_texture {
                // Fit the stage into the remaining space, keeping its aspect
                let [w, h] = texture.size();
                let available = ui.available_size();
                let scale = (available.x / w as f32).min(available.y / h as f32).min(1.0);
                let size = Vec2::new(w as f32 * scale, h as f32 * scale);
                ui.vertical_centered(|ui| {
                    ui.image(egui::ImageSource::Texture(egui::load::SizedTexture::new(
                        texture.id(),
                        size,
                    )));
                });
            }
        });

        let finished = self
            .session
            .as_ref()
            .map_or(true, |s| s.state() == StageState::Finished);
        if !finished {
            ctx.request_repaint();
        }
    }
}
