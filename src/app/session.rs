//! Backdrop session
//!
//! Owns the video player and the stage canvas it is composited onto, and
//! applies the delayed-start behaviour of the in-game background layer.

use std::time::Duration;

use image::{Rgba, RgbaImage};
use tracing::info;

use crate::config::BackdropConfig;
use crate::video::{MediaDecoder, VideoPlayer};

use super::state::StageState;

const STAGE_BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Seek step for interactive controls, in seconds
pub const SEEK_STEP: f64 = 5.0;

/// Transparency step for interactive controls
pub const TRANSPARENCY_STEP: i32 = 16;

pub struct BackdropSession<D: MediaDecoder> {
    player: VideoPlayer<D>,
    stage: RgbaImage,
    state: StageState,
    start_delay: Duration,
    /// Ticks on which a frame was composited
    frames_drawn: u64,
}

impl<D: MediaDecoder> BackdropSession<D> {
    /// Configure `player` for the stage and hold it until the start delay
    pub fn new(mut player: VideoPlayer<D>, config: &BackdropConfig) -> Self {
        let (width, height) = config.stage_size();

        player.set_size((width, height));
        player.set_transparency(config.layer.transparency);
        player.set_volume(config.layer.volume);
        player.set_max_catch_up(config.timing.max_catch_up);
        if config.timing.start_paused && !player.get_playback_data().paused {
            player.toggle_pause();
        }

        Self {
            player,
            stage: RgbaImage::from_pixel(width, height, STAGE_BACKGROUND),
            state: StageState::Waiting,
            start_delay: config.start_delay(),
            frames_drawn: 0,
        }
    }

    /// Advance one render tick; `elapsed` is time since the stage started
    ///
    /// Returns true when the stage canvas was redrawn.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let previous = self.state;
        self.state = self
            .state
            .advance(elapsed, self.start_delay, self.player.is_active());

        if previous == StageState::Waiting && self.state == StageState::Playing {
            if self.player.get_playback_data().paused {
                self.player.toggle_pause();
            }
            info!("Backdrop started after {:.2}s", elapsed.as_secs_f64());
        }

        if !self.state.is_drawing() {
            return false;
        }

        clear(&mut self.stage);
        let drew = self.player.draw(&mut self.stage, (0, 0), true);
        if drew {
            self.frames_drawn += 1;
        }

        if !self.player.is_active() {
            self.state = StageState::Finished;
            info!("Backdrop finished after {} drawn frames", self.frames_drawn);
        }
        drew
    }

    pub fn toggle_pause(&mut self) {
        self.player.toggle_pause();
    }

    /// Restart the video from the beginning and resume drawing
    pub fn restart(&mut self) {
        self.player.restart();
        if self.player.get_playback_data().paused {
            self.player.toggle_pause();
        }
        self.state = StageState::Playing;
    }

    pub fn seek(&mut self, seconds: f64) {
        self.player.seek(seconds, false);
    }

    pub fn adjust_transparency(&mut self, delta: i32) {
        let value = i32::from(self.player.transparency()) + delta;
        self.player.set_transparency(value);
    }

    pub fn set_transparency(&mut self, value: i32) {
        self.player.set_transparency(value);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.player.set_volume(volume);
    }

    /// Close the video; the stage finishes on the next tick
    pub fn close(&mut self) {
        self.player.close();
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn stage(&self) -> &RgbaImage {
        &self.stage
    }

    pub fn player(&self) -> &VideoPlayer<D> {
        &self.player
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
}

fn clear(stage: &mut RgbaImage) {
    for pixel in stage.pixels_mut() {
        *pixel = STAGE_BACKGROUND;
    }
}
