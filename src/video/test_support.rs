//! In-memory decoder driven by a manual clock

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use image::{Rgb, RgbImage};
use tempfile::NamedTempFile;

use super::decoder::{DecodedFrame, FrameFetch, MediaDecoder};
use super::error::DecoderError;
use super::metadata::{AspectRatio, MediaInfo};

/// Shared handle on a scripted decoder's presentation time
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    pub fn set(&self, seconds: f64) {
        self.0.set(seconds);
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }
}

/// Decoder producing solid frames `(index, 100, 200)` at a fixed rate
pub struct ScriptedDecoder {
    info: MediaInfo,
    clock: ManualClock,
    output_size: (u32, u32),
    next_index: u64,
    pulled: RefCell<Vec<u64>>,
    seeks: RefCell<Vec<(f64, bool)>>,
    /// Where the next non-accurate seek lands
    landing: Cell<Option<f64>>,
    fail_next: Cell<bool>,
    paused: bool,
    volume: f32,
    closed: bool,
}

impl ScriptedDecoder {
    pub fn new(fps: f64, frame_count: u64, size: (u32, u32)) -> Self {
        Self {
            info: MediaInfo {
                duration: frame_count as f64 / fps,
                frame_rate: fps,
                frame_count,
                size,
                aspect_ratio: AspectRatio::from_dimensions(size.0, size.1),
            },
            clock: ManualClock::default(),
            output_size: size,
            next_index: 0,
            pulled: RefCell::new(Vec::new()),
            seeks: RefCell::new(Vec::new()),
            landing: Cell::new(None),
            fail_next: Cell::new(false),
            paused: false,
            volume: 1.0,
            closed: false,
        }
    }

    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    /// Indices of every frame handed out, in order
    pub fn pulled(&self) -> Vec<u64> {
        self.pulled.borrow().clone()
    }

    /// Every (target, accurate) seek request
    pub fn seeks(&self) -> Vec<(f64, bool)> {
        self.seeks.borrow().clone()
    }

    pub fn land_seeks_at(&self, seconds: f64) {
        self.landing.set(Some(seconds));
    }

    pub fn fail_next_pull(&self) {
        self.fail_next.set(true);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl MediaDecoder for ScriptedDecoder {
    fn info(&self) -> &MediaInfo {
        &self.info
    }

    fn pull_frame(&mut self) -> Result<FrameFetch, DecoderError> {
        if self.closed {
            return Err(DecoderError::Closed);
        }
        if self.fail_next.replace(false) {
            return Err(DecoderError::Other("scripted failure".to_string()));
        }
        if self.next_index >= self.info.frame_count {
            return Ok(FrameFetch::EndOfStream);
        }

        let index = self.next_index;
        self.next_index += 1;
        self.pulled.borrow_mut().push(index);

        let (w, h) = self.output_size;
        Ok(FrameFetch::Frame(DecodedFrame {
            image: RgbImage::from_pixel(w, h, Rgb([index as u8, 100, 200])),
            pts: index as f64 / self.info.frame_rate,
        }))
    }

    fn seek(&mut self, target: f64, accurate: bool) -> Result<(), DecoderError> {
        self.seeks.borrow_mut().push((target, accurate));
        let landed = if accurate {
            target
        } else {
            self.landing.take().unwrap_or(target)
        };
        self.clock.set(landed);
        self.next_index = (landed * self.info.frame_rate).floor() as u64;
        self.closed = false;
        Ok(())
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_output_size(&mut self, size: (u32, u32)) {
        self.output_size = size;
    }

    fn current_time(&self) -> f64 {
        self.clock.get()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Empty `.mp4` placeholder, removed when dropped
pub fn temp_video() -> NamedTempFile {
    tempfile::Builder::new()
        .prefix("rhythm_backdrop_")
        .suffix(".mp4")
        .tempfile()
        .expect("create temp video")
}
