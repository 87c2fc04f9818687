//! Video player module
//!
//! Playback controller for the background video layer. The caller's render
//! loop drives it: each `update` pulls exactly the frames whose display
//! slot the decoder clock has passed, and `draw` composites the latest one
//! with the session transparency.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{debug, error, info};

use super::decoder::{FfmpegDecoder, FrameFetch, MediaDecoder};
use super::error::VideoError;
use super::metadata::{FileData, PlaybackData};
use crate::render::RenderTarget;
use crate::utils::color::with_uniform_alpha;

/// Fully opaque
pub const DEFAULT_TRANSPARENCY: u8 = 255;

/// Frames one `update` call may pull before deferring the rest
pub const DEFAULT_MAX_CATCH_UP: u32 = 8;

/// A single video playback session
pub struct VideoPlayer<D: MediaDecoder = FfmpegDecoder> {
    path: PathBuf,
    decoder: D,
    duration: f64,
    /// Frames pulled since the last restart, adjusted by seeks
    frames: u64,
    /// Seconds each frame is displayed for
    frame_delay: f64,
    /// Display (width, height)
    size: (u32, u32),
    /// Most recent decoded frame
    image: RgbImage,
    transparency: u8,
    active: bool,
    max_catch_up: u32,
}

impl VideoPlayer<FfmpegDecoder> {
    /// Open a video file with the FFmpeg decoder
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        Self::with_decoder(path, FfmpegDecoder::open)
    }
}

impl<D: MediaDecoder> VideoPlayer<D> {
    /// Open a session, building the decoder with `open_decoder` once the
    /// path is known to exist
    pub fn with_decoder<F, E>(path: impl AsRef<Path>, open_decoder: F) -> Result<Self, VideoError>
    where
        F: FnOnce(&Path) -> Result<D, E>,
        E: Into<VideoError>,
    {
        let path = path.as_ref();
        check_file(path)?;

        let decoder = open_decoder(path).map_err(Into::<VideoError>::into)?;
        let info = decoder.info().clone();

        info!(
            "Video session opened: {} ({}x{} @ {:.2}fps, {:.2}s)",
            path.display(),
            info.size.0,
            info.size.1,
            info.frame_rate,
            info.duration
        );

        Ok(Self {
            path: path.to_path_buf(),
            decoder,
            duration: info.duration,
            frames: 0,
            frame_delay: 1.0 / info.frame_rate,
            size: info.size,
            image: RgbImage::new(0, 0),
            transparency: DEFAULT_TRANSPARENCY,
            active: true,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
        })
    }

    /// Static description of the opened file
    pub fn get_file_data(&self) -> FileData {
        let info = self.decoder.info();
        FileData {
            path: self.path.clone(),
            name: self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            duration: info.duration,
            frame_rate: info.frame_rate,
            frame_count: info.frame_count,
            original_size: info.size,
            aspect_ratio: info.aspect_ratio,
        }
    }

    /// Live playback snapshot
    pub fn get_playback_data(&self) -> PlaybackData {
        PlaybackData {
            active: self.active,
            time: self.decoder.current_time(),
            volume: self.decoder.volume(),
            paused: self.decoder.is_paused(),
            size: self.size,
        }
    }

    /// Pull every frame whose display slot the decoder clock has passed
    ///
    /// At most `max_catch_up` frames are pulled per call; any remaining lag
    /// is worked off by later calls, so frames are never skipped unseen.
    /// Returns true if at least one frame was pulled.
    pub fn update(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let mut pulled = 0u32;
        let mut latest = None;
        let mut end_of_stream = false;

        while pulled < self.max_catch_up
            && self.decoder.current_time() > self.frames as f64 * self.frame_delay
        {
            match self.decoder.pull_frame() {
                Ok(FrameFetch::Frame(frame)) => {
                    self.frames += 1;
                    pulled += 1;
                    latest = Some(frame);
                }
                Ok(FrameFetch::EndOfStream) => {
                    self.frames += 1;
                    pulled += 1;
                    end_of_stream = true;
                    break;
                }
                Err(e) => {
                    error!("Decoding {} failed: {}", self.path.display(), e);
                    self.active = false;
                    return pulled > 0;
                }
            }
        }

        if pulled == 0 {
            return false;
        }

        if end_of_stream {
            info!("End of stream: {}", self.path.display());
            self.active = false;
        } else if let Some(frame) = latest {
            self.image = frame.image;
        }
        true
    }

    /// Composite the current frame onto `target` at `pos`
    ///
    /// Draws when a new frame was decoded this call or `force_draw` is set.
    /// Returns whether anything was composited.
    pub fn draw<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        pos: (i64, i64),
        force_draw: bool,
    ) -> bool {
        if !self.active {
            return false;
        }
        if !(self.update() || force_draw) {
            return false;
        }

        let layer = with_uniform_alpha(&self.image, self.transparency);
        target.composite(&layer, pos);
        true
    }

    /// Seek `seek_time` seconds relative to the current position
    ///
    /// Ignored when inactive or when the target would reach past the end.
    pub fn seek(&mut self, seek_time: f64, accurate: bool) {
        let vid_time = self.decoder.current_time();
        if !self.active || vid_time + seek_time >= self.duration {
            return;
        }

        let target = (vid_time + seek_time).max(0.0);
        if let Err(e) = self.decoder.seek(target, accurate) {
            error!("Seek to {:.3}s failed: {}", target, e);
            return;
        }

        // Keep the frame counter on the slot the decoder actually landed in
        let landed = self.decoder.current_time();
        let before = self.frames;
        while self.frames > 0 && self.frames as f64 * self.frame_delay > landed {
            self.frames -= 1;
        }
        while (self.frames + 1) as f64 * self.frame_delay <= landed {
            self.frames += 1;
        }
        debug!(
            "Seek {:+.3}s -> {:.3}s, frame counter {} -> {}",
            seek_time, landed, before, self.frames
        );
    }

    /// Rewind to the start and reactivate
    pub fn restart(&mut self) {
        if let Err(e) = self.decoder.seek(0.0, true) {
            error!("Restart of {} failed: {}", self.path.display(), e);
        }
        self.frames = 0;
        self.active = true;
        info!("Video restarted: {}", self.path.display());
    }

    /// Release the decoder and deactivate
    pub fn close(&mut self) {
        self.decoder.close();
        self.active = false;
    }

    pub fn set_size(&mut self, size: (u32, u32)) {
        self.decoder.set_output_size(size);
        self.size = size;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.decoder.set_volume(volume);
    }

    /// Set transparency, clamped to 0..=255 (0 is fully transparent)
    pub fn set_transparency(&mut self, value: i32) {
        self.transparency = value.clamp(0, 255) as u8;
    }

    pub fn toggle_pause(&mut self) {
        self.decoder.toggle_pause();
    }

    /// Cap on frames pulled per `update`; at least one
    pub fn set_max_catch_up(&mut self, frames: u32) {
        self.max_catch_up = frames.max(1);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn transparency(&self) -> u8 {
        self.transparency
    }

    pub fn frame_index(&self) -> u64 {
        self.frames
    }

    /// Most recently decoded frame
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    #[cfg(test)]
    pub(crate) fn decoder(&self) -> &D {
        &self.decoder
    }
}

/// Resolve `path` to an existing regular file
fn check_file(path: &Path) -> Result<(), VideoError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(VideoError::FileNotFound {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a regular file"),
        }),
        Err(source) => Err(VideoError::FileNotFound {
            path: path.to_path_buf(),
            source,
        }),
    }
}
