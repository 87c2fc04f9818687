//! Video decoder module
//!
//! Defines the narrow decoder capability the playback controller drives,
//! and its FFmpeg-backed implementation.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::{debug, info};

use ffmpeg_next as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::format::Pixel;
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{Context as Scaler, Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use super::clock::PlaybackClock;
use super::error::DecoderError;
use super::metadata::{AspectRatio, MediaInfo};

/// Frame rate assumed when the container does not report one
const DEFAULT_FPS: f64 = 30.0;

/// FFmpeg's internal time base (microseconds)
const AV_TIME_BASE: f64 = 1_000_000.0;

/// A frame converted to packed RGB
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub image: RgbImage,
    /// Presentation timestamp in seconds
    pub pts: f64,
}

/// Outcome of a single frame pull
#[derive(Debug)]
pub enum FrameFetch {
    Frame(DecodedFrame),
    EndOfStream,
}

/// Decoder capability consumed by [`VideoPlayer`](super::VideoPlayer)
///
/// Implementations own their own buffering and clock; the controller only
/// polls. Any concrete decoding library can sit behind this trait.
pub trait MediaDecoder {
    /// Metadata probed when the stream was opened
    fn info(&self) -> &MediaInfo;

    /// Decode the next frame in presentation order
    fn pull_frame(&mut self) -> Result<FrameFetch, DecoderError>;

    /// Jump to `target` seconds. Non-accurate seeks may land on the
    /// preceding keyframe; `current_time` reports where it landed.
    fn seek(&mut self, target: f64, accurate: bool) -> Result<(), DecoderError>;

    fn toggle_pause(&mut self);

    fn is_paused(&self) -> bool;

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// Size of frames produced by subsequent pulls
    fn set_output_size(&mut self, size: (u32, u32));

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Release decoding resources
    ///
    /// Playback time freezes until the next seek reopens the stream.
    /// `is_paused` keeps reporting the user's pause state.
    fn close(&mut self);
}

/// Demuxer, codec and scaler for one open file
struct OpenStream {
    input_ctx: ffmpeg::format::context::Input,
    video_stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    /// Seconds per timestamp tick of the video stream
    time_base: f64,
    scaler: Option<Scaler>,
    /// (width, height) the current scaler outputs
    scaler_output: (u32, u32),
    packet_iter_exhausted: bool,
}

impl OpenStream {
    fn open(path: &Path) -> Result<(Self, MediaInfo), DecoderError> {
        // Safe to call multiple times
        ffmpeg::init()?;

        let input_ctx = input(&path)?;

        let video_stream = input_ctx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| DecoderError::NoVideoStream(path.display().to_string()))?;

        let video_stream_index = video_stream.index();

        let rate = video_stream.rate();
        let fps = if rate.0 > 0 && rate.1 > 0 {
            f64::from(rate.0) / f64::from(rate.1)
        } else {
            DEFAULT_FPS
        };

        let time_base = f64::from(video_stream.time_base());
        let duration = if video_stream.duration() > 0 {
            video_stream.duration() as f64 * time_base
        } else if input_ctx.duration() > 0 {
            input_ctx.duration() as f64 / AV_TIME_BASE
        } else {
            0.0
        };

        let frame_count = if video_stream.frames() > 0 {
            video_stream.frames() as u64
        } else {
            (duration * fps).round() as u64
        };

        let context_decoder =
            ffmpeg::codec::context::Context::from_parameters(video_stream.parameters())?;
        let decoder = context_decoder.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let sar = decoder.aspect_ratio();

        let info = MediaInfo {
            duration,
            frame_rate: fps,
            frame_count,
            size: (width, height),
            aspect_ratio: AspectRatio::from_sample_aspect(width, height, sar.0, sar.1),
        };

        info!(
            "Opened video: {}x{} @ {:.2}fps, {:.2}s, {} frames, format: {:?}",
            width,
            height,
            fps,
            duration,
            frame_count,
            decoder.format()
        );

        Ok((
            Self {
                input_ctx,
                video_stream_index,
                decoder,
                time_base,
                scaler: None,
                scaler_output: (0, 0),
                packet_iter_exhausted: false,
            },
            info,
        ))
    }

    /// Decode the next raw frame, None at end of stream
    fn next_frame(&mut self) -> Option<VideoFrame> {
        // Try to receive already decoded frames first
        let mut decoded = VideoFrame::empty();
        if self.decoder.receive_frame(&mut decoded).is_ok() {
            return Some(decoded);
        }

        if self.packet_iter_exhausted {
            return None;
        }

        loop {
            match self.input_ctx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.video_stream_index {
                        continue;
                    }

                    if let Err(e) = self.decoder.send_packet(&packet) {
                        debug!("Dropping undecodable packet: {}", e);
                        continue;
                    }

                    if self.decoder.receive_frame(&mut decoded).is_ok() {
                        return Some(decoded);
                    }
                }
                None => {
                    // End of stream, flush decoder
                    self.packet_iter_exhausted = true;
                    let _ = self.decoder.send_eof();

                    if self.decoder.receive_frame(&mut decoded).is_ok() {
                        return Some(decoded);
                    }
                    return None;
                }
            }
        }
    }

    fn frame_pts(&self, frame: &VideoFrame) -> Option<f64> {
        frame
            .timestamp()
            .or_else(|| frame.pts())
            .map(|ts| ts as f64 * self.time_base)
    }

    /// Convert a decoded frame to packed RGB24 at `output` size
    fn convert_frame(
        &mut self,
        decoded: &VideoFrame,
        output: (u32, u32),
    ) -> Result<RgbImage, DecoderError> {
        if self.scaler.is_none() || self.scaler_output != output {
            let scaler = Scaler::get(
                decoded.format(),
                decoded.width(),
                decoded.height(),
                Pixel::RGB24,
                output.0,
                output.1,
                Flags::BILINEAR,
            )?;
            self.scaler = Some(scaler);
            self.scaler_output = output;
        }

        let mut rgb_frame = VideoFrame::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.run(decoded, &mut rgb_frame)?;
        }

        let data = rgb_frame.data(0);
        let stride = rgb_frame.stride(0);
        let (width, height) = (output.0 as usize, output.1 as usize);

        // Packed rows can be used directly, padded rows need copying
        let pixels = if stride == width * 3 {
            data[..width * height * 3].to_vec()
        } else {
            let mut pixels = Vec::with_capacity(width * height * 3);
            for y in 0..height {
                let row_start = y * stride;
                pixels.extend_from_slice(&data[row_start..row_start + width * 3]);
            }
            pixels
        };

        RgbImage::from_raw(output.0, output.1, pixels)
            .ok_or_else(|| DecoderError::Other("RGB buffer size mismatch".to_string()))
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), DecoderError> {
        let ts = (seconds.max(0.0) * AV_TIME_BASE) as i64;
        self.input_ctx.seek(ts, ..ts)?;
        self.decoder.flush();
        self.packet_iter_exhausted = false;
        Ok(())
    }
}

/// FFmpeg-backed decoder with a wall-clock presentation time
pub struct FfmpegDecoder {
    path: PathBuf,
    stream: Option<OpenStream>,
    info: MediaInfo,
    output_size: (u32, u32),
    clock: PlaybackClock,
    volume: f32,
    /// Timestamp of the last frame handed out
    last_pts: Option<f64>,
    /// Frame decoded while seeking, returned by the next pull
    pending: Option<DecodedFrame>,
}

impl FfmpegDecoder {
    /// Open a video file for decoding; the clock starts immediately
    pub fn open(path: &Path) -> Result<Self, DecoderError> {
        if !path.exists() {
            return Err(DecoderError::Other(format!(
                "Video file not found: {}",
                path.display()
            )));
        }

        let (stream, info) = OpenStream::open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            stream: Some(stream),
            output_size: info.size,
            info,
            clock: PlaybackClock::started(),
            volume: 1.0,
            last_pts: None,
            pending: None,
        })
    }

    fn ensure_open(&mut self) -> Result<&mut OpenStream, DecoderError> {
        if self.stream.is_none() {
            info!("Reopening {}", self.path.display());
            let (stream, _) = OpenStream::open(&self.path)?;
            self.stream = Some(stream);
            self.clock.resume();
        }
        self.stream.as_mut().ok_or(DecoderError::Closed)
    }

    fn fallback_pts(&self) -> f64 {
        self.last_pts
            .map(|pts| pts + 1.0 / self.info.frame_rate)
            .unwrap_or(0.0)
    }
}

impl MediaDecoder for FfmpegDecoder {
    fn info(&self) -> &MediaInfo {
        &self.info
    }

    fn pull_frame(&mut self) -> Result<FrameFetch, DecoderError> {
        if let Some(frame) = self.pending.take() {
            self.last_pts = Some(frame.pts);
            return Ok(FrameFetch::Frame(frame));
        }

        let fallback = self.fallback_pts();
        let output = self.output_size;
        let stream = self.stream.as_mut().ok_or(DecoderError::Closed)?;

        let Some(raw) = stream.next_frame() else {
            return Ok(FrameFetch::EndOfStream);
        };
        let pts = stream.frame_pts(&raw).unwrap_or(fallback);
        let image = stream.convert_frame(&raw, output)?;

        self.last_pts = Some(pts);
        Ok(FrameFetch::Frame(DecodedFrame { image, pts }))
    }

    fn seek(&mut self, target: f64, accurate: bool) -> Result<(), DecoderError> {
        let target = target.max(0.0);
        let half_frame = 0.5 / self.info.frame_rate;
        let output = self.output_size;
        let stream = self.ensure_open()?;

        stream.seek_to(target)?;

        // Decode forward to the first frame at or after the target for
        // accurate seeks; otherwise take whatever the keyframe yields
        let mut landed = None;
        while let Some(raw) = stream.next_frame() {
            let pts = stream.frame_pts(&raw).unwrap_or(target);
            if accurate && pts + half_frame < target {
                continue;
            }
            let image = stream.convert_frame(&raw, output)?;
            landed = Some(DecodedFrame { image, pts });
            break;
        }

        let position = match &landed {
            Some(frame) if !accurate => frame.pts,
            _ => target,
        };
        debug!(
            "Seek to {:.3}s (accurate: {}) landed at {:.3}s",
            target, accurate, position
        );

        self.pending = landed;
        self.last_pts = None;
        self.clock.set_position(position);
        Ok(())
    }

    fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    fn set_volume(&mut self, volume: f32) {
        debug!("Volume set to {}", volume);
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_output_size(&mut self, size: (u32, u32)) {
        self.output_size = size;
    }

    fn current_time(&self) -> f64 {
        self.clock.position()
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            info!("Closed {}", self.path.display());
            self.pending = None;
            self.clock.suspend();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_nonexistent() {
        let result = FfmpegDecoder::open(Path::new("nonexistent.mp4"));
        assert!(result.is_err());
    }
}
