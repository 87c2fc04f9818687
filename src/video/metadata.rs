//! Media metadata and playback snapshots

use std::fmt;
use std::path::PathBuf;

/// Reduced display aspect ratio, e.g. 16:9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub num: u32,
    pub den: u32,
}

impl AspectRatio {
    /// Build a reduced ratio from a width/height pair
    ///
    /// Zero components fall back to 1:1.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self { num: 1, den: 1 };
        }
        let g = gcd(width, height);
        Self {
            num: width / g,
            den: height / g,
        }
    }

    /// Display aspect ratio of a frame with non-square samples
    pub fn from_sample_aspect(width: u32, height: u32, sar_num: i32, sar_den: i32) -> Self {
        if sar_num <= 0 || sar_den <= 0 {
            return Self::from_dimensions(width, height);
        }
        let w = u64::from(width) * sar_num as u64;
        let h = u64::from(height) * sar_den as u64;
        let g = gcd_u64(w, h).max(1);
        Self {
            num: (w / g) as u32,
            den: (h / g) as u32,
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn gcd_u64(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd_u64(b, a % b) }
}

/// Stream metadata exposed by a decoder, read once at open
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Frames per second
    pub frame_rate: f64,
    pub frame_count: u64,
    /// Native (width, height) in pixels
    pub size: (u32, u32),
    pub aspect_ratio: AspectRatio,
}

/// File-level description of a playback session
#[derive(Debug, Clone, PartialEq)]
pub struct FileData {
    pub path: PathBuf,
    /// File stem, used as the display name
    pub name: String,
    pub duration: f64,
    pub frame_rate: f64,
    pub frame_count: u64,
    pub original_size: (u32, u32),
    pub aspect_ratio: AspectRatio,
}

/// Live playback snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackData {
    pub active: bool,
    /// Decoder-reported playback time in seconds
    pub time: f64,
    pub volume: f32,
    pub paused: bool,
    /// Display (width, height)
    pub size: (u32, u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_reduces() {
        let ratio = AspectRatio::from_dimensions(1920, 1080);
        assert_eq!(ratio, AspectRatio { num: 16, den: 9 });
        assert_eq!(ratio.to_string(), "16:9");
    }

    #[test]
    fn test_aspect_ratio_degenerate() {
        assert_eq!(AspectRatio::from_dimensions(0, 480).to_string(), "1:1");
    }

    #[test]
    fn test_sample_aspect_ratio() {
        // 720x576 PAL with 16:15 samples displays as 4:3
        let ratio = AspectRatio::from_sample_aspect(720, 576, 16, 15);
        assert_eq!(ratio.to_string(), "4:3");

        // Unknown SAR falls back to square pixels
        let ratio = AspectRatio::from_sample_aspect(640, 480, 0, 1);
        assert_eq!(ratio.to_string(), "4:3");
    }
}
