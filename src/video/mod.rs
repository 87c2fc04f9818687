//! Video module
//!
//! Frame-timed background video playback.
//!
//! # Usage
//!
//! ```rust,ignore
//! use video::VideoPlayer;
//!
//! let mut player = VideoPlayer::open("song1.mp4")?;
//! player.set_size((1600, 900));
//! player.set_transparency(26);
//!
//! // Once per render tick
//! player.draw(&mut stage, (0, 0), true);
//! ```

mod clock;
mod decoder;
mod error;
mod metadata;
mod player;
#[cfg(test)]
pub(crate) mod test_support;

pub use decoder::{FfmpegDecoder, MediaDecoder};
pub use error::VideoError;
pub use player::{VideoPlayer, DEFAULT_MAX_CATCH_UP};
