//! Video error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening a playback session
#[derive(Debug, Error)]
pub enum VideoError {
    /// The path does not resolve to an existing regular file
    #[error("{}: {source}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decoder could not open or probe the file
    #[error(transparent)]
    Decoder(#[from] DecoderError),
}

/// Failures reported by a [`MediaDecoder`](super::MediaDecoder)
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("ffmpeg: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),

    #[error("no video stream found in {0}")]
    NoVideoStream(String),

    #[error("decoder has been closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}
