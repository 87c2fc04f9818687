//! Stage state machine
//!
//! Tracks where the backdrop is in its lifecycle: waiting out the start
//! delay, playing, or finished once the video has ended.

use std::time::Duration;

/// Backdrop stage state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageState {
    /// Start delay has not elapsed; nothing is drawn
    #[default]
    Waiting,
    /// Video is drawn every tick
    Playing,
    /// Video reached its end or was closed
    Finished,
}

impl StageState {
    pub fn display_name(&self) -> &'static str {
        match self {
            StageState::Waiting => "Waiting",
            StageState::Playing => "Playing",
            StageState::Finished => "Finished",
        }
    }

    /// Next state given time since the stage started and whether the
    /// video is still active
    pub fn advance(self, elapsed: Duration, start_delay: Duration, video_active: bool) -> Self {
        match self {
            StageState::Waiting if elapsed >= start_delay => {
                if video_active {
                    StageState::Playing
                } else {
                    StageState::Finished
                }
            }
            StageState::Waiting => StageState::Waiting,
            StageState::Playing if !video_active => StageState::Finished,
            other => other,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, StageState::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(4400);

    #[test]
    fn test_state_names() {
        assert_eq!(StageState::Waiting.display_name(), "Waiting");
        assert_eq!(StageState::Finished.display_name(), "Finished");
    }

    #[test]
    fn test_waiting_until_delay() {
        let state = StageState::Waiting.advance(Duration::from_secs(1), DELAY, true);
        assert_eq!(state, StageState::Waiting);
        assert!(!state.is_drawing());

        let state = state.advance(DELAY, DELAY, true);
        assert_eq!(state, StageState::Playing);
        assert!(state.is_drawing());
    }

    #[test]
    fn test_finishes_when_video_ends() {
        let state = StageState::Playing.advance(Duration::from_secs(10), DELAY, false);
        assert_eq!(state, StageState::Finished);
        // Finished is terminal
        assert_eq!(state.advance(Duration::from_secs(11), DELAY, true), StageState::Finished);
    }

    #[test]
    fn test_closed_video_skips_playing() {
        let state = StageState::Waiting.advance(DELAY, DELAY, false);
        assert_eq!(state, StageState::Finished);
    }
}
