//! Playback clock
//!
//! Wall-clock presentation time for a decoder: runs from the moment it is
//! started, freezes while paused or suspended and jumps on seek.
//!
//! Pausing is the user's toggle. Suspending is internal (the stream is
//! closed) and does not show up in `is_paused`.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Position accumulated before the current run segment
    base: Duration,
    /// Start of the current run segment, None while frozen
    running_since: Option<Instant>,
    paused: bool,
    suspended: bool,
}

impl PlaybackClock {
    /// Create a clock at position 0 that is already running
    pub fn started() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(now: Instant) -> Self {
        Self {
            base: Duration::ZERO,
            running_since: Some(now),
            paused: false,
            suspended: false,
        }
    }

    /// Current position in seconds
    pub fn position(&self) -> f64 {
        self.position_at(Instant::now())
    }

    pub fn position_at(&self, now: Instant) -> f64 {
        let running = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        (self.base + running).as_secs_f64()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn toggle_pause(&mut self) {
        self.toggle_pause_at(Instant::now());
    }

    pub fn toggle_pause_at(&mut self, now: Instant) {
        self.paused = !self.paused;
        self.sync(now);
    }

    /// Freeze without touching the pause state
    pub fn suspend(&mut self) {
        self.suspend_at(Instant::now());
    }

    pub fn suspend_at(&mut self, now: Instant) {
        self.suspended = true;
        self.sync(now);
    }

    /// Undo [`suspend`](Self::suspend); stays frozen if paused
    pub fn resume(&mut self) {
        self.resume_at(Instant::now());
    }

    pub fn resume_at(&mut self, now: Instant) {
        self.suspended = false;
        self.sync(now);
    }

    fn sync(&mut self, now: Instant) {
        let run = !self.paused && !self.suspended;
        match (self.running_since, run) {
            (Some(since), false) => {
                self.base += now.saturating_duration_since(since);
                self.running_since = None;
            }
            (None, true) => self.running_since = Some(now),
            _ => {}
        }
    }

    /// Jump to `seconds`, keeping the pause state
    pub fn set_position(&mut self, seconds: f64) {
        self.set_position_at(seconds, Instant::now());
    }

    pub fn set_position_at(&mut self, seconds: f64, now: Instant) {
        self.base = Duration::from_secs_f64(seconds.max(0.0));
        if self.running_since.is_some() {
            self.running_since = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_clock_runs() {
        let t0 = Instant::now();
        let clock = PlaybackClock::started_at(t0);
        assert!(approx(clock.position_at(t0), 0.0));
        assert!(approx(clock.position_at(t0 + Duration::from_millis(1500)), 1.5));
    }

    #[test]
    fn test_clock_pause_freezes() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::started_at(t0);
        clock.toggle_pause_at(t0 + Duration::from_secs(2));
        assert!(clock.is_paused());
        assert!(approx(clock.position_at(t0 + Duration::from_secs(10)), 2.0));

        clock.toggle_pause_at(t0 + Duration::from_secs(10));
        assert!(!clock.is_paused());
        assert!(approx(clock.position_at(t0 + Duration::from_secs(11)), 3.0));
    }

    #[test]
    fn test_clock_seek_keeps_pause_state() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::started_at(t0);
        clock.toggle_pause_at(t0);
        clock.set_position_at(4.0, t0 + Duration::from_secs(1));
        assert!(clock.is_paused());
        assert!(approx(clock.position_at(t0 + Duration::from_secs(5)), 4.0));

        clock.toggle_pause_at(t0 + Duration::from_secs(5));
        clock.set_position_at(1.0, t0 + Duration::from_secs(6));
        assert!(approx(clock.position_at(t0 + Duration::from_secs(7)), 2.0));
    }

    #[test]
    fn test_suspend_is_not_a_pause() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::started_at(t0);
        clock.suspend_at(t0 + Duration::from_secs(1));
        assert!(!clock.is_paused());
        assert!(clock.is_suspended());
        assert!(approx(clock.position_at(t0 + Duration::from_secs(9)), 1.0));

        clock.resume_at(t0 + Duration::from_secs(9));
        assert!(approx(clock.position_at(t0 + Duration::from_secs(10)), 2.0));
    }

    #[test]
    fn test_pause_while_suspended_holds_after_resume() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::started_at(t0);
        clock.suspend_at(t0 + Duration::from_secs(1));
        clock.toggle_pause_at(t0 + Duration::from_secs(2));
        assert!(clock.is_paused());

        clock.resume_at(t0 + Duration::from_secs(3));
        assert!(approx(clock.position_at(t0 + Duration::from_secs(8)), 1.0));

        clock.toggle_pause_at(t0 + Duration::from_secs(8));
        assert!(approx(clock.position_at(t0 + Duration::from_secs(9)), 2.0));
    }

    #[test]
    fn test_negative_seek_clamps() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::started_at(t0);
        clock.set_position_at(-3.0, t0);
        assert!(approx(clock.position_at(t0), 0.0));
    }
}
