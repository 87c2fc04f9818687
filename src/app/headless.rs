//! Headless playback
//!
//! Drives a backdrop session at a fixed tick rate without a window, the
//! way the game loop would, and optionally saves the final stage.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::video::MediaDecoder;

use super::session::BackdropSession;
use super::state::StageState;

#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Stop after this much wall time even if the video is still playing
    pub max_duration: Option<Duration>,
    /// Write the last stage canvas to this PNG
    pub snapshot: Option<PathBuf>,
}

/// Summary of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub ticks: u64,
    pub frames_drawn: u64,
    pub final_state: StageState,
    pub elapsed: Duration,
}

/// Tick `session` every `interval` until it finishes or the time limit hits
pub fn run<D: MediaDecoder>(
    session: &mut BackdropSession<D>,
    interval: Duration,
    options: &HeadlessOptions,
) -> Result<HeadlessReport> {
    let start = Instant::now();
    let ticks_per_report = (1.0 / interval.as_secs_f64().max(1e-6)).round().max(1.0) as u64;
    let mut ticks = 0u64;
    let mut next_tick = start;

    loop {
        let elapsed = start.elapsed();
        session.tick(elapsed);
        ticks += 1;

        if ticks % ticks_per_report == 0 {
            let data = session.player().get_playback_data();
            info!(
                "[{:>6.2}s] {} | video {:.2}s | frame {} | drawn {}",
                elapsed.as_secs_f64(),
                session.state().display_name(),
                data.time,
                session.player().frame_index(),
                session.frames_drawn()
            );
        }

        if session.state() == StageState::Finished {
            break;
        }
        if options.max_duration.is_some_and(|max| elapsed >= max) {
            debug!("Time limit reached after {} ticks", ticks);
            break;
        }

        next_tick += interval;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            // Fell behind; don't try to replay missed ticks
            next_tick = now;
        }
    }

    if let Some(path) = &options.snapshot {
        session
            .stage()
            .save(path)
            .with_context(|| format!("Failed to save snapshot {}", path.display()))?;
        info!("Saved stage snapshot to {}", path.display());
    }

    let report = HeadlessReport {
        ticks,
        frames_drawn: session.frames_drawn(),
        final_state: session.state(),
        elapsed: start.elapsed(),
    };
    info!(
        "Headless run done: {} ticks, {} frames drawn, state {}",
        report.ticks,
        report.frames_drawn,
        report.final_state.display_name()
    );
    Ok(report)
}
