use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// One metronome run plays this many clicks.
pub const TICKS_PER_RUN: u32 = 8;

pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 240;

/// Seconds between ticks at the given tempo.
pub fn beat_interval(bpm: u32) -> Duration {
    Duration::from_secs_f64(60.0 / bpm as f64)
}

/// Absolute tick deadlines: `start + k * interval`. Each deadline is computed
/// from the start instant, so a slow sink delays at most its own tick and the
/// overrun does not accumulate across the run.
pub fn tick_deadlines(start: Instant, bpm: u32, ticks: u32) -> Vec<Instant> {
    let interval = beat_interval(bpm);
    (0..ticks).map(|k| start + interval * k).collect()
}

/// Drive the sink once per tick, sleeping until each deadline.
pub fn run<F>(bpm: u32, ticks: u32, clip: &[u8], mut sink: F) -> Result<()>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    let start = Instant::now();

    for (i, deadline) in tick_deadlines(start, bpm, ticks).into_iter().enumerate() {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        log::debug!("tick {}/{}", i + 1, ticks);
        sink(clip)?;
    }

    Ok(())
}

/// Default sink: hand the WAV clip to ffplay. When ffplay is not around the
/// metronome still ticks, it just ticks silently.
pub fn play_clip(clip: &[u8]) -> Result<()> {
    let child = Command::new("ffplay")
        .args(["-nodisp", "-autoexit", "-loglevel", "quiet", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    let mut child = match child {
        Ok(child) => child,
        Err(err) => {
            log::warn!("ffplay unavailable ({}), ticking silently", err);
            return Ok(());
        }
    };

    child
        .stdin
        .as_mut()
        .context("ffplay stdin not available")?
        .write_all(clip)
        .context("Failed to write clip to ffplay")?;
    drop(child.stdin.take());
    child.wait().context("Failed to wait for ffplay")?;

    Ok(())
}
