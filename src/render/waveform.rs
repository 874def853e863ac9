use anyhow::{Context, Result};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use super::text::TextOverlay;
use crate::audio::decode::AudioData;
use crate::config::Theme;

pub const PLOT_WIDTH: u32 = 1000;
pub const PLOT_HEIGHT: u32 = 400;

const MARGIN: u32 = 12;
const DASH_ON: u32 = 6;
const DASH_PERIOD: u32 = 10;

struct Palette {
    background: Rgba<u8>,
    waveform: Rgba<u8>,
    axis: Rgba<u8>,
    onset: Rgba<u8>,
    label: [u8; 4],
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: Rgba([255, 255, 255, 255]),
            waveform: Rgba([70, 130, 180, 255]),
            axis: Rgba([160, 160, 160, 255]),
            onset: Rgba([200, 40, 40, 255]),
            label: [60, 60, 60, 255],
        },
        Theme::Dark => Palette {
            background: Rgba([17, 17, 17, 255]),
            waveform: Rgba([100, 160, 220, 255]),
            axis: Rgba([90, 90, 90, 255]),
            onset: Rgba([255, 90, 90, 255]),
            label: [220, 220, 220, 255],
        },
    }
}

/// Render the waveform with a dashed marker at each onset, PNG-encoded in
/// memory. An empty buffer degrades to a blank plot; this is a display aid
/// and must never be the thing that fails an analysis run.
pub fn render_waveform(
    audio: &AudioData,
    onsets: &[f32],
    theme: Theme,
    overlay: Option<&TextOverlay>,
) -> Result<Vec<u8>> {
    let pal = palette(theme);
    let mut img = RgbaImage::from_pixel(PLOT_WIDTH, PLOT_HEIGHT, pal.background);

    for x in 0..PLOT_WIDTH {
        img.put_pixel(x, PLOT_HEIGHT / 2, pal.axis);
    }

    let n = audio.samples.len();
    if n > 0 {
        draw_envelope(&mut img, &audio.samples, pal.waveform);

        let duration = audio.duration_secs();
        for &t in onsets {
            let x = ((t / duration) * PLOT_WIDTH as f32) as u32;
            if x < PLOT_WIDTH {
                draw_dashed_vline(&mut img, x, pal.onset);
            }
        }
    }

    if let Some(overlay) = overlay {
        overlay.composite(&mut img, "Waveform & note onsets", MARGIN, MARGIN, pal.label);

        if n > 0 {
            let label = format!("{:.1} s", audio.duration_secs());
            let x = PLOT_WIDTH - MARGIN - overlay.measure_width(&label);
            let y = PLOT_HEIGHT - MARGIN - overlay.line_height();
            overlay.composite(&mut img, &label, x, y, pal.label);
        }
    }

    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)
        .context("Failed to encode waveform plot")?;
    Ok(bytes.into_inner())
}

/// Per-column min/max envelope, the usual way to squeeze a full take into a
/// fixed-width strip without aliasing individual samples away.
fn draw_envelope(img: &mut RgbaImage, samples: &[f32], color: Rgba<u8>) {
    let n = samples.len();

    for x in 0..PLOT_WIDTH {
        let s0 = (x as usize * n) / PLOT_WIDTH as usize;
        let s1 = (((x + 1) as usize * n) / PLOT_WIDTH as usize)
            .max(s0 + 1)
            .min(n);
        if s0 >= s1 {
            continue;
        }

        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &s in &samples[s0..s1] {
            lo = lo.min(s);
            hi = hi.max(s);
        }

        let y_top = amplitude_to_y(hi);
        let y_bottom = amplitude_to_y(lo);
        for y in y_top..=y_bottom {
            img.put_pixel(x, y, color);
        }
    }
}

fn amplitude_to_y(amplitude: f32) -> u32 {
    let a = amplitude.clamp(-1.0, 1.0);
    let half = (PLOT_HEIGHT / 2) as f32;
    let y = half - a * (half - MARGIN as f32);
    (y as u32).min(PLOT_HEIGHT - 1)
}

fn draw_dashed_vline(img: &mut RgbaImage, x: u32, color: Rgba<u8>) {
    let mut y = 0;
    while y < PLOT_HEIGHT {
        let end = (y + DASH_ON).min(PLOT_HEIGHT);
        for yy in y..end {
            img.put_pixel(x, yy, color);
        }
        y += DASH_PERIOD;
    }
}
