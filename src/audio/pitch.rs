use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use super::decode::AudioData;

/// A2..A4, the two-octave band a brass student's exercises live in.
pub const DEFAULT_MIN_HZ: f32 = 110.0;
pub const DEFAULT_MAX_HZ: f32 = 440.0;

const WINDOW_SIZE: usize = 2048;
const HOP_SIZE: usize = 512;

/// Frames whose best normalized-difference minimum stays above this are
/// treated as unvoiced.
const VOICING_THRESHOLD: f32 = 0.2;

/// Per-frame pitch estimates in Hz; `None` marks an unvoiced frame.
pub struct PitchAnalysis {
    pub track: Vec<Option<f32>>,
    /// `None` when no frame carried a usable pitch, a normal outcome for
    /// silent or noisy takes.
    pub summary: Option<PitchSummary>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PitchSummary {
    pub mean_hz: f32,
    pub std_dev_hz: f32,
    pub stability: f32,
}

/// 0-100, rewarding low pitch variance. Two tenths of a Hz of drift costs
/// the full score.
pub fn stability_score(std_dev_hz: f32) -> f32 {
    (100.0 - std_dev_hz * 500.0).clamp(0.0, 100.0)
}

pub fn analyze_pitch(audio: &AudioData, min_hz: f32, max_hz: f32) -> PitchAnalysis {
    let samples = &audio.samples;
    let sr = audio.sample_rate as f32;

    if samples.len() < WINDOW_SIZE {
        return PitchAnalysis {
            track: Vec::new(),
            summary: None,
        };
    }

    let num_frames = (samples.len() - WINDOW_SIZE) / HOP_SIZE + 1;

    let pb = ProgressBar::new(num_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames")
            .unwrap()
            .progress_chars("=>-"),
    );

    let track: Vec<Option<f32>> = (0..num_frames)
        .into_par_iter()
        .map(|i| {
            let start = i * HOP_SIZE;
            let est = estimate_frame(&samples[start..start + WINDOW_SIZE], sr, min_hz, max_hz);
            pb.inc(1);
            est
        })
        .collect();

    pb.finish_and_clear();

    let summary = summarize(&track);
    if let Some(ref s) = summary {
        log::info!(
            "Pitch: mean={:.2}Hz, stddev={:.4}Hz, stability={:.1}/100 ({} voiced of {} frames)",
            s.mean_hz,
            s.std_dev_hz,
            s.stability,
            track.iter().filter(|f| f.is_some()).count(),
            track.len()
        );
    }

    PitchAnalysis { track, summary }
}

/// Single-frame YIN estimate constrained to [min_hz, max_hz].
///
/// The lag scan starts at 2 rather than at the band's shortest lag: finding
/// the true fundamental first and band-filtering after keeps sub-harmonics of
/// out-of-band tones from aliasing into the band.
fn estimate_frame(frame: &[f32], sample_rate: f32, min_hz: f32, max_hz: f32) -> Option<f32> {
    let max_lag = (sample_rate / min_hz).ceil() as usize;
    let half = frame.len() / 2;

    if max_lag >= half {
        return None;
    }

    let diff = difference_function(frame, max_lag);
    let cmnd = cumulative_mean_normalized(&diff);

    // First local minimum under the voicing threshold is the period.
    let mut best = None;
    for tau in 2..=max_lag {
        if cmnd[tau] < VOICING_THRESHOLD && cmnd[tau] <= cmnd[tau - 1] && cmnd[tau] <= cmnd[tau + 1]
        {
            best = Some(tau);
            break;
        }
    }
    let tau = best?;

    let refined = parabolic_interpolation(&cmnd, tau);
    let freq = sample_rate / refined;
    if freq < min_hz || freq > max_hz {
        return None;
    }
    Some(freq)
}

/// Squared difference of the frame against itself shifted by each lag,
/// integrated over the front half of the window.
fn difference_function(frame: &[f32], max_lag: usize) -> Vec<f32> {
    let w = frame.len() / 2;
    let mut diff = vec![0.0f32; max_lag + 2];

    for (tau, d) in diff.iter_mut().enumerate().skip(1) {
        let mut sum = 0.0f32;
        for j in 0..w {
            let delta = frame[j] - frame[j + tau];
            sum += delta * delta;
        }
        *d = sum;
    }

    diff
}

fn cumulative_mean_normalized(diff: &[f32]) -> Vec<f32> {
    let mut cmnd = vec![1.0f32; diff.len()];

    let mut running_sum = 0.0f32;
    for tau in 1..diff.len() {
        running_sum += diff[tau];
        if running_sum > 0.0 {
            cmnd[tau] = diff[tau] * tau as f32 / running_sum;
        }
    }

    cmnd
}

fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmnd.len() {
        return tau as f32;
    }

    let y0 = cmnd[tau - 1];
    let y1 = cmnd[tau];
    let y2 = cmnd[tau + 1];

    let a = (y2 - 2.0 * y1 + y0) / 2.0;
    let b = (y2 - y0) / 2.0;

    if a.abs() < f32::EPSILON {
        return tau as f32;
    }

    (tau as f32 - b / (2.0 * a)).max(1.0)
}

fn summarize(track: &[Option<f32>]) -> Option<PitchSummary> {
    let voiced: Vec<f32> = track.iter().filter_map(|&f| f).collect();
    if voiced.is_empty() {
        return None;
    }

    let n = voiced.len() as f32;
    let mean = voiced.iter().sum::<f32>() / n;
    let variance = voiced.iter().map(|f| (f - mean).powi(2)).sum::<f32>() / n;
    let std_dev = variance.sqrt();

    Some(PitchSummary {
        mean_hz: mean,
        std_dev_hz: std_dev,
        stability: stability_score(std_dev),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_audio(frequency: f32, sample_rate: u32, duration: f32) -> AudioData {
        let num_samples = (sample_rate as f32 * duration) as usize;
        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * PI * frequency * t).sin()
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn tracks_a_steady_220hz_tone() {
        let audio = sine_audio(220.0, 44100, 1.0);
        let analysis = analyze_pitch(&audio, DEFAULT_MIN_HZ, DEFAULT_MAX_HZ);

        let summary = analysis.summary.expect("tone should be voiced");
        assert!(
            (summary.mean_hz - 220.0).abs() < 2.0,
            "mean {} too far from 220",
            summary.mean_hz
        );
        assert!(summary.stability > 80.0);
    }

    #[test]
    fn track_has_one_entry_per_frame() {
        let audio = sine_audio(220.0, 44100, 1.0);
        let expected = (audio.samples.len() - 2048) / 512 + 1;
        let analysis = analyze_pitch(&audio, DEFAULT_MIN_HZ, DEFAULT_MAX_HZ);
        assert_eq!(analysis.track.len(), expected);
    }

    #[test]
    fn silence_reports_no_pitch() {
        let audio = AudioData {
            samples: vec![0.0; 44100],
            sample_rate: 44100,
        };
        let analysis = analyze_pitch(&audio, DEFAULT_MIN_HZ, DEFAULT_MAX_HZ);
        assert!(analysis.summary.is_none());
        assert!(analysis.track.iter().all(|f| f.is_none()));
    }

    #[test]
    fn out_of_band_tone_is_unvoiced() {
        // 1 kHz sits well above the A2..A4 band.
        let audio = sine_audio(1000.0, 44100, 0.5);
        let analysis = analyze_pitch(&audio, DEFAULT_MIN_HZ, DEFAULT_MAX_HZ);
        assert!(analysis.summary.is_none());
    }

    #[test]
    fn stability_clamps_both_ends() {
        assert_eq!(stability_score(0.0), 100.0);
        assert_eq!(stability_score(0.1), 50.0);
        assert_eq!(stability_score(10.0), 0.0);
    }

    #[test]
    fn too_short_input_yields_empty_track() {
        let audio = AudioData {
            samples: vec![0.0; 100],
            sample_rate: 44100,
        };
        let analysis = analyze_pitch(&audio, DEFAULT_MIN_HZ, DEFAULT_MAX_HZ);
        assert!(analysis.track.is_empty());
        assert!(analysis.summary.is_none());
    }
}
