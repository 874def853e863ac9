use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::AudioData;

const FFT_SIZE: usize = 2048;
const HOP_SIZE: usize = 512;

/// A flux peak must clear the local mean by this factor to count as an onset.
const FLUX_THRESHOLD: f32 = 1.5;
/// Frames averaged on either side of a candidate for the adaptive threshold.
const AVG_WINDOW: usize = 20;
/// Two attacks closer than this are treated as one.
const MIN_GAP_SECS: f32 = 0.1;

/// Locate note attacks via spectral-flux novelty. Returns strictly increasing
/// timestamps in seconds; empty when nothing rises above the local noise
/// floor, which is a valid result and not an error.
pub fn detect_onsets(audio: &AudioData) -> Vec<f32> {
    let samples = &audio.samples;
    let sr = audio.sample_rate;

    if samples.len() < FFT_SIZE {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);
    let hann = hann_window(FFT_SIZE);

    let mut prev_magnitudes = vec![0.0f32; FFT_SIZE / 2];
    let mut flux_values: Vec<(f32, f32)> = Vec::new(); // (time, flux)

    let mut pos = 0;
    while pos + FFT_SIZE <= samples.len() {
        let mut buffer: Vec<Complex<f32>> = samples[pos..pos + FFT_SIZE]
            .iter()
            .enumerate()
            .map(|(i, &s)| Complex::new(s * hann[i], 0.0))
            .collect();
        fft.process(&mut buffer);

        let magnitudes: Vec<f32> = buffer[..FFT_SIZE / 2].iter().map(|c| c.norm()).collect();

        // Half-wave rectified: only rising energy marks an attack.
        let flux: f32 = magnitudes
            .iter()
            .zip(prev_magnitudes.iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();

        flux_values.push((pos as f32 / sr as f32, flux));
        prev_magnitudes = magnitudes;
        pos += HOP_SIZE;
    }

    pick_peaks(&flux_values)
}

fn pick_peaks(flux_values: &[(f32, f32)]) -> Vec<f32> {
    let mut onsets: Vec<f32> = Vec::new();

    for i in 0..flux_values.len() {
        let start = i.saturating_sub(AVG_WINDOW);
        let end = (i + AVG_WINDOW + 1).min(flux_values.len());
        let local_mean: f32 = flux_values[start..end].iter().map(|(_, f)| f).sum::<f32>()
            / (end - start) as f32;

        let threshold = local_mean * FLUX_THRESHOLD + 0.01;

        if flux_values[i].1 > threshold {
            let is_peak = (i == 0 || flux_values[i].1 >= flux_values[i - 1].1)
                && (i == flux_values.len() - 1 || flux_values[i].1 >= flux_values[i + 1].1);

            let far_enough = onsets
                .last()
                .map_or(true, |&last| flux_values[i].0 - last > MIN_GAP_SECS);

            if is_peak && far_enough {
                onsets.push(flux_values[i].0);
            }
        }
    }

    onsets
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// 1 kHz bursts of `burst_secs` at each onset time, silence elsewhere.
    fn click_track(onset_times: &[f32], total_secs: f32, sample_rate: u32) -> AudioData {
        let sr = sample_rate as f32;
        let mut samples = vec![0.0f32; (total_secs * sr) as usize];
        let burst_len = (0.03 * sr) as usize;

        for &t in onset_times {
            let start = (t * sr) as usize;
            for i in 0..burst_len.min(samples.len().saturating_sub(start)) {
                samples[start + i] = 0.8 * (2.0 * PI * 1000.0 * i as f32 / sr).sin();
            }
        }

        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn finds_each_click_once_within_tolerance() {
        let truth = [0.5, 1.0, 1.5, 2.0, 2.5];
        let audio = click_track(&truth, 3.0, 44100);

        let onsets = detect_onsets(&audio);
        assert_eq!(
            onsets.len(),
            truth.len(),
            "expected one detection per click, got {:?}",
            onsets
        );

        for (&detected, &expected) in onsets.iter().zip(truth.iter()) {
            assert!(
                (detected - expected).abs() <= 0.05,
                "onset {} too far from {}",
                detected,
                expected
            );
        }
    }

    #[test]
    fn timestamps_are_strictly_increasing() {
        let audio = click_track(&[0.3, 0.7, 1.1, 1.9], 2.5, 44100);
        let onsets = detect_onsets(&audio);
        assert!(onsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn silence_yields_no_onsets() {
        let audio = AudioData {
            samples: vec![0.0; 44100],
            sample_rate: 44100,
        };
        assert!(detect_onsets(&audio).is_empty());
    }

    #[test]
    fn short_input_yields_no_onsets() {
        let audio = AudioData {
            samples: vec![0.1; 512],
            sample_rate: 44100,
        };
        assert!(detect_onsets(&audio).is_empty());
    }
}
