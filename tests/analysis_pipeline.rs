use std::f32::consts::PI;
use std::path::Path;

use tempfile::TempDir;

use brasscoach::audio::{decode, onset, pitch};
use brasscoach::config::Theme;
use brasscoach::error::CoachError;
use brasscoach::feedback::{self, Intonation};
use brasscoach::render::waveform;
use brasscoach::report::{AnalysisReport, PitchReport};

const SAMPLE_RATE: u32 = 44100;

/// Write a mono 16-bit WAV from f32 samples.
fn write_wav(path: &Path, samples: &[f32]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer
            .write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

fn sine(frequency: f32, duration: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.8 * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

#[test]
fn decode_preserves_sample_count_and_rate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tone.wav");
    let samples = sine(220.0, 1.0);
    write_wav(&path, &samples);

    let audio = decode::decode_audio(&path).unwrap();
    assert_eq!(audio.sample_rate, SAMPLE_RATE);
    assert!(
        (audio.samples.len() as i64 - samples.len() as i64).abs() <= 1,
        "decoded {} of {} samples",
        audio.samples.len(),
        samples.len()
    );
}

#[test]
fn unsupported_extension_is_rejected_up_front() {
    let err = decode::decode_audio(Path::new("practice-notes.txt")).unwrap_err();
    let coach = err.downcast_ref::<CoachError>().unwrap();
    assert!(matches!(coach, CoachError::UnsupportedFormat(_)));
}

#[test]
fn malformed_wav_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.wav");
    std::fs::write(&path, b"RIFFnot really a wave file").unwrap();

    let err = decode::decode_audio(&path).unwrap_err();
    let coach = err.downcast_ref::<CoachError>().unwrap();
    assert!(matches!(coach, CoachError::Decode(_)));
}

#[test]
fn full_pipeline_on_a_long_tone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long_tone.wav");
    write_wav(&path, &sine(220.0, 2.0));

    let audio = decode::decode_audio(&path).unwrap();

    let analysis = pitch::analyze_pitch(&audio, pitch::DEFAULT_MIN_HZ, pitch::DEFAULT_MAX_HZ);
    let summary = analysis.summary.expect("long tone should carry pitch");
    assert!(
        (summary.mean_hz - 220.0).abs() < 2.0,
        "mean {} Hz",
        summary.mean_hz
    );

    let verdict = feedback::classify_intonation(summary.mean_hz, 442.0, 10.0);
    assert_eq!(verdict, Intonation::Flat);

    let onsets = onset::detect_onsets(&audio);
    let png = waveform::render_waveform(&audio, &onsets, Theme::Light, None).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let report = AnalysisReport {
        duration_secs: audio.duration_secs(),
        sample_rate: audio.sample_rate,
        pitch: Some(PitchReport::new(summary, verdict)),
        onsets,
    };
    let json = report.render_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["pitch"]["intonation"], "flat");
}

#[test]
fn silent_take_reports_no_pitch_but_still_renders() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("silence.wav");
    write_wav(&path, &vec![0.0; SAMPLE_RATE as usize]);

    let audio = decode::decode_audio(&path).unwrap();

    let analysis = pitch::analyze_pitch(&audio, pitch::DEFAULT_MIN_HZ, pitch::DEFAULT_MAX_HZ);
    assert!(analysis.summary.is_none());

    let onsets = onset::detect_onsets(&audio);
    assert!(onsets.is_empty());

    let png = waveform::render_waveform(&audio, &onsets, Theme::Dark, None).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}
