use anyhow::Result;
use std::io::Cursor;

pub const CLICK_DURATION_MS: u32 = 100;
pub const CLICK_FREQ_HZ: f32 = 1000.0;
pub const CLICK_GAIN_DB: f32 = -3.0;
pub const CLICK_SAMPLE_RATE: u32 = 44100;

/// Synthesize the metronome click as a complete WAV file in memory: 100 ms of
/// 1 kHz sine at -3 dBFS, mono 16-bit. Every call returns the same bytes.
pub fn generate_click() -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: CLICK_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let num_samples = (CLICK_SAMPLE_RATE * CLICK_DURATION_MS / 1000) as usize;
    let amplitude = 10f32.powf(CLICK_GAIN_DB / 20.0);

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for i in 0..num_samples {
        let t = i as f32 / CLICK_SAMPLE_RATE as f32;
        let sample = amplitude * (2.0 * std::f32::consts::PI * CLICK_FREQ_HZ * t).sin();
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_calls_are_byte_identical() {
        let a = generate_click().unwrap();
        let b = generate_click().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn clip_has_the_fixed_duration_and_format() {
        let bytes = generate_click().unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();

        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, CLICK_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), CLICK_SAMPLE_RATE * CLICK_DURATION_MS / 1000);
    }

    #[test]
    fn peak_level_sits_near_minus_three_db() {
        let bytes = generate_click().unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();

        let peak = reader
            .into_samples::<i16>()
            .map(|s| s.unwrap().unsigned_abs())
            .max()
            .unwrap();
        let peak_db = 20.0 * (peak as f32 / i16::MAX as f32).log10();
        assert!((peak_db - CLICK_GAIN_DB).abs() < 0.1, "peak {} dB", peak_db);
    }
}
