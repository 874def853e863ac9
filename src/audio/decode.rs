use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::CoachError;

/// Recordings longer than this still analyze, but slowly enough to warn about.
const MAX_ADVISED_SECS: f32 = 600.0;

/// Container formats accepted for uploaded performances, resolved once from
/// the file extension. Everything downstream dispatches on this variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
    M4a,
}

impl AudioFormat {
    pub fn from_path(path: &Path) -> Result<Self, CoachError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "wav" => Ok(AudioFormat::Wav),
            "mp3" => Ok(AudioFormat::Mp3),
            "m4a" => Ok(AudioFormat::M4a),
            _ => Err(CoachError::UnsupportedFormat(ext)),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
        }
    }
}

#[derive(Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let format = AudioFormat::from_path(path)?;

    match format {
        AudioFormat::M4a => {
            // The temp WAV is removed on drop, whether or not decoding after
            // the transcode succeeds.
            let tmp = transcode_to_wav(path)?;
            decode_stream(tmp.path(), AudioFormat::Wav)
        }
        _ => decode_stream(path, format),
    }
}

/// Unpack an m4a container into a scoped temporary WAV via ffmpeg.
fn transcode_to_wav(input: &Path) -> Result<tempfile::NamedTempFile> {
    let tmp = tempfile::Builder::new()
        .prefix("brasscoach-")
        .suffix(".wav")
        .tempfile()
        .context("Failed to create temporary file for transcoding")?;

    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-f")
        .arg("wav")
        .arg(tmp.path())
        .output()
        .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoachError::Decode(format!(
            "ffmpeg could not transcode {}: {}",
            input.display(),
            stderr.lines().last().unwrap_or("unknown error")
        ))
        .into());
    }

    log::info!("Transcoded {} to temporary WAV", input.display());
    Ok(tmp)
}

fn decode_stream(path: &Path, format: AudioFormat) -> Result<AudioData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.extension());

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| CoachError::Decode(format!("unrecognized audio data: {}", e)))?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| CoachError::Decode("no audio tracks found".into()))?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| CoachError::Decode("unknown sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CoachError::Decode(format!("no codec for track: {}", e)))?;

    let mut all_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(CoachError::Decode(e.to_string()).into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Skip a corrupt packet; bail only when the whole stream is junk.
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(CoachError::Decode(e.to_string()).into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        // Downmix to mono
        if channels == 1 {
            all_samples.extend_from_slice(samples);
        } else {
            for frame_samples in samples.chunks(channels) {
                let mono: f32 = frame_samples.iter().sum::<f32>() / channels as f32;
                all_samples.push(mono);
            }
        }
    }

    if all_samples.is_empty() {
        return Err(CoachError::Decode("no audio frames decoded".into()).into());
    }

    let duration = all_samples.len() as f32 / sample_rate as f32;
    log::info!(
        "Decoded audio: {} samples, {}Hz, {:.1}s",
        all_samples.len(),
        sample_rate,
        duration
    );
    if duration > MAX_ADVISED_SECS {
        log::warn!(
            "Recording is {:.0} minutes long; analysis may take a while",
            duration / 60.0
        );
    }

    Ok(AudioData {
        samples: all_samples,
        sample_rate,
    })
}
