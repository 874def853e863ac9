use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("unsupported audio format '{0}' (expected wav, mp3 or m4a)")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("sheet music not found: {}", .0.display())]
    MissingScore(PathBuf),
}
