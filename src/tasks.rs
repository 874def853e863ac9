use clap::ValueEnum;
use std::path::{Path, PathBuf};

use crate::error::CoachError;

/// The practice menu. Each task maps to a sheet-music PDF under the
/// configured scores directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PracticeTask {
    LongToneF,
    ScaleCMajor,
    TonguingQuarters,
    FlyMeToTheMoon,
}

impl PracticeTask {
    pub fn all() -> [PracticeTask; 4] {
        [
            PracticeTask::LongToneF,
            PracticeTask::ScaleCMajor,
            PracticeTask::TonguingQuarters,
            PracticeTask::FlyMeToTheMoon,
        ]
    }

    /// Name as accepted on the command line.
    pub fn cli_name(self) -> &'static str {
        match self {
            PracticeTask::LongToneF => "long-tone-f",
            PracticeTask::ScaleCMajor => "scale-c-major",
            PracticeTask::TonguingQuarters => "tonguing-quarters",
            PracticeTask::FlyMeToTheMoon => "fly-me-to-the-moon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PracticeTask::LongToneF => "Long tone on F",
            PracticeTask::ScaleCMajor => "C major scale",
            PracticeTask::TonguingQuarters => "Quarter-note tonguing",
            PracticeTask::FlyMeToTheMoon => "Fly Me to the Moon",
        }
    }

    fn score_file(self) -> &'static str {
        match self {
            PracticeTask::LongToneF => "long_tone_f.pdf",
            PracticeTask::ScaleCMajor => "scale_c_major.pdf",
            PracticeTask::TonguingQuarters => "tonguing_quarters.pdf",
            PracticeTask::FlyMeToTheMoon => "fly_me_to_the_moon.pdf",
        }
    }

    /// Resolve the sheet PDF for this task, verifying it exists.
    pub fn score_path(self, scores_dir: &Path) -> Result<PathBuf, CoachError> {
        let path = scores_dir.join(self.score_file());
        if path.is_file() {
            Ok(path)
        } else {
            Err(CoachError::MissingScore(path))
        }
    }
}
