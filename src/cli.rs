use clap::Parser;
use std::path::PathBuf;

use brasscoach::config::Theme;
use brasscoach::metronome::scheduler::{MAX_BPM, MIN_BPM};
use brasscoach::tasks::PracticeTask;

#[derive(Parser, Debug)]
#[command(
    name = "brasscoach",
    about = "Practice aid for brass players: pitch stability, rhythm and a metronome"
)]
pub struct Cli {
    /// Recorded performance to analyze (WAV, MP3, M4A)
    pub input: Option<PathBuf>,

    /// Output path for the waveform + onsets image
    #[arg(short, long, default_value = "waveform.png")]
    pub out: PathBuf,

    /// Print the analysis report as JSON
    #[arg(long)]
    pub json: bool,

    /// Practice task; resolves and prints its sheet-music file
    #[arg(short, long, value_enum)]
    pub task: Option<PracticeTask>,

    /// List available practice tasks and exit
    #[arg(long)]
    pub list_tasks: bool,

    /// Run the metronome instead of analyzing
    #[arg(long)]
    pub metronome: bool,

    /// Metronome tempo in beats per minute
    #[arg(long, default_value_t = 120,
          value_parser = clap::value_parser!(u32).range(MIN_BPM as i64..=MAX_BPM as i64))]
    pub bpm: u32,

    /// Plot theme
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,

    /// Font file (TTF/OTF) for plot labels
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Reference pitch in Hz for intonation feedback
    #[arg(long)]
    pub reference_hz: Option<f32>,

    /// Intonation tolerance in Hz
    #[arg(long)]
    pub tolerance_hz: Option<f32>,

    /// Lower edge of the pitch-tracking band in Hz
    #[arg(long)]
    pub min_hz: Option<f32>,

    /// Upper edge of the pitch-tracking band in Hz
    #[arg(long)]
    pub max_hz: Option<f32>,

    /// Directory containing sheet-music PDFs
    #[arg(long)]
    pub scores_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}
