mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use brasscoach::audio::{decode, onset, pitch};
use brasscoach::config::{self, Config, Theme};
use brasscoach::feedback;
use brasscoach::metronome::{click, scheduler};
use brasscoach::render::text::TextOverlay;
use brasscoach::render::waveform;
use brasscoach::report::{AnalysisReport, PitchReport};
use brasscoach::tasks::PracticeTask;

use cli::Cli;

const LABEL_FONT_SIZE: f32 = 18.0;

/// Per-run settings after merging CLI over config. Nothing survives the run.
struct Settings {
    reference_hz: f32,
    tolerance_hz: f32,
    min_hz: f32,
    max_hz: f32,
    theme: Theme,
    font: Option<PathBuf>,
    scores_dir: PathBuf,
    ticks: u32,
}

impl Settings {
    fn resolve(cli: &Cli, config: Config) -> Self {
        Self {
            reference_hz: cli.reference_hz.unwrap_or(config.tuning.reference_hz),
            tolerance_hz: cli.tolerance_hz.unwrap_or(config.tuning.tolerance_hz),
            min_hz: cli.min_hz.unwrap_or(config.tuning.min_hz),
            max_hz: cli.max_hz.unwrap_or(config.tuning.max_hz),
            theme: cli.theme.unwrap_or(config.ui.theme),
            font: cli.font.clone().or(config.ui.font),
            scores_dir: cli.scores_dir.clone().unwrap_or(config.assets.scores_dir),
            ticks: config.metronome.ticks,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect brasscoach.toml /
    // global config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("brasscoach.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("brasscoach").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("brasscoach").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });

    let config = match config_path {
        Some(ref path) => match config::load_config(path) {
            Some(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            None => {
                log::warn!("Failed to load config from {}", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    let settings = Settings::resolve(&cli, config);

    if cli.list_tasks {
        println!("Practice tasks:");
        for task in PracticeTask::all() {
            println!("  {:<20} {}", task.cli_name(), task.label());
        }
        return Ok(());
    }

    // A missing sheet is an inline warning, never a reason to skip the rest.
    if let Some(task) = cli.task {
        println!("Task: {}", task.label());
        match task.score_path(&settings.scores_dir) {
            Ok(path) => println!("Sheet music: {}", path.display()),
            Err(err) => log::warn!("{}", err),
        }
    }

    if cli.metronome {
        log::info!("Metronome: {} bpm, {} ticks", cli.bpm, settings.ticks);
        let clip = click::generate_click()?;
        scheduler::run(cli.bpm, settings.ticks, &clip, scheduler::play_clip)?;
        return Ok(());
    }

    let Some(ref input) = cli.input else {
        if cli.task.is_some() {
            return Ok(());
        }
        anyhow::bail!("Nothing to do. Pass a recording, --metronome or --list-tasks.");
    };

    log::info!("brasscoach - brass practice analysis");
    log::info!("Input: {}", input.display());

    // 1. Decode
    let audio = decode::decode_audio(input)?;

    // 2. Pitch track + summary
    log::info!(
        "Analyzing pitch ({:.0}-{:.0} Hz band)...",
        settings.min_hz,
        settings.max_hz
    );
    let analysis = pitch::analyze_pitch(&audio, settings.min_hz, settings.max_hz);

    let pitch_report = match analysis.summary {
        Some(summary) => {
            let verdict = feedback::classify_intonation(
                summary.mean_hz,
                settings.reference_hz,
                settings.tolerance_hz,
            );
            Some(PitchReport::new(summary, verdict))
        }
        None => {
            log::warn!("No pitch detected. Check the recording and try again.");
            None
        }
    };

    // 3. Onsets
    let onsets = onset::detect_onsets(&audio);
    log::info!("Detected {} onsets", onsets.len());

    // 4. Waveform plot
    let overlay = settings
        .font
        .as_deref()
        .and_then(|path| TextOverlay::from_file(path, LABEL_FONT_SIZE));
    let png = waveform::render_waveform(&audio, &onsets, settings.theme, overlay.as_ref())?;
    std::fs::write(&cli.out, &png)
        .with_context(|| format!("Failed to write {}", cli.out.display()))?;
    log::info!("Waveform plot written to {}", cli.out.display());

    // 5. Report
    let report = AnalysisReport {
        duration_secs: audio.duration_secs(),
        sample_rate: audio.sample_rate,
        pitch: pitch_report,
        onsets,
    };

    if cli.json {
        println!("{}", report.render_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}
