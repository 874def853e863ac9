use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::feedback;
use crate::metronome::scheduler;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tuning: TuningConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub metronome: MetronomeConfig,
}

#[derive(Debug, Deserialize)]
pub struct TuningConfig {
    #[serde(default = "default_reference_hz")]
    pub reference_hz: f32,
    #[serde(default = "default_tolerance_hz")]
    pub tolerance_hz: f32,
    #[serde(default = "default_min_hz")]
    pub min_hz: f32,
    #[serde(default = "default_max_hz")]
    pub max_hz: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
    pub font: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_scores_dir")]
    pub scores_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct MetronomeConfig {
    #[serde(default = "default_ticks")]
    pub ticks: u32,
}

/// Request-scoped plot styling; nothing carries over between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            reference_hz: default_reference_hz(),
            tolerance_hz: default_tolerance_hz(),
            min_hz: default_min_hz(),
            max_hz: default_max_hz(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            scores_dir: default_scores_dir(),
        }
    }
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
        }
    }
}

fn default_reference_hz() -> f32 { feedback::DEFAULT_REFERENCE_HZ }
fn default_tolerance_hz() -> f32 { feedback::DEFAULT_TOLERANCE_HZ }
fn default_min_hz() -> f32 { crate::audio::pitch::DEFAULT_MIN_HZ }
fn default_max_hz() -> f32 { crate::audio::pitch::DEFAULT_MAX_HZ }
fn default_scores_dir() -> PathBuf { PathBuf::from("scores") }
fn default_ticks() -> u32 { scheduler::TICKS_PER_RUN }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
