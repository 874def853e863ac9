use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::audio::pitch::PitchSummary;
use crate::feedback::Intonation;

/// Everything one analysis pass tells the player. Built once per run and
/// discarded with it.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub duration_secs: f32,
    pub sample_rate: u32,
    /// `None` when no pitch was detected anywhere in the take.
    pub pitch: Option<PitchReport>,
    pub onsets: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct PitchReport {
    pub mean_hz: f32,
    pub std_dev_hz: f32,
    pub stability: f32,
    pub intonation: Intonation,
    pub advice: &'static str,
}

impl PitchReport {
    pub fn new(summary: PitchSummary, intonation: Intonation) -> Self {
        Self {
            mean_hz: summary.mean_hz,
            std_dev_hz: summary.std_dev_hz,
            stability: summary.stability,
            intonation,
            advice: intonation.advice(),
        }
    }
}

impl AnalysisReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Recording: {:.1}s @ {} Hz",
            self.duration_secs, self.sample_rate
        );

        match &self.pitch {
            Some(p) => {
                let _ = writeln!(out, "Mean pitch:      {:.2} Hz", p.mean_hz);
                let _ = writeln!(out, "Pitch std dev:   {:.4} Hz", p.std_dev_hz);
                let _ = writeln!(out, "Stability score: {:.1} / 100", p.stability);
                let _ = writeln!(out, "Intonation:      {} - {}", p.intonation, p.advice);
            }
            None => {
                let _ = writeln!(out, "No pitch detected. Check the recording and try again.");
            }
        }

        if self.onsets.is_empty() {
            let _ = writeln!(out, "Onsets: none detected");
        } else {
            let times: Vec<String> = self.onsets.iter().map(|t| format!("{:.2}s", t)).collect();
            let _ = writeln!(out, "Onsets: {} at {}", self.onsets.len(), times.join(", "));
        }

        out
    }

    pub fn render_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
