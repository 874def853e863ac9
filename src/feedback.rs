use serde::Serialize;
use std::fmt;

/// Tuning standard the ensemble tunes to.
pub const DEFAULT_REFERENCE_HZ: f32 = 442.0;
pub const DEFAULT_TOLERANCE_HZ: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intonation {
    Flat,
    Sharp,
    InTune,
}

/// Classify a mean pitch against the reference. Boundaries are inclusive of
/// InTune: only means strictly outside [ref - tol, ref + tol] are off.
pub fn classify_intonation(mean_hz: f32, reference_hz: f32, tolerance_hz: f32) -> Intonation {
    if mean_hz < reference_hz - tolerance_hz {
        Intonation::Flat
    } else if mean_hz > reference_hz + tolerance_hz {
        Intonation::Sharp
    } else {
        Intonation::InTune
    }
}

impl Intonation {
    /// Coaching message shown alongside the verdict.
    pub fn advice(self) -> &'static str {
        match self {
            Intonation::Flat => {
                "Running a little flat. Keep the air moving and firm up the embouchure."
            }
            Intonation::Sharp => "Running a little sharp. Relax and let the note settle.",
            Intonation::InTune => "Pitch is right on target. Keep it up!",
        }
    }
}

impl fmt::Display for Intonation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intonation::Flat => "flat",
            Intonation::Sharp => "sharp",
            Intonation::InTune => "in tune",
        };
        f.write_str(s)
    }
}
