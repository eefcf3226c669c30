//! Error types for the synthesis pipeline.

use std::io;
use thiserror::Error;

/// Everything that can go wrong between a progression and a WAV file.
///
/// Degenerate envelopes (stages longer than the chord) and silent buffers are
/// handled cases with defined output, so they have no variant here.
#[derive(Error, Debug)]
pub enum SynthError {
    /// A numeric argument outside its contract (non-positive frequency, duration
    /// or sample rate, sustain outside [0, 1], ...).
    #[error("Invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A chord with no pitches.
    #[error("Chord {index} has no pitches")]
    EmptyChord { index: usize },

    /// A progression with no chords.
    #[error("Progression has no chords")]
    EmptyProgression,

    /// Per-chord durations don't line up with the chord list.
    #[error("Progression has {chords} chords but {durations} durations")]
    TimingMismatch { chords: usize, durations: usize },

    /// NaN or infinity found in a buffer headed for the encoder.
    #[error("Non-finite sample at index {index}")]
    NonFiniteSample { index: usize },

    /// Mood name not recognised.
    #[error("Unknown mood '{0}' (expected epic, sad or triumph)")]
    UnknownMood(String),

    /// Malformed JSON progression recipe.
    #[error("Recipe error: {0}")]
    Recipe(#[from] serde_json::Error),

    /// I/O error while writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SynthError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        SynthError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Reject anything that is not a finite, strictly positive number.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SynthError::invalid(name, value, "must be finite and > 0"))
    }
}

/// Reject negatives, NaN and infinities; zero is allowed.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SynthError::invalid(name, value, "must be finite and >= 0"))
    }
}

/// Index of the first NaN or infinite sample, as an error.
pub(crate) fn check_finite(samples: &[f64]) -> Result<()> {
    match samples.iter().position(|s| !s.is_finite()) {
        Some(index) => Err(SynthError::NonFiniteSample { index }),
        None => Ok(()),
    }
}
