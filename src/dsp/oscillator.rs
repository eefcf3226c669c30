//! Sine oscillator addressed by sample index.
//!
//! Each sample is computed from its own index rather than by accumulating a
//! phase increment, so long buffers carry no accumulated phase drift and any
//! sample can be evaluated independently.

use std::f64::consts::TAU;

use crate::error::{Result, SynthError, require_non_negative, require_positive};

/// Most samples a 16-bit mono RIFF data chunk can hold.
pub const MAX_SAMPLES: usize = ((u32::MAX - 36) / 2) as usize;

/// Number of samples covering `duration` seconds at `sample_rate`.
///
/// Durations needing more than [`MAX_SAMPLES`] samples are rejected before
/// anything is allocated.
pub fn sample_count(duration: f64, sample_rate: u32) -> Result<usize> {
    let samples = (duration * sample_rate as f64).round();
    if !(samples >= 0.0 && samples <= MAX_SAMPLES as f64) {
        return Err(SynthError::invalid("duration", duration, "too many samples for a WAV file"));
    }
    Ok(samples as usize)
}

/// A fixed-frequency, fixed-amplitude sine source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    frequency: f64,
    amplitude: f64,
    sample_rate: u32,
}

impl Oscillator {
    /// Frequency must be > 0, amplitude >= 0, sample rate > 0.
    pub fn new(frequency: f64, amplitude: f64, sample_rate: u32) -> Result<Self> {
        require_positive("frequency", frequency)?;
        require_non_negative("amplitude", amplitude)?;
        if sample_rate == 0 {
            return Err(SynthError::invalid("sample_rate", 0.0, "must be > 0"));
        }
        Ok(Oscillator {
            frequency,
            amplitude,
            sample_rate,
        })
    }

    /// `amplitude * sin(2π * frequency * index / sample_rate)`.
    pub fn sample_at(&self, index: usize) -> f64 {
        // Only the fractional cycle matters; dropping whole cycles keeps the
        // argument to sin() small for late indices.
        let cycles = self.frequency * index as f64 / self.sample_rate as f64;
        self.amplitude * (TAU * cycles.fract()).sin()
    }

    /// Render `len` samples starting at index 0.
    pub fn render(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.sample_at(i)).collect()
    }
}

/// Render `round(duration * sample_rate)` samples of a sine wave.
///
/// Non-positive frequency, duration or sample rate and negative amplitude are
/// rejected with [`SynthError::InvalidParameter`].
pub fn generate(frequency: f64, duration: f64, sample_rate: u32, amplitude: f64) -> Result<Vec<f64>> {
    require_positive("duration", duration)?;
    let osc = Oscillator::new(frequency, amplitude, sample_rate)?;
    Ok(osc.render(sample_count(duration, sample_rate)?))
}
