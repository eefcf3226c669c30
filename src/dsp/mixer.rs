//! Mixer: sums oscillator voices into one chord buffer.

use crate::error::{Result, SynthError, require_positive};
use crate::progression::BassVoice;

use super::oscillator::{Oscillator, sample_count};

/// A summing accumulator over a fixed-length buffer.
#[derive(Debug, Clone)]
pub struct Mixer {
    buffer: Vec<f64>,
}

impl Mixer {
    /// A zeroed buffer of `num_samples`.
    pub fn new(num_samples: usize) -> Self {
        Mixer {
            buffer: vec![0.0; num_samples],
        }
    }

    /// Sum an oscillator's output into the buffer, sample by sample.
    pub fn add_voice(&mut self, osc: &Oscillator) {
        for (i, out) in self.buffer.iter_mut().enumerate() {
            *out += osc.sample_at(i);
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Hand over the mixed buffer.
    pub fn into_buffer(self) -> Vec<f64> {
        self.buffer
    }
}

/// Render a chord: every pitch at `total_amplitude / pitches.len()`, plus an
/// optional sub-bass voice an octave (or two) below the first pitch.
///
/// The per-pitch split keeps the chord's peak within `total_amplitude`; the
/// bass voice adds its own amplitude on top.
pub fn mix_chord(
    pitches: &[f64],
    duration: f64,
    sample_rate: u32,
    total_amplitude: f64,
    bass: Option<&BassVoice>,
) -> Result<Vec<f64>> {
    if pitches.is_empty() {
        return Err(SynthError::invalid("pitches", 0.0, "chord needs at least one pitch"));
    }
    require_positive("duration", duration)?;

    let voice_amplitude = total_amplitude / pitches.len() as f64;
    let mut mixer = Mixer::new(sample_count(duration, sample_rate)?);

    for &pitch in pitches {
        mixer.add_voice(&Oscillator::new(pitch, voice_amplitude, sample_rate)?);
    }

    if let Some(bass) = bass {
        let root = pitches[0];
        mixer.add_voice(&Oscillator::new(bass.frequency(root)?, bass.amplitude, sample_rate)?);
    }

    Ok(mixer.into_buffer())
}
