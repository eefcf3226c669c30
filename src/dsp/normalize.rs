//! Peak normalization.

use crate::error::{Result, SynthError, check_finite};

/// What [`normalize`] did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Every sample was multiplied by `gain = ceiling / peak`.
    Scaled { peak: f64, gain: f64 },
    /// The buffer was all zeros (or empty) and was left alone.
    Silent,
}

/// Largest absolute sample value, 0.0 for an empty buffer.
pub fn peak(buffer: &[f64]) -> f64 {
    buffer.iter().fold(0.0f64, |m, s| m.max(s.abs()))
}

/// Scale `buffer` in place so its peak absolute value equals `ceiling`.
///
/// `ceiling` must lie in (0, 1]. Buffers containing NaN or infinity are
/// rejected before anything is modified.
pub fn normalize(buffer: &mut [f64], ceiling: f64) -> Result<Normalization> {
    if !(ceiling > 0.0 && ceiling <= 1.0) {
        return Err(SynthError::invalid("ceiling", ceiling, "must be in (0, 1]"));
    }
    check_finite(buffer)?;

    let peak = peak(buffer);
    if peak == 0.0 {
        return Ok(Normalization::Silent);
    }

    let gain = ceiling / peak;
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
    Ok(Normalization::Scaled { peak, gain })
}
