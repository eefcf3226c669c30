//! ADSR envelope shaping over a whole buffer.
//!
//! Stage boundaries are rounded to whole samples. Each sample's gain is
//! picked by checking attack, then decay, then release, falling through to
//! the sustain plateau. When `attack + decay + release` exceeds the buffer,
//! the stages overlap and that order decides: early samples stay in attack or
//! decay even if they also fall inside the release window.

use crate::error::Result;
use crate::progression::EnvelopeParams;

/// Stage lengths of an envelope in whole samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSamples {
    pub attack: usize,
    pub decay: usize,
    pub release: usize,
}

impl StageSamples {
    pub fn new(params: &EnvelopeParams, sample_rate: u32) -> Self {
        let sr = sample_rate as f64;
        StageSamples {
            attack: (params.attack * sr).round() as usize,
            decay: (params.decay * sr).round() as usize,
            release: (params.release * sr).round() as usize,
        }
    }

    /// Whether the stages don't fit inside `len` samples.
    pub fn overlaps(&self, len: usize) -> bool {
        self.attack + self.decay + self.release >= len
    }
}

/// Envelope gain at sample `i` of a `len`-sample buffer.
///
/// Zero-length stages are never entered, so no ramp divides by zero.
pub fn gain_at(i: usize, len: usize, stages: StageSamples, sustain: f64) -> f64 {
    let StageSamples {
        attack: a,
        decay: d,
        release: r,
    } = stages;

    if i < a {
        i as f64 / a as f64
    } else if i < a + d {
        let progress = (i - a) as f64 / d as f64;
        1.0 - (1.0 - sustain) * progress
    } else if i + r > len {
        // i > len - r, kept unsigned for r > len
        let progress = (i + r - len) as f64 / r as f64;
        sustain * (1.0 - progress)
    } else {
        sustain
    }
}

/// Multiply `buffer` in place by the ADSR contour described by `params`.
pub fn apply_envelope(buffer: &mut [f64], params: &EnvelopeParams, sample_rate: u32) -> Result<()> {
    params.validate()?;
    let stages = StageSamples::new(params, sample_rate);
    let len = buffer.len();
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample *= gain_at(i, len, stages, params.sustain);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params(attack: f64, decay: f64, sustain: f64, release: f64) -> EnvelopeParams {
        EnvelopeParams {
            attack,
            decay,
            sustain,
            release,
        }
    }

    fn shaped_ones(len: usize, p: &EnvelopeParams, sample_rate: u32) -> Vec<f64> {
        let mut buf = vec![1.0; len];
        apply_envelope(&mut buf, p, sample_rate).unwrap();
        buf
    }

    #[test]
    fn contour_endpoints() {
        let p = params(0.1, 0.1, 0.7, 0.2);
        let env = shaped_ones(44100, &p, 44100);

        assert_abs_diff_eq!(env[0], 0.0, epsilon = 1e-12);
        // Peak at the end of attack.
        assert_abs_diff_eq!(env[4410], 1.0, epsilon = 1e-12);
        // Plateau midpoint: between 8820 and 44100 - 8820.
        assert_abs_diff_eq!(env[22050], 0.7, epsilon = 1e-12);
        // Last sample: one step short of zero.
        assert!(env[44099] < 0.7 / 8820.0 + 1e-12, "tail {}", env[44099]);
    }

    #[test]
    fn attack_is_linear() {
        let p = params(0.01, 0.0, 1.0, 0.0);
        let env = shaped_ones(1000, &p, 10000);
        // A = 100 samples
        for i in 0..100 {
            assert_abs_diff_eq!(env[i], i as f64 / 100.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(env[100], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn decay_falls_to_sustain() {
        let p = params(0.0, 0.01, 0.4, 0.0);
        let env = shaped_ones(500, &p, 10000);
        assert_abs_diff_eq!(env[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(env[50], 1.0 - 0.6 * 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(env[100], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(env[499], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn zero_length_stages_skip() {
        let p = params(0.0, 0.0, 0.5, 0.0);
        let env = shaped_ones(100, &p, 44100);
        assert!(env.iter().all(|&g| (g - 0.5).abs() < 1e-12));
    }

    #[test]
    fn release_boundary_is_exclusive() {
        // len 100, R = 10: sample 90 (== len - R) is still sustain.
        let p = params(0.0, 0.0, 0.8, 0.001);
        let env = shaped_ones(100, &p, 10000);
        assert_abs_diff_eq!(env[90], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(env[91], 0.8 * 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(env[99], 0.8 * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn overlapping_stages_keep_precedence() {
        // A = 40, D = 40, R = 60 on a 100-sample buffer.
        let p = params(0.004, 0.004, 0.5, 0.006);
        let stages = StageSamples::new(&p, 10000);
        assert!(stages.overlaps(100));
        let env = shaped_ones(100, &p, 10000);

        // Sample 45 is inside the release window (> 40) but decay wins.
        assert_abs_diff_eq!(env[45], 1.0 - 0.5 * 5.0 / 40.0, epsilon = 1e-12);
        // Sample 85: past decay, release progress (85 - 40) / 60.
        assert_abs_diff_eq!(env[85], 0.5 * (1.0 - 45.0 / 60.0), epsilon = 1e-12);
        assert!(env.iter().all(|g| g.is_finite() && *g >= 0.0 && *g <= 1.0));
    }

    #[test]
    fn release_longer_than_buffer_stays_finite() {
        let p = params(0.0, 0.0, 0.6, 1.0);
        let env = shaped_ones(100, &p, 44100);
        // R = 44100 > len: every sample is in release, progress (i + R - len) / R.
        let r = 44100.0;
        assert_abs_diff_eq!(env[0], 0.6 * (1.0 - (r - 100.0) / r), epsilon = 1e-12);
        assert!(env.iter().all(|g| g.is_finite() && *g >= 0.0));
    }

    #[test]
    fn empty_buffer_is_untouched() {
        let mut buf: Vec<f64> = Vec::new();
        apply_envelope(&mut buf, &params(0.1, 0.1, 0.5, 0.1), 44100).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn scales_existing_samples() {
        let mut buf = vec![0.5, -0.5, 0.5, -0.5];
        apply_envelope(&mut buf, &params(0.0, 0.0, 0.5, 0.0), 44100).unwrap();
        assert_eq!(buf, vec![0.25, -0.25, 0.25, -0.25]);
    }

    #[test]
    fn rejects_invalid_params() {
        let mut buf = vec![1.0; 10];
        assert!(apply_envelope(&mut buf, &params(-0.1, 0.1, 0.5, 0.1), 44100).is_err());
        assert!(apply_envelope(&mut buf, &params(0.1, 0.1, 1.5, 0.1), 44100).is_err());
        assert!(apply_envelope(&mut buf, &params(0.1, f64::NAN, 0.5, 0.1), 44100).is_err());
        assert!(buf.iter().all(|&s| s == 1.0), "buffer must be untouched on error");
    }
}
