//! Render settings shared by every track.

use serde::{Deserialize, Serialize};

use crate::dsp::wav::WavFormat;
use crate::error::{Result, SynthError, require_positive};

/// Output settings applied to every rendered track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Peak level the normalizer scales each track to, in (0, 1].
    pub ceiling: f64,
    /// Length of the mood tracks in seconds.
    pub track_seconds: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        SynthConfig {
            sample_rate: 44100,
            ceiling: 0.8,
            track_seconds: 30.0,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(SynthError::invalid("sample_rate", 0.0, "must be > 0"));
        }
        if !(self.ceiling > 0.0 && self.ceiling <= 1.0) {
            return Err(SynthError::invalid("ceiling", self.ceiling, "must be in (0, 1]"));
        }
        require_positive("track_seconds", self.track_seconds)?;
        Ok(())
    }

    /// The WAV layout tracks are written in.
    pub fn wav_format(&self) -> WavFormat {
        WavFormat::mono16(self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_story_tracks() {
        let config = SynthConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.ceiling, 0.8);
        assert_eq!(config.track_seconds, 30.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SynthConfig = serde_json::from_str(r#"{ "sample_rate": 22050 }"#).unwrap();
        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.ceiling, 0.8);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let bad = [
            SynthConfig {
                sample_rate: 0,
                ..SynthConfig::default()
            },
            SynthConfig {
                ceiling: 0.0,
                ..SynthConfig::default()
            },
            SynthConfig {
                ceiling: 1.01,
                ..SynthConfig::default()
            },
            SynthConfig {
                track_seconds: -5.0,
                ..SynthConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }
}
