//! Audio Engine: renders a Progression to audio samples.
//!
//! Each chord is mixed and shaped on its own, then appended to the track
//! buffer in declared order. Chords meet at hard edges; the envelope's attack
//! and release are the only smoothing across a boundary.

use crate::error::{Result, SynthError, check_finite};
use crate::observer::RenderObserver;
use crate::progression::Progression;

use super::envelope::apply_envelope;
use super::mixer::mix_chord;
use super::normalize::{Normalization, normalize};
use super::oscillator::{MAX_SAMPLES, sample_count};
use super::wav::quantize;

/// A finished, normalized track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub name: String,
    pub sample_rate: u32,
    pub samples: Vec<f64>,
    pub normalization: Normalization,
}

impl Track {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// The audio rendering engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioEngine {
    pub sample_rate: u32,
    /// Peak level tracks are normalized to.
    pub ceiling: f64,
}

impl AudioEngine {
    pub fn new(sample_rate: u32) -> Self {
        AudioEngine {
            sample_rate,
            ceiling: 0.8,
        }
    }

    pub fn with_ceiling(mut self, ceiling: f64) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Sequence every chord of `progression` into one un-normalized buffer.
    pub fn render(&self, progression: &Progression, observer: &dyn RenderObserver) -> Result<Vec<f64>> {
        if self.sample_rate == 0 {
            return Err(SynthError::invalid("sample_rate", 0.0, "must be > 0"));
        }

        let total = progression
            .chord_durations()
            .iter()
            .try_fold(0usize, |total, &d| {
                let next = total
                    .checked_add(sample_count(d, self.sample_rate)?)
                    .filter(|&n| n <= MAX_SAMPLES);
                next.ok_or_else(|| {
                    SynthError::invalid("duration", progression.total_seconds(), "track too long for a WAV file")
                })
            })?;

        let name = progression.name();
        observer.track_started(name, progression.chords().len(), progression.total_seconds());
        let mut track = Vec::with_capacity(total);

        for (index, (chord, duration)) in progression.steps().enumerate() {
            let mut samples = mix_chord(
                &chord.pitches,
                duration,
                self.sample_rate,
                progression.volume(),
                progression.bass(),
            )?;
            apply_envelope(&mut samples, progression.envelope(), self.sample_rate)?;
            observer.chord_rendered(name, index, chord, samples.len());
            track.extend_from_slice(&samples);
        }

        check_finite(&track)?;
        Ok(track)
    }

    /// Sequence and peak-normalize a progression.
    pub fn render_track(&self, progression: &Progression, observer: &dyn RenderObserver) -> Result<Track> {
        let mut samples = self.render(progression, observer)?;
        let normalization = normalize(&mut samples, self.ceiling)?;
        observer.track_normalized(progression.name(), &normalization);

        Ok(Track {
            name: progression.name().to_string(),
            sample_rate: self.sample_rate,
            samples,
            normalization,
        })
    }

    /// Render to mono i16 PCM (for WAV export).
    pub fn render_pcm_i16(&self, progression: &Progression, observer: &dyn RenderObserver) -> Result<Vec<i16>> {
        let track = self.render_track(progression, observer)?;
        Ok(track.samples.iter().map(|&s| quantize(s)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::normalize::peak;
    use crate::dsp::{envelope, mixer};
    use crate::observer::NullObserver;
    use crate::observer::tests::RecordingObserver;
    use crate::progression::{Chord, EnvelopeParams};
    use approx::assert_abs_diff_eq;

    fn two_chords() -> Progression {
        Progression::builder("pair")
            .chord(Chord::labeled("C", [261.63, 329.63, 392.00]))
            .chord(Chord::labeled("G", [392.00, 493.88, 587.33]))
            .chord_durations([0.1, 0.05])
            .volume(0.4)
            .bass(2.0, 0.25)
            .envelope(EnvelopeParams {
                attack: 0.01,
                decay: 0.01,
                sustain: 0.6,
                release: 0.02,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn render_concatenates_chords_in_order() {
        let p = two_chords();
        let engine = AudioEngine::new(44100);
        let track = engine.render(&p, &NullObserver).unwrap();
        assert_eq!(track.len(), 4410 + 2205);

        let mut first = mixer::mix_chord(&p.chords()[0].pitches, 0.1, 44100, 0.4, p.bass()).unwrap();
        envelope::apply_envelope(&mut first, p.envelope(), 44100).unwrap();
        let mut second = mixer::mix_chord(&p.chords()[1].pitches, 0.05, 44100, 0.4, p.bass()).unwrap();
        envelope::apply_envelope(&mut second, p.envelope(), 44100).unwrap();

        assert_eq!(&track[..4410], first.as_slice());
        assert_eq!(&track[4410..], second.as_slice());
    }

    #[test]
    fn each_chord_starts_silent() {
        let track = AudioEngine::new(44100).render(&two_chords(), &NullObserver).unwrap();
        // Attack starts at gain 0 on every chord.
        assert_eq!(track[0], 0.0);
        assert_eq!(track[4410], 0.0);
    }

    #[test]
    fn render_track_normalizes_to_ceiling() {
        let engine = AudioEngine::new(44100).with_ceiling(0.8);
        let track = engine.render_track(&two_chords(), &NullObserver).unwrap();
        assert_abs_diff_eq!(peak(&track.samples), 0.8, epsilon = 1e-12);
        assert!(matches!(track.normalization, Normalization::Scaled { .. }));
        assert_abs_diff_eq!(track.duration_seconds(), 0.15, epsilon = 1e-9);
    }

    #[test]
    fn silent_progression_stays_silent() {
        let p = Progression::builder("hush")
            .chord(Chord::new([440.0]))
            .total_duration(0.01)
            .volume(0.0)
            .build()
            .unwrap();
        let track = AudioEngine::new(8000).render_track(&p, &NullObserver).unwrap();
        assert_eq!(track.normalization, Normalization::Silent);
        assert!(track.samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn pcm_peak_matches_ceiling() {
        let pcm = AudioEngine::new(22050)
            .render_pcm_i16(&two_chords(), &NullObserver)
            .unwrap();
        let max = pcm.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert_eq!(max, (0.8f64 * 32767.0).round() as u16);
    }

    #[test]
    fn observer_sees_each_stage() {
        let obs = RecordingObserver::default();
        AudioEngine::new(44100).render_track(&two_chords(), &obs).unwrap();
        assert_eq!(
            obs.take(),
            vec![
                "start pair 2",
                "chord pair 0 4410",
                "chord pair 1 2205",
                "normalized pair scaled",
            ]
        );
    }

    #[test]
    fn short_chords_with_long_envelope_still_render() {
        let p = Progression::builder("blip")
            .chords([Chord::new([440.0]), Chord::new([660.0])])
            .total_duration(0.02)
            .envelope(EnvelopeParams {
                attack: 0.5,
                decay: 0.3,
                sustain: 0.4,
                release: 1.0,
            })
            .build()
            .unwrap();
        let track = AudioEngine::new(44100).render_track(&p, &NullObserver).unwrap();
        assert_eq!(track.samples.len(), 882);
        assert!(track.samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn huge_durations_are_rejected_before_rendering() {
        let json = r#"{
            "name": "endless",
            "chords": [{ "pitches": [261.63] }, { "pitches": [392.0] }],
            "timing": { "per_chord": [1e300, 1e300] },
            "volume": 0.4
        }"#;
        let p = Progression::from_json(json).unwrap();
        let obs = RecordingObserver::default();
        let result = AudioEngine::new(44100).render(&p, &obs);
        assert!(matches!(result, Err(SynthError::InvalidParameter { name: "duration", .. })));
        assert!(obs.take().is_empty());

        let p = Progression::builder("endless")
            .chord(Chord::new([261.63]))
            .total_duration(1e300)
            .build()
            .unwrap();
        assert!(AudioEngine::new(44100).render_track(&p, &NullObserver).is_err());
    }

    #[test]
    fn chords_that_only_overflow_together_are_rejected() {
        // Each chord fits on its own; the pair does not.
        let seconds = (MAX_SAMPLES as f64 * 0.6 / 44100.0).floor();
        let p = Progression::builder("long")
            .chords([Chord::new([261.63]), Chord::new([392.0])])
            .chord_durations([seconds, seconds])
            .build()
            .unwrap();
        assert!(matches!(
            AudioEngine::new(44100).render(&p, &NullObserver),
            Err(SynthError::InvalidParameter { name: "duration", .. })
        ));
    }

    #[test]
    fn zero_sample_rate_rejected() {
        assert!(AudioEngine::new(0).render(&two_chords(), &NullObserver).is_err());
    }
}
