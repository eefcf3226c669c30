//! Progression data model: the declarative "track recipe".
//!
//! A [`Progression`] is validated once when built (through
//! [`ProgressionBuilder`] or by deserializing a [`ProgressionRecipe`]) and is
//! read-only afterwards. The sequencer never has to re-check it.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError, require_non_negative, require_positive};

// ── Envelope ────────────────────────────────────────────────

/// ADSR contour: stage lengths in seconds plus a sustain level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeParams {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1].
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        EnvelopeParams {
            attack: 0.1,
            decay: 0.1,
            sustain: 0.7,
            release: 0.2,
        }
    }
}

impl EnvelopeParams {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("attack", self.attack)?;
        require_non_negative("decay", self.decay)?;
        require_non_negative("release", self.release)?;
        if !(0.0..=1.0).contains(&self.sustain) {
            return Err(SynthError::invalid("sustain", self.sustain, "must be in [0, 1]"));
        }
        Ok(())
    }

    /// Total length of attack, decay and release in seconds.
    pub fn span(&self) -> f64 {
        self.attack + self.decay + self.release
    }
}

// ── Bass ────────────────────────────────────────────────────

/// Sub-bass voice summed under each chord at `root / divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BassVoice {
    /// 2.0 = one octave below the chord root, 4.0 = two octaves.
    pub divisor: f64,
    /// Fixed amplitude, independent of the chord volume.
    pub amplitude: f64,
}

impl BassVoice {
    pub fn validate(&self) -> Result<()> {
        require_positive("bass divisor", self.divisor)?;
        require_non_negative("bass amplitude", self.amplitude)?;
        Ok(())
    }

    /// Bass frequency under a chord rooted at `root` Hz.
    pub fn frequency(&self, root: f64) -> Result<f64> {
        self.validate()?;
        require_positive("bass frequency", root / self.divisor)
    }
}

// ── Chords & timing ─────────────────────────────────────────

/// Pitches (Hz) sounding together. The first pitch is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Human-readable name for logs, e.g. "A minor".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub pitches: Vec<f64>,
}

impl Chord {
    pub fn new(pitches: impl Into<Vec<f64>>) -> Self {
        Chord {
            label: None,
            pitches: pitches.into(),
        }
    }

    pub fn labeled(label: &str, pitches: impl Into<Vec<f64>>) -> Self {
        Chord {
            label: Some(label.to_string()),
            pitches: pitches.into(),
        }
    }

    pub fn root(&self) -> Option<f64> {
        self.pitches.first().copied()
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.pitches.is_empty() {
            return Err(SynthError::EmptyChord { index });
        }
        for &pitch in &self.pitches {
            require_positive("pitch", pitch)?;
        }
        Ok(())
    }
}

/// How long each chord lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// Total length in seconds, split evenly across the chords.
    Total(f64),
    /// One duration in seconds per chord, in order.
    PerChord(Vec<f64>),
}

// ── Progression ─────────────────────────────────────────────

/// Serialized shape of a progression. Converting it into a [`Progression`]
/// runs full validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecipe {
    pub name: String,
    pub chords: Vec<Chord>,
    pub timing: Timing,
    #[serde(default)]
    pub envelope: EnvelopeParams,
    /// Total chord amplitude, split across the chord's pitches.
    pub volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass: Option<BassVoice>,
}

/// An ordered, validated chord progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProgressionRecipe", into = "ProgressionRecipe")]
pub struct Progression {
    name: String,
    chords: Vec<Chord>,
    durations: Vec<f64>,
    timing: Timing,
    envelope: EnvelopeParams,
    volume: f64,
    bass: Option<BassVoice>,
}

impl Progression {
    pub fn builder(name: &str) -> ProgressionBuilder {
        ProgressionBuilder::new(name)
    }

    /// Parse and validate a JSON recipe.
    pub fn from_json(json: &str) -> Result<Self> {
        let recipe: ProgressionRecipe = serde_json::from_str(json)?;
        Progression::try_from(recipe)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    /// Chords paired with their durations in seconds, in playing order.
    pub fn steps(&self) -> impl Iterator<Item = (&Chord, f64)> {
        self.chords.iter().zip(self.durations.iter().copied())
    }

    pub fn chord_durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn total_seconds(&self) -> f64 {
        self.durations.iter().sum()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn envelope(&self) -> &EnvelopeParams {
        &self.envelope
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn bass(&self) -> Option<&BassVoice> {
        self.bass.as_ref()
    }
}

impl TryFrom<ProgressionRecipe> for Progression {
    type Error = SynthError;

    fn try_from(recipe: ProgressionRecipe) -> Result<Self> {
        if recipe.chords.is_empty() {
            return Err(SynthError::EmptyProgression);
        }
        for (index, chord) in recipe.chords.iter().enumerate() {
            chord.validate(index)?;
        }

        let durations = match &recipe.timing {
            Timing::Total(seconds) => {
                let seconds = require_positive("total duration", *seconds)?;
                vec![seconds / recipe.chords.len() as f64; recipe.chords.len()]
            }
            Timing::PerChord(seconds) => {
                if seconds.len() != recipe.chords.len() {
                    return Err(SynthError::TimingMismatch {
                        chords: recipe.chords.len(),
                        durations: seconds.len(),
                    });
                }
                seconds
                    .iter()
                    .map(|&s| require_positive("chord duration", s))
                    .collect::<Result<Vec<_>>>()?
            }
        };

        recipe.envelope.validate()?;
        require_non_negative("volume", recipe.volume)?;
        if let Some(bass) = &recipe.bass {
            bass.validate()?;
        }

        Ok(Progression {
            name: recipe.name,
            chords: recipe.chords,
            durations,
            timing: recipe.timing,
            envelope: recipe.envelope,
            volume: recipe.volume,
            bass: recipe.bass,
        })
    }
}

impl From<Progression> for ProgressionRecipe {
    fn from(p: Progression) -> Self {
        ProgressionRecipe {
            name: p.name,
            chords: p.chords,
            timing: p.timing,
            envelope: p.envelope,
            volume: p.volume,
            bass: p.bass,
        }
    }
}

/// Incremental construction of a [`Progression`].
#[derive(Debug, Clone)]
pub struct ProgressionBuilder {
    recipe: ProgressionRecipe,
}

impl ProgressionBuilder {
    pub fn new(name: &str) -> Self {
        ProgressionBuilder {
            recipe: ProgressionRecipe {
                name: name.to_string(),
                chords: Vec::new(),
                timing: Timing::Total(0.0),
                envelope: EnvelopeParams::default(),
                volume: 0.2,
                bass: None,
            },
        }
    }

    pub fn chord(mut self, chord: Chord) -> Self {
        self.recipe.chords.push(chord);
        self
    }

    pub fn chords(mut self, chords: impl IntoIterator<Item = Chord>) -> Self {
        self.recipe.chords.extend(chords);
        self
    }

    /// Split `seconds` evenly across all chords.
    pub fn total_duration(mut self, seconds: f64) -> Self {
        self.recipe.timing = Timing::Total(seconds);
        self
    }

    pub fn chord_durations(mut self, seconds: impl Into<Vec<f64>>) -> Self {
        self.recipe.timing = Timing::PerChord(seconds.into());
        self
    }

    pub fn envelope(mut self, envelope: EnvelopeParams) -> Self {
        self.recipe.envelope = envelope;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.recipe.volume = volume;
        self
    }

    pub fn bass(mut self, divisor: f64, amplitude: f64) -> Self {
        self.recipe.bass = Some(BassVoice { divisor, amplitude });
        self
    }

    pub fn build(self) -> Result<Progression> {
        Progression::try_from(self.recipe)
    }
}
