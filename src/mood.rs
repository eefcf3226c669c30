//! The three story-music moods and their progressions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::progression::{Chord, EnvelopeParams, Progression};

// ── Chord voicings (Hz) ─────────────────────────────────────

const C_MAJOR: [f64; 3] = [261.63, 329.63, 392.00];
const G_MAJOR: [f64; 3] = [392.00, 493.88, 587.33];
const A_MINOR: [f64; 3] = [220.00, 261.63, 329.63];
const F_MAJOR: [f64; 3] = [349.23, 440.00, 523.25];
const D_MINOR: [f64; 3] = [293.66, 349.23, 440.00];
const E_MINOR: [f64; 3] = [329.63, 392.00, 493.88];
const C_MAJOR_HIGH: [f64; 3] = [523.25, 659.25, 783.99];

/// A named story track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Orchestral I-V-vi-IV for the prologue and interludes.
    Epic,
    /// Minor i-iv-v-i for the game-over story.
    Sad,
    /// Major fanfare for the victory story.
    Triumph,
}

impl Mood {
    pub const ALL: [Mood; 3] = [Mood::Epic, Mood::Sad, Mood::Triumph];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Epic => "epic",
            Mood::Sad => "sad",
            Mood::Triumph => "triumph",
        }
    }

    /// Output file name, e.g. `story_epic.wav`.
    pub fn file_name(self) -> String {
        format!("story_{}.wav", self.name())
    }

    /// Where the game plays this track.
    pub fn usage(self) -> &'static str {
        match self {
            Mood::Epic => "Prologue & Interludes",
            Mood::Sad => "Mission Failed",
            Mood::Triumph => "Victory",
        }
    }

    /// The mood's progression stretched over `track_seconds`.
    pub fn progression(self, track_seconds: f64) -> Result<Progression> {
        let builder = Progression::builder(self.name()).total_duration(track_seconds);
        match self {
            Mood::Epic => builder
                .chords([
                    Chord::labeled("C major", C_MAJOR),
                    Chord::labeled("G major", G_MAJOR),
                    Chord::labeled("A minor", A_MINOR),
                    Chord::labeled("F major", F_MAJOR),
                ])
                .volume(0.4)
                .bass(2.0, 0.25)
                .envelope(EnvelopeParams {
                    attack: 0.3,
                    decay: 0.2,
                    sustain: 0.6,
                    release: 0.5,
                })
                .build(),
            // Slower swells, quieter, with a sub two octaves down for weight.
            Mood::Sad => builder
                .chords([
                    Chord::labeled("A minor", A_MINOR),
                    Chord::labeled("D minor", D_MINOR),
                    Chord::labeled("E minor", E_MINOR),
                    Chord::labeled("A minor", A_MINOR),
                ])
                .volume(0.3)
                .bass(4.0, 0.15)
                .envelope(EnvelopeParams {
                    attack: 0.5,
                    decay: 0.3,
                    sustain: 0.4,
                    release: 1.0,
                })
                .build(),
            // Fast attack, punchy bass.
            Mood::Triumph => builder
                .chords([
                    Chord::labeled("C major", C_MAJOR),
                    Chord::labeled("G major", G_MAJOR),
                    Chord::labeled("C major (high)", C_MAJOR_HIGH),
                    Chord::labeled("F major", F_MAJOR),
                    Chord::labeled("G major", G_MAJOR),
                    Chord::labeled("C major (high)", C_MAJOR_HIGH),
                ])
                .volume(0.45)
                .bass(2.0, 0.3)
                .envelope(EnvelopeParams {
                    attack: 0.1,
                    decay: 0.1,
                    sustain: 0.8,
                    release: 0.3,
                })
                .build(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        Mood::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SynthError::UnknownMood(s.to_string()))
    }
}
