//! Progress reporting hooks.
//!
//! The pipeline calls a [`RenderObserver`] at each stage boundary instead of
//! printing, so rendering stays pure and callers decide where progress goes.

use std::path::Path;

use crate::dsp::normalize::Normalization;
use crate::progression::Chord;

/// Stage-boundary callbacks. Every method defaults to doing nothing.
pub trait RenderObserver: Send + Sync {
    /// A progression is about to be sequenced.
    fn track_started(&self, _track: &str, _chords: usize, _seconds: f64) {}

    /// Chord `index` was mixed, shaped and appended.
    fn chord_rendered(&self, _track: &str, _index: usize, _chord: &Chord, _samples: usize) {}

    /// The concatenated track went through the normalizer.
    fn track_normalized(&self, _track: &str, _result: &Normalization) {}

    /// The track was encoded to a WAV byte stream.
    fn track_encoded(&self, _track: &str, _bytes: usize) {}

    /// The encoded track landed on disk.
    fn track_written(&self, _track: &str, _path: &Path, _bytes: u64) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl RenderObserver for NullObserver {}

/// Forwards notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RenderObserver for TracingObserver {
    fn track_started(&self, track: &str, chords: usize, seconds: f64) {
        tracing::info!("Generating {track} music ({chords} chords, {seconds:.1}s)...");
    }

    fn chord_rendered(&self, track: &str, index: usize, chord: &Chord, samples: usize) {
        let label = chord.label.as_deref().unwrap_or("chord");
        tracing::debug!("{track}: {label} #{index} -> {samples} samples");
    }

    fn track_normalized(&self, track: &str, result: &Normalization) {
        match result {
            Normalization::Scaled { peak, gain } => {
                tracing::debug!("{track}: peak {peak:.4}, gain {gain:.4}")
            }
            Normalization::Silent => tracing::warn!("{track}: track is silent, skipped normalization"),
        }
    }

    fn track_encoded(&self, track: &str, bytes: usize) {
        tracing::debug!("{track}: encoded {bytes} bytes");
    }

    fn track_written(&self, track: &str, path: &Path, bytes: u64) {
        tracing::info!("Created: {} ({track}, {bytes} bytes)", path.display());
    }
}
