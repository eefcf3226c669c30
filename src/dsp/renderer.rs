//! WAV renderer: renders a Progression to a WAV byte buffer or file.

use std::path::Path;

use crate::config::SynthConfig;
use crate::error::Result;
use crate::observer::RenderObserver;
use crate::progression::Progression;

use super::engine::AudioEngine;
use super::wav::{encode_wav, write_wav};

fn engine_for(config: &SynthConfig) -> Result<AudioEngine> {
    config.validate()?;
    Ok(AudioEngine::new(config.sample_rate).with_ceiling(config.ceiling))
}

/// Render a progression to a WAV file as bytes (16-bit mono PCM).
pub fn render_wav(progression: &Progression, config: &SynthConfig, observer: &dyn RenderObserver) -> Result<Vec<u8>> {
    let track = engine_for(config)?.render_track(progression, observer)?;
    let wav = encode_wav(&track.samples, config.wav_format())?;
    observer.track_encoded(progression.name(), wav.len());
    Ok(wav)
}

/// Render a progression and write it to `path`. Returns the bytes written.
///
/// Nothing is written unless rendering and encoding both succeed.
pub fn write_track(
    path: &Path,
    progression: &Progression,
    config: &SynthConfig,
    observer: &dyn RenderObserver,
) -> Result<u64> {
    let wav = render_wav(progression, config, observer)?;
    let written = write_wav(path, &wav)?;
    observer.track_written(progression.name(), path, written);
    Ok(written)
}
