pub mod config;
pub mod dsp;
pub mod error;
pub mod mood;
pub mod observer;
pub mod progression;

pub use config::SynthConfig;
pub use dsp::engine::{AudioEngine, Track};
pub use dsp::renderer::{render_wav, write_track};
pub use error::SynthError;
pub use mood::Mood;
pub use observer::{NullObserver, RenderObserver, TracingObserver};
pub use progression::{BassVoice, Chord, EnvelopeParams, Progression, ProgressionRecipe, Timing};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the starfall_music version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_err(e: SynthError) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// WASM-exposed: the progression recipe of a mood (default 30 s track).
#[wasm_bindgen]
pub fn mood_recipe(mood: &str) -> Result<JsValue, JsValue> {
    let mood: Mood = mood.parse().map_err(js_err)?;
    let progression = mood
        .progression(SynthConfig::default().track_seconds)
        .map_err(js_err)?;
    serde_wasm_bindgen::to_value(&progression).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: render a mood to a WAV byte array.
#[wasm_bindgen]
pub fn render_mood_wav(mood: &str, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let mood: Mood = mood.parse().map_err(js_err)?;
    let config = SynthConfig {
        sample_rate,
        ..SynthConfig::default()
    };
    let progression = mood.progression(config.track_seconds).map_err(js_err)?;
    render_wav(&progression, &config, &NullObserver).map_err(js_err)
}

/// WASM-exposed: render a JSON progression recipe to a WAV byte array.
#[wasm_bindgen]
pub fn render_recipe_wav(recipe_json: &str, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let progression = Progression::from_json(recipe_json).map_err(js_err)?;
    let config = SynthConfig {
        sample_rate,
        ..SynthConfig::default()
    };
    render_wav(&progression, &config, &NullObserver).map_err(js_err)
}
