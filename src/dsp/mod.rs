//! DSP Engine: pure Rust offline chord synthesis.
//!
//! Everything here is deterministic: the same progression and settings always
//! produce the same samples and the same WAV bytes.

pub mod engine;
pub mod envelope;
pub mod mixer;
pub mod normalize;
pub mod oscillator;
pub mod renderer;
pub mod wav;
