// src/lib.rs
//
// Library entry point for Rust, C (ffi) and WebAssembly consumers.

mod audio_buffer;
mod bridge;
mod engine;
mod grain;
mod node;
mod params;
mod phasor;
mod presets;
mod ring_buffer;
mod utilities;
mod voice;

pub mod ffi;

#[cfg(feature = "web")]
pub mod wasm;

// Re-export key types for Rust consumers
pub use audio_buffer::AudioBuffer;
pub use bridge::{ControlHandle, EngineHandle, EngineReadback, create_bridge};
pub use engine::{
    DEFAULT_WINDOW_MS, MAX_WINDOW_MS, MIN_WINDOW_MS, NUM_VOICES, OUTPUT_GAIN_DB, PitchShifter,
    PrepareError,
};
pub use grain::{Grain, delay_samples, envelope, reader_b_phase};
pub use node::{Node, ProcessContext};
pub use params::{
    DisplayCurve, ParamId, ParamInfo, ParamUnit, SharedParams, TRANSPOSITION_1, TRANSPOSITION_2,
    TRANSPOSITION_3, WINDOW_SIZE, param_info, param_infos,
};
pub use phasor::{Phasor, PhasorShape};
pub use presets::HarmonyPreset;
pub use ring_buffer::RingBuffer;
pub use utilities::{db_to_gain, seconds_to_samples, transposition_to_frequency};
pub use voice::{MAX_TRANSPOSITION, MIN_TRANSPOSITION, Voice, VoiceId};
