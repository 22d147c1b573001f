//! WebAssembly bindings via wasm-bindgen for browser integration.
//!
//! This module is only compiled when the `web` feature is enabled.
//!
//! # Usage
//!
//! Build with wasm-pack:
//! ```bash
//! wasm-pack build --target web --features web
//! ```
//!
//! # JavaScript Example
//!
//! ```javascript
//! import init, { phasorshift_init, PitchShiftEngine } from './phasorshift.js';
//!
//! await init();
//! phasorshift_init();
//!
//! const engine = new PitchShiftEngine(2);
//! engine.prepare(sampleRate, 128);
//! engine.apply_preset(2); // major 3rd
//!
//! // In the AudioWorklet: planar [L0..L127, R0..R127]
//! engine.process(block, 2);
//! ```

use wasm_bindgen::prelude::*;

use crate::audio_buffer::AudioBuffer;
use crate::bridge::{ControlHandle, EngineHandle, create_bridge};
use crate::engine::PitchShifter;

// ═══════════════════════════════════════════════════════════════════════════
// Initialization
// ═══════════════════════════════════════════════════════════════════════════

/// Initialize the wasm module. Call this once before using any other functions.
/// Sets up panic hooks and console logging.
#[wasm_bindgen]
pub fn phasorshift_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

// ═══════════════════════════════════════════════════════════════════════════
// Readback
// ═══════════════════════════════════════════════════════════════════════════

/// Engine state for meters.
#[wasm_bindgen]
#[derive(Clone, Copy, Default)]
pub struct PitchShiftReadback {
    /// Frames processed since the last prepare.
    pub sample_position: u64,
    /// Peak output level of the last block.
    pub output_peak: f32,
    pub prepared: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════════════════════

/// Pitch shifter for a browser AudioWorklet.
///
/// The worklet owns the engine; parameter setters write through the same
/// lock-free store a native control thread would use.
#[wasm_bindgen]
pub struct PitchShiftEngine {
    inner: EngineHandle,
    control: ControlHandle,
}

#[wasm_bindgen]
impl PitchShiftEngine {
    /// Create an engine for `channels` audio channels.
    #[wasm_bindgen(constructor)]
    pub fn new(channels: u32) -> PitchShiftEngine {
        let (control, inner) = create_bridge(PitchShifter::new(channels.max(1) as usize));
        Self { inner, control }
    }

    /// Prepare for playback. Returns false for an invalid configuration.
    pub fn prepare(&mut self, sample_rate: f64, block_size: u32) -> bool {
        match self.inner.prepare(sample_rate, block_size as usize) {
            Ok(()) => true,
            Err(e) => {
                log::error!("prepare failed: {}", e);
                false
            }
        }
    }

    /// Process one planar block in place.
    pub fn process(&mut self, data: &mut [f32], channels: u32) {
        self.inner
            .process_block(&mut AudioBuffer::new(data, channels as usize));
    }

    pub fn set_transposition(&self, voice: u32, semitones: f32) -> bool {
        self.control.set_voice_transposition(voice as usize, semitones)
    }

    pub fn set_window_size(&self, ms: f32) -> bool {
        self.control.set_window_size_ms(ms)
    }

    pub fn set_param(&self, param_id: u32, value: f32) -> bool {
        self.control.set_param(param_id, value)
    }

    /// Apply a harmony preset by id (1-4).
    pub fn apply_preset(&self, preset_id: u32) -> bool {
        self.control.apply_preset_id(preset_id)
    }

    pub fn readback(&self) -> PitchShiftReadback {
        let r = self.control.readback();
        PitchShiftReadback {
            sample_position: r.sample_position,
            output_peak: r.output_peak,
            prepared: r.prepared,
        }
    }
}
