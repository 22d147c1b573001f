//! Thread-safe bridge between the control thread and the audio thread.
//!
//! # Architecture
//!
//! - **Control thread** (UI, host parameter callbacks) owns a [`ControlHandle`]
//! - **Audio thread** owns the [`EngineHandle`] and with it the [`PitchShifter`]
//! - Parameters travel through [`SharedParams`] atomics; readback travels the
//!   other way through [`SharedReadback`]. Neither side ever takes a lock.
//!
//! A parameter written by the control thread is applied by the audio
//! thread at its next block boundary. Values written mid-block wait for the
//! following block.
//!
//! # Usage
//!
//! ```
//! use phasorshift::{AudioBuffer, HarmonyPreset, PitchShifter, create_bridge};
//!
//! let (control, mut engine) = create_bridge(PitchShifter::new(2));
//! engine.prepare(48_000.0, 256).unwrap();
//!
//! // Control thread
//! control.apply_preset(HarmonyPreset::MajorThird);
//!
//! // Audio thread, once per host block
//! let mut block = vec![0.0_f32; 2 * 256];
//! engine.process_block(&mut AudioBuffer::new(&mut block, 2));
//! assert_eq!(control.readback().sample_position, 256);
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use atomic_float::AtomicF32;

use crate::audio_buffer::AudioBuffer;
use crate::engine::{NUM_VOICES, PitchShifter, PrepareError};
use crate::params::{self, ParamId, SharedParams};
use crate::presets::HarmonyPreset;

/// Lock-free shared state for engine -> control readback.
#[derive(Debug)]
struct SharedReadback {
    sample_position: AtomicU64,
    output_peak: AtomicF32,
    prepared: AtomicBool,
}

impl SharedReadback {
    fn new() -> Self {
        Self {
            sample_position: AtomicU64::new(0),
            output_peak: AtomicF32::new(0.0),
            prepared: AtomicBool::new(false),
        }
    }
}

/// Snapshot of engine state for meters and displays.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineReadback {
    /// Frames processed since the last prepare.
    pub sample_position: u64,
    /// Peak absolute output level of the last block.
    pub output_peak: f32,
    pub prepared: bool,
}

/// Create a linked pair of handles for control and audio threads.
///
/// The shared parameters start from the engine's current settings.
pub fn create_bridge(engine: PitchShifter) -> (ControlHandle, EngineHandle) {
    let shared = Arc::new(SharedParams::new());
    let mut applied_transpositions = [0.0; NUM_VOICES];
    for (voice, applied) in applied_transpositions.iter_mut().enumerate() {
        *applied = engine.voice_transposition(voice).unwrap_or(0.0);
        shared.set_transposition(voice, *applied);
    }
    let applied_window = engine.window_size_ms() as f32;
    shared.set_window_size_ms(applied_window);

    let readback = Arc::new(SharedReadback::new());
    readback.prepared.store(engine.is_prepared(), Ordering::Release);

    let control = ControlHandle {
        params: Arc::clone(&shared),
        readback: Arc::clone(&readback),
    };

    let engine = EngineHandle {
        engine,
        params: shared,
        readback,
        applied_transpositions,
        applied_window,
    };

    (control, engine)
}

// ═══════════════════════════════════════════════════════════════════
// ControlHandle - control thread API
// ═══════════════════════════════════════════════════════════════════

/// Handle for the control thread. Cheap to clone; every clone talks to
/// the same engine.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    params: Arc<SharedParams>,
    readback: Arc<SharedReadback>,
}

impl ControlHandle {
    /// Set a voice's transposition in semitones.
    ///
    /// Values outside ±12 are clamped. Returns `false` for an unknown
    /// voice or a non-finite value.
    pub fn set_voice_transposition(&self, voice: usize, semitones: f32) -> bool {
        match params::transposition_param(voice) {
            Some(id) => self.set_param(id, semitones),
            None => {
                log::warn!("Ignoring transposition for unknown voice {}", voice);
                false
            }
        }
    }

    /// Set the shared window size in milliseconds (5 - 300).
    pub fn set_window_size_ms(&self, ms: f32) -> bool {
        self.set_param(params::WINDOW_SIZE, ms)
    }

    /// Set any parameter by id, clamped to its declared range.
    pub fn set_param(&self, id: ParamId, value: f32) -> bool {
        let Some(info) = params::param_info(id) else {
            log::warn!("Ignoring unknown parameter {}", id);
            return false;
        };

        if !value.is_finite() {
            log::warn!("Ignoring non-finite value for {}", info.name);
            return false;
        }

        let clamped = info.clamp(value);
        if clamped != value {
            log::warn!(
                "{} out of range: {} clamped to {}",
                info.name,
                value,
                info.format(clamped)
            );
        }

        match id {
            params::WINDOW_SIZE => self.params.set_window_size_ms(clamped),
            _ => self
                .params
                .set_transposition((id - params::TRANSPOSITION_1) as usize, clamped),
        }
        true
    }

    /// Load a preset's intervals into the three voices.
    pub fn apply_preset(&self, preset: HarmonyPreset) {
        for (voice, semitones) in preset.transpositions().into_iter().enumerate() {
            self.params.set_transposition(voice, semitones);
        }
        log::debug!("Applied preset {}", preset);
    }

    /// Apply a preset by its numeric id. Returns `false` for unknown ids.
    pub fn apply_preset_id(&self, id: u32) -> bool {
        match HarmonyPreset::from_id(id) {
            Some(preset) => {
                self.apply_preset(preset);
                true
            }
            None => {
                log::warn!("Unknown preset id {}", id);
                false
            }
        }
    }

    /// Most recently requested value of a parameter.
    pub fn param(&self, id: ParamId) -> Option<f32> {
        self.params.get(id)
    }

    pub fn voice_transposition(&self, voice: usize) -> f32 {
        self.params.transposition(voice)
    }

    pub fn window_size_ms(&self) -> f32 {
        self.params.window_size_ms()
    }

    /// Read the latest engine state.
    pub fn readback(&self) -> EngineReadback {
        EngineReadback {
            sample_position: self.readback.sample_position.load(Ordering::Acquire),
            output_peak: self.readback.output_peak.load(Ordering::Acquire),
            prepared: self.readback.prepared.load(Ordering::Acquire),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// EngineHandle - audio thread API
// ═══════════════════════════════════════════════════════════════════

/// Handle for the audio thread, owning the engine.
pub struct EngineHandle {
    engine: PitchShifter,
    params: Arc<SharedParams>,
    readback: Arc<SharedReadback>,

    /// Values last pushed into the engine
    applied_transpositions: [f32; NUM_VOICES],
    applied_window: f32,
}

impl EngineHandle {
    /// Prepare the engine. Only call while no block is being processed.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) -> Result<(), PrepareError> {
        self.sync_params();
        let result = self.engine.prepare(sample_rate, block_size);

        self.readback.sample_position.store(0, Ordering::Release);
        self.readback.output_peak.store(0.0, Ordering::Release);
        self.readback
            .prepared
            .store(self.engine.is_prepared(), Ordering::Release);

        result
    }

    /// Apply pending parameter changes, then process one block in place.
    pub fn process_block(&mut self, buffer: &mut AudioBuffer) {
        self.sync_params();
        self.engine.process_block(buffer);
        self.publish(buffer.peak());
    }

    /// Process a host block of any length in place.
    ///
    /// Blocks longer than the prepared size are staged through `scratch`
    /// (at least `channels * block_size` floats) in prepared-size pieces.
    /// Parameters are applied once before the first piece and the readback
    /// peak covers the whole host block. Channels `scratch` cannot hold
    /// are cleared.
    pub fn process_split(&mut self, buffer: &mut AudioBuffer, scratch: &mut [f32]) {
        let block = self.engine.block_size();
        let frames = buffer.frames;
        if block == 0 || frames <= block {
            self.process_block(buffer);
            return;
        }

        self.sync_params();

        let staged_channels = buffer.channels.min(scratch.len() / block);
        let mut peak = 0.0_f32;
        let mut offset = 0;
        while offset < frames {
            let chunk = (frames - offset).min(block);
            let staged = &mut scratch[..staged_channels * chunk];

            for ch in 0..staged_channels {
                staged[ch * chunk..(ch + 1) * chunk]
                    .copy_from_slice(&buffer.channel(ch)[offset..offset + chunk]);
            }

            let mut piece = AudioBuffer::new(&mut *staged, staged_channels);
            self.engine.process_block(&mut piece);
            peak = peak.max(piece.peak());

            for ch in 0..staged_channels {
                buffer.channel_mut(ch)[offset..offset + chunk]
                    .copy_from_slice(&staged[ch * chunk..(ch + 1) * chunk]);
            }

            offset += chunk;
        }

        for ch in staged_channels..buffer.channels {
            buffer.channel_mut(ch).fill(0.0);
        }

        self.publish(peak);
    }

    #[inline]
    fn publish(&self, peak: f32) {
        self.readback
            .sample_position
            .store(self.engine.sample_pos(), Ordering::Release);
        self.readback.output_peak.store(peak, Ordering::Release);
    }

    /// Pull parameter values from the control thread.
    ///
    /// Only changed values are pushed, so an idle control thread costs
    /// four atomic loads per block.
    #[inline]
    pub fn sync_params(&mut self) {
        for voice in 0..NUM_VOICES {
            let semitones = self.params.transposition(voice);
            if semitones != self.applied_transpositions[voice] {
                self.engine.set_voice_transposition(voice, semitones);
                self.applied_transpositions[voice] = semitones;
            }
        }

        let window = self.params.window_size_ms();
        if window != self.applied_window {
            self.engine.set_window_size_ms(window as f64);
            self.applied_window = window;
        }
    }

    pub fn engine(&self) -> &PitchShifter {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PitchShifter {
        &mut self.engine
    }
}
