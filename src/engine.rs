// src/engine.rs
//
// Delay-line pitch shifter with two crossfaded readers per voice.

use std::fmt;

use crate::audio_buffer::AudioBuffer;
use crate::grain::{Grain, reader_b_phase};
use crate::node::{Node, ProcessContext};
use crate::params::{self, ParamId};
use crate::phasor::{Phasor, PhasorShape};
use crate::presets::HarmonyPreset;
use crate::ring_buffer::RingBuffer;
use crate::utilities::{db_to_gain, seconds_to_samples};
use crate::voice::Voice;

// ═══════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════

pub const NUM_VOICES: usize = 3;

/// Compensates for the summed readers and voices.
pub const OUTPUT_GAIN_DB: f32 = -6.0;

pub const MIN_WINDOW_MS: f64 = 5.0;
pub const MAX_WINDOW_MS: f64 = 300.0;
pub const DEFAULT_WINDOW_MS: f64 = 50.0;

/// Minimum ring length; far more than the largest window needs.
const RING_SECONDS: f64 = 1.0;
const RING_MARGIN_SAMPLES: usize = 64;

// ═══════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════

/// Invalid arguments to [`PitchShifter::prepare`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrepareError {
    /// Sample rate is zero, negative or not finite.
    InvalidSampleRate(f64),

    /// Block size is zero.
    InvalidBlockSize,

    /// The engine was created without audio channels.
    NoChannels,
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareError::InvalidSampleRate(sr) => write!(f, "Invalid sample rate {}", sr),
            PrepareError::InvalidBlockSize => write!(f, "Block size must be at least one frame"),
            PrepareError::NoChannels => write!(f, "Engine has no audio channels"),
        }
    }
}

impl std::error::Error for PrepareError {}

// ═══════════════════════════════════════════════════════════════════
// Pitch Shifter
// ═══════════════════════════════════════════════════════════════════

/// Real-time multi-voice pitch shifter.
///
/// Every input block is written into a ring buffer. Each voice then reads
/// the ring through two taps whose delay ramps from zero to the window
/// length, driven by the voice's phasor. Tap B runs half a cycle away from
/// tap A and both are shaped by a half-sine window, so one tap is always
/// fading in while the other resets.
///
/// `process_block` does not allocate, lock or log. Everything that
/// allocates happens in `new` and `prepare`, which the host must only call
/// while the audio thread is idle.
pub struct PitchShifter {
    channels: usize,
    sample_rate: f64,
    block_size: usize,

    window_size_ms: f64,
    window_samples: usize,

    voices: Vec<Voice>,
    ring: RingBuffer,

    output_gain: f32,
    prepared: bool,

    /// Frames processed since the last prepare
    sample_pos: u64,
}

impl PitchShifter {
    pub fn new(channels: usize) -> Self {
        let mut shifter = Self {
            channels,
            sample_rate: 48_000.0,
            block_size: 0,
            window_size_ms: DEFAULT_WINDOW_MS,
            window_samples: 0,
            voices: (0..NUM_VOICES).map(|id| Voice::new(id, channels)).collect(),
            ring: RingBuffer::new(),
            output_gain: db_to_gain(OUTPUT_GAIN_DB),
            prepared: false,
            sample_pos: 0,
        };
        shifter.update_window_samples();
        shifter.retune_all();
        shifter
    }

    /// Size and clear all state for a sample rate and maximum block size.
    ///
    /// Destroys buffered audio and phasor phases. Calling it again with
    /// the same arguments yields the same zero state.
    pub fn prepare(&mut self, sample_rate: f64, block_size: usize) -> Result<(), PrepareError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        if block_size == 0 {
            return Err(PrepareError::InvalidBlockSize);
        }
        if self.channels == 0 {
            return Err(PrepareError::NoChannels);
        }

        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.update_window_samples();

        let capacity = Self::ring_capacity_for(sample_rate, block_size);
        self.ring.configure(self.channels, capacity);
        self.ring.init();

        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
        self.retune_all();

        self.sample_pos = 0;
        self.prepared = true;

        log::info!(
            "pitch shifter prepared: {} Hz, block {}, {} ch, ring {} samples, window {} samples",
            sample_rate,
            block_size,
            self.channels,
            capacity,
            self.window_samples
        );

        Ok(())
    }

    /// Ring length: one second, or whatever the largest window needs if
    /// that is longer.
    fn ring_capacity_for(sample_rate: f64, block_size: usize) -> usize {
        let max_window = seconds_to_samples(MAX_WINDOW_MS / 1000.0, sample_rate);
        let needed = 2 * max_window + block_size + RING_MARGIN_SAMPLES;
        seconds_to_samples(RING_SECONDS, sample_rate).max(needed)
    }

    // ───────────────────────────────────────────────────────────────
    // Parameters
    // ───────────────────────────────────────────────────────────────

    /// Set one voice's transposition in semitones (clamped to ±12).
    /// Unknown voice indices and non-finite values are ignored.
    pub fn set_voice_transposition(&mut self, voice: usize, semitones: f32) {
        if !semitones.is_finite() {
            return;
        }
        let window_ms = self.window_size_ms;
        if let Some(v) = self.voices.get_mut(voice) {
            v.set_transposition(semitones, window_ms);
        }
    }

    /// Set the shared window size in milliseconds (clamped to 5 - 300).
    /// Non-finite values are ignored.
    pub fn set_window_size_ms(&mut self, ms: f64) {
        if !ms.is_finite() {
            return;
        }
        self.window_size_ms = ms.clamp(MIN_WINDOW_MS, MAX_WINDOW_MS);
        self.update_window_samples();
        self.retune_all();
    }

    /// Load a preset's intervals into the three voices.
    pub fn apply_preset(&mut self, preset: HarmonyPreset) {
        for (voice, semitones) in preset.transpositions().into_iter().enumerate() {
            self.set_voice_transposition(voice, semitones);
        }
    }

    /// Toggle phasor cycle logging on every voice.
    pub fn set_phasor_debug(&mut self, debug: bool) {
        for voice in &mut self.voices {
            voice.set_debug(debug);
        }
    }

    /// Change the phasor waveform. The grain math assumes
    /// [`PhasorShape::Saw`], which `prepare` restores.
    pub fn set_phasor_shape(&mut self, shape: PhasorShape) {
        for voice in &mut self.voices {
            voice.set_shape(shape);
        }
    }

    #[inline]
    fn update_window_samples(&mut self) {
        self.window_samples = seconds_to_samples(self.window_size_ms / 1000.0, self.sample_rate);
    }

    #[inline]
    fn retune_all(&mut self) {
        let window_ms = self.window_size_ms;
        for voice in &mut self.voices {
            voice.retune(window_ms);
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn window_size_ms(&self) -> f64 {
        self.window_size_ms
    }

    pub fn window_samples(&self) -> usize {
        self.window_samples
    }

    pub fn ring_capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn sample_pos(&self) -> u64 {
        self.sample_pos
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    pub fn voice_transposition(&self, index: usize) -> Option<f32> {
        self.voices.get(index).map(Voice::transposition)
    }

    // ───────────────────────────────────────────────────────────────
    // Processing
    // ───────────────────────────────────────────────────────────────

    /// Replace one block of planar audio with its pitch-shifted version.
    pub fn process_block(&mut self, buffer: &mut AudioBuffer) {
        let frames = buffer.frames;
        self.render(buffer, frames);
    }

    /// Process the first `frames` of every channel. Everything after them
    /// is cleared.
    fn render(&mut self, buffer: &mut AudioBuffer, frames: usize) {
        if !self.prepared {
            buffer.clear();
            return;
        }

        let frames = frames.min(buffer.frames);

        // The furthest read is frame 0 delayed by two windows. A host
        // block larger than prepared could reach past the ring.
        if frames + 2 * self.window_samples + 1 > self.ring.capacity() {
            buffer.clear();
            return;
        }

        self.ring.write_frames(buffer, frames);
        buffer.clear();

        let window = self.window_samples as f64;
        let channels = self.channels.min(buffer.channels);

        for ch in 0..channels {
            let out = &mut buffer.channel_mut(ch)[..frames];
            for (i, sample) in out.iter_mut().enumerate() {
                // Taps start one full window behind the write position
                let index = i as f64 - window;

                let mut acc = 0.0_f64;
                for voice in &mut self.voices {
                    acc += read_voice(&self.ring, voice.phasor_mut(ch), ch, index, window);
                }
                *sample = acc as f32;
            }
        }

        buffer.apply_gain(self.output_gain);
        self.sample_pos += frames as u64;
    }
}

/// Both taps of one voice for one sample. Advances the phasor once.
#[inline(always)]
fn read_voice(ring: &RingBuffer, phasor: &mut Phasor, channel: usize, index: f64, window: f64) -> f64 {
    let phase_a = phasor.next_sample();
    let phase_b = reader_b_phase(phase_a);

    let a = Grain::at(phase_a, window);
    let b = Grain::at(phase_b, window);

    let sample_a = ring.read_interpolated(channel, index, a.delay) as f64 * a.gain;
    let sample_b = ring.read_interpolated(channel, index, b.delay) as f64 * b.gain;

    sample_a + sample_b
}

// ═══════════════════════════════════════════════════════════════════
// Node
// ═══════════════════════════════════════════════════════════════════

impl Node for PitchShifter {
    fn prepare(&mut self, sample_rate: f64, max_block: usize) {
        if let Err(e) = PitchShifter::prepare(self, sample_rate, max_block) {
            log::error!("Failed to prepare pitch shifter: {}", e);
        }
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        input: &AudioBuffer,
        output: &mut AudioBuffer,
    ) -> bool {
        let frames = ctx.frames.min(output.frames).min(input.frames);

        for ch in 0..output.channels {
            let out = output.channel_mut(ch);
            if ch < input.channels {
                out[..frames].copy_from_slice(&input.channel(ch)[..frames]);
                out[frames..].fill(0.0);
            } else {
                out.fill(0.0);
            }
        }

        self.render(output, frames);
        output.peak() == 0.0
    }

    fn num_channels(&self) -> usize {
        self.channels
    }

    fn set_param(&mut self, param_id: ParamId, value: f32) {
        match param_id {
            params::TRANSPOSITION_1..=params::TRANSPOSITION_3 => {
                self.set_voice_transposition((param_id - params::TRANSPOSITION_1) as usize, value);
            }
            params::WINDOW_SIZE => self.set_window_size_ms(value as f64),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.ring.init();
        let sample_rate = self.sample_rate;
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
        self.sample_pos = 0;
    }
}
