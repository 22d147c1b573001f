// src/node.rs

use crate::audio_buffer::AudioBuffer;
use crate::params::ParamId;

/// Context passed to nodes during processing.
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext {
    /// Number of frames to process
    pub frames: usize,

    /// Sample rate
    pub sample_rate: f64,

    /// Position of the first frame since the last prepare
    pub sample_pos: u64,
}

impl ProcessContext {
    pub fn new(frames: usize, sample_rate: f64, sample_pos: u64) -> Self {
        Self {
            frames,
            sample_rate,
            sample_pos,
        }
    }
}

/// Core DSP node trait.
///
/// Nodes:
/// - do NOT allocate outside `prepare`
/// - do NOT block
/// - ONLY process audio for the given context
pub trait Node: Send {
    /// Called before playback starts and whenever the host restarts audio.
    fn prepare(&mut self, sample_rate: f64, max_block: usize);

    /// Process audio from `input` into `output`.
    ///
    /// Returns `true` if the output is silent (optimization hint).
    fn process(
        &mut self,
        ctx: &ProcessContext,
        input: &AudioBuffer,
        output: &mut AudioBuffer,
    ) -> bool;

    /// Number of output channels.
    fn num_channels(&self) -> usize;

    /// Set a parameter value. Unknown ids are ignored.
    fn set_param(&mut self, param_id: ParamId, value: f32);

    /// Reset node state (buffers, phases) without reallocating.
    fn reset(&mut self) {}
}
