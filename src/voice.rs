use crate::phasor::{Phasor, PhasorShape};
use crate::utilities::transposition_to_frequency;

pub type VoiceId = usize;

/// Transposition range in semitones.
pub const MIN_TRANSPOSITION: f32 = -12.0;
pub const MAX_TRANSPOSITION: f32 = 12.0;

/// One independently tuned pitch-shifted copy of the input.
///
/// Owns the reader-A phasor for every audio channel. Reader B has no
/// state of its own (see [`crate::grain::reader_b_phase`]).
#[derive(Debug)]
pub struct Voice {
    pub id: VoiceId,
    transposition: f32,
    frequency: f64,
    phasors: Vec<Phasor>,
}

impl Voice {
    pub fn new(id: VoiceId, channels: usize) -> Self {
        Self {
            id,
            transposition: 0.0,
            frequency: 0.0,
            phasors: (0..channels).map(|_| Phasor::new(48_000.0)).collect(),
        }
    }

    /// Reset every phasor to a rising ramp at phase zero.
    pub fn prepare(&mut self, sample_rate: f64) {
        for phasor in &mut self.phasors {
            phasor.set_sample_rate(sample_rate);
            phasor.set_shape(PhasorShape::Saw);
            phasor.init();
        }
    }

    /// Store a new transposition (clamped) and retune. Non-finite values
    /// are ignored.
    #[inline]
    pub fn set_transposition(&mut self, semitones: f32, window_size_ms: f64) {
        if !semitones.is_finite() {
            return;
        }
        self.transposition = semitones.clamp(MIN_TRANSPOSITION, MAX_TRANSPOSITION);
        self.retune(window_size_ms);
    }

    /// Recompute the phasor rate from the stored transposition.
    #[inline]
    pub fn retune(&mut self, window_size_ms: f64) {
        self.frequency = transposition_to_frequency(self.transposition as f64, window_size_ms);
        for phasor in &mut self.phasors {
            phasor.set_frequency(self.frequency);
        }
    }

    #[inline]
    pub fn set_debug(&mut self, debug: bool) {
        for phasor in &mut self.phasors {
            phasor.set_debug(debug);
        }
    }

    #[inline]
    pub fn set_shape(&mut self, shape: PhasorShape) {
        for phasor in &mut self.phasors {
            phasor.set_shape(shape);
        }
    }

    #[inline]
    pub fn transposition(&self) -> f32 {
        self.transposition
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    #[inline]
    pub fn phasor(&self, channel: usize) -> Option<&Phasor> {
        self.phasors.get(channel)
    }

    #[inline]
    pub(crate) fn phasor_mut(&mut self, channel: usize) -> &mut Phasor {
        &mut self.phasors[channel]
    }
}
