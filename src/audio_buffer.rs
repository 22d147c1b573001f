// src/audio_buffer.rs

/// Mutable view over one block of planar audio.
///
/// Layout: `[ch0 frame0..frameN, ch1 frame0..frameN, ...]`.
#[derive(Debug)]
pub struct AudioBuffer<'a> {
    pub channels: usize,
    pub frames: usize,
    pub data: &'a mut [f32],
}

impl<'a> AudioBuffer<'a> {
    /// Create a new AudioBuffer wrapping existing data.
    #[inline]
    pub fn new(data: &'a mut [f32], channels: usize) -> Self {
        let frames = if channels == 0 { 0 } else { data.len() / channels };
        Self {
            channels,
            frames,
            data,
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    pub fn channel(&self, ch: usize) -> &[f32] {
        let start = ch * self.frames;
        &self.data[start..start + self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [f32] {
        let start = ch * self.frames;
        &mut self.data[start..start + self.frames]
    }

    /// Multiply every sample by `gain`.
    #[inline]
    pub fn apply_gain(&mut self, gain: f32) {
        for s in self.data.iter_mut() {
            *s *= gain;
        }
    }

    /// Largest absolute sample value in the block.
    #[inline]
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    /// Get direct access to the planar sample data.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        self.data
    }
}
