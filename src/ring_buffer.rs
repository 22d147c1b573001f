// src/ring_buffer.rs
//
// Circular multi-channel sample store with fractional-delay reads.

use crate::audio_buffer::AudioBuffer;

/// Fixed-capacity circular buffer, one lane per channel.
///
/// All lanes live in one contiguous allocation made by [`RingBuffer::configure`].
/// Writes happen a whole block at a time; reads address samples relative to
/// the start of the most recently written block.
#[derive(Debug, Default)]
pub struct RingBuffer {
    data: Vec<f32>, // planar: lane ch occupies [ch * capacity, (ch + 1) * capacity)
    channels: usize,
    capacity: usize,

    /// Next write index
    write_pos: usize,

    /// Index of sample 0 of the last written block
    block_start: usize,

    /// Frames in the last written block
    block_frames: usize,
}

impl RingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate storage. Not real-time safe.
    pub fn configure(&mut self, channels: usize, capacity: usize) {
        self.channels = channels;
        self.capacity = capacity;
        self.data = vec![0.0; channels * capacity];
        self.write_pos = 0;
        self.block_start = 0;
        self.block_frames = 0;
    }

    /// Zero the contents and rewind the cursor.
    pub fn init(&mut self) {
        self.data.fill(0.0);
        self.write_pos = 0;
        self.block_start = 0;
        self.block_frames = 0;
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    #[inline]
    fn lane(&self, ch: usize) -> &[f32] {
        let start = ch * self.capacity;
        &self.data[start..start + self.capacity]
    }

    /// Copy one host block into the store and advance the cursor.
    ///
    /// Must be called once per block, before any read for that block.
    pub fn write(&mut self, block: &AudioBuffer) {
        self.write_frames(block, block.frames);
    }

    /// Like [`RingBuffer::write`], but only the first `frames` of each
    /// channel count as the block.
    pub fn write_frames(&mut self, block: &AudioBuffer, frames: usize) {
        if self.capacity == 0 {
            return;
        }

        let frames = frames.min(block.frames).min(self.capacity);
        let start = self.write_pos;
        let channels = self.channels.min(block.channels);

        for ch in 0..channels {
            let input = &block.channel(ch)[..frames];
            let lane_start = ch * self.capacity;
            let lane = &mut self.data[lane_start..lane_start + self.capacity];

            // At most two contiguous runs
            let first = frames.min(self.capacity - start);
            lane[start..start + first].copy_from_slice(&input[..first]);
            lane[..frames - first].copy_from_slice(&input[first..]);
        }

        // Lanes the block does not cover receive silence
        for ch in channels..self.channels {
            let lane_start = ch * self.capacity;
            for i in 0..frames {
                self.data[lane_start + (start + i) % self.capacity] = 0.0;
            }
        }

        self.block_start = start;
        self.block_frames = frames;
        self.write_pos = (start + frames) % self.capacity;
    }

    /// Read `channel` at `sample_index` (relative to the last written
    /// block, may be negative) delayed by `delay` samples, linearly
    /// interpolated.
    ///
    /// Returns 0.0 when the position is not yet written (at or ahead of the
    /// write cursor) or has already been overwritten (more than one capacity
    /// behind).
    #[inline]
    pub fn read_interpolated(&self, channel: usize, sample_index: f64, delay: f64) -> f32 {
        if channel >= self.channels {
            return 0.0;
        }

        let capacity = self.capacity as f64;

        // Distance behind the next write index; the interpolation partner
        // one sample later must already be written.
        let lookback = self.block_frames as f64 - sample_index + delay;
        if !(1.0..=capacity).contains(&lookback) {
            return 0.0;
        }

        let pos = (self.block_start as f64 + sample_index - delay).rem_euclid(capacity);
        let base = pos.floor();
        let frac = (pos - base) as f32;
        let i0 = (base as usize) % self.capacity;
        let i1 = (i0 + 1) % self.capacity;

        let lane = self.lane(channel);
        let s0 = lane[i0];
        let s1 = lane[i1];
        s0 + (s1 - s0) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn write_block(ring: &mut RingBuffer, planar: &mut [f32], channels: usize) {
        let block = AudioBuffer::new(planar, channels);
        ring.write(&block);
    }

    #[test]
    fn test_configure_allocates_and_rewinds() {
        let mut ring = RingBuffer::new();
        ring.configure(2, 100);
        assert_eq!(ring.capacity(), 100);
        assert_eq!(ring.channels(), 2);
        assert_eq!(ring.write_pos(), 0);
    }

    #[test]
    fn test_write_frames_only_takes_prefix() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 32);

        let mut data: Vec<f32> = (1..=8).map(|i| i as f32).collect();
        let block = AudioBuffer::new(&mut data, 1);
        ring.write_frames(&block, 5);

        assert_eq!(ring.write_pos(), 5);
        assert_abs_diff_eq!(ring.read_interpolated(0, 4.0, 0.0), 5.0);
        // Frame 5 onwards was never written
        assert_abs_diff_eq!(ring.read_interpolated(0, 5.0, 0.0), 0.0);
    }

    #[test]
    fn test_zero_delay_round_trip() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 64);

        for block_index in 0..10 {
            let mut data: Vec<f32> = (0..16).map(|i| (block_index * 16 + i) as f32).collect();
            let expected = data.clone();
            write_block(&mut ring, &mut data, 1);

            for i in 0..16 {
                assert_eq!(ring.read_interpolated(0, i as f64, 0.0), expected[i]);
            }
        }
    }

    #[test]
    fn test_window_offset_reads_earlier_blocks() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 64);

        let window = 20.0;
        let mut history = Vec::new();
        for block_index in 0..12 {
            let mut data: Vec<f32> = (0..8).map(|i| (block_index * 8 + i) as f32 + 1.0).collect();
            history.extend_from_slice(&data);
            write_block(&mut ring, &mut data, 1);

            let block_start = block_index * 8;
            for i in 0..8usize {
                let absolute = block_start as i64 + i as i64 - window as i64;
                let got = ring.read_interpolated(0, i as f64 - window, 0.0);
                if absolute < 0 {
                    // Still the zero-filled initial state
                    assert_eq!(got, 0.0);
                } else {
                    assert_eq!(got, history[absolute as usize]);
                }
            }
        }
    }

    #[test]
    fn test_fractional_delay_interpolates() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 32);
        let mut data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        write_block(&mut ring, &mut data, 1);

        assert_abs_diff_eq!(ring.read_interpolated(0, 6.0, 0.5), 5.5, epsilon = 1e-6);
        assert_abs_diff_eq!(ring.read_interpolated(0, 6.0, 2.25), 3.75, epsilon = 1e-6);
        assert_abs_diff_eq!(ring.read_interpolated(0, 3.0, 0.1), 2.9, epsilon = 1e-6);
    }

    #[test]
    fn test_interpolation_across_wrap() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 10);

        // Three blocks: the third straddles the end of the store
        for block_index in 0..3 {
            let mut data: Vec<f32> = (0..4).map(|i| (block_index * 4 + i) as f32).collect();
            write_block(&mut ring, &mut data, 1);
        }
        // Values 8..12 occupy indices 8, 9, 0, 1
        assert_eq!(ring.write_pos(), 2);
        assert_abs_diff_eq!(ring.read_interpolated(0, 1.0, 0.0), 9.0);
        assert_abs_diff_eq!(ring.read_interpolated(0, 2.0, 0.0), 10.0);
        assert_abs_diff_eq!(ring.read_interpolated(0, 2.0, 0.5), 9.5, epsilon = 1e-6);
    }

    #[test]
    fn test_reads_outside_valid_range_are_silent() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 32);
        let mut data = [1.0; 8];
        write_block(&mut ring, &mut data, 1);

        // At the write cursor (not written yet)
        assert_eq!(ring.read_interpolated(0, 8.0, 0.0), 0.0);
        // Ahead of the cursor
        assert_eq!(ring.read_interpolated(0, 12.0, 1.0), 0.0);
        // More than one capacity behind
        assert_eq!(ring.read_interpolated(0, 0.0, 40.0), 0.0);
        // Unknown channel
        assert_eq!(ring.read_interpolated(3, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut ring = RingBuffer::new();
        ring.configure(2, 32);
        let mut data = [1.0, 2.0, 3.0, 4.0, -1.0, -2.0, -3.0, -4.0];
        write_block(&mut ring, &mut data, 2);

        for i in 0..4 {
            assert_eq!(ring.read_interpolated(0, i as f64, 0.0), (i + 1) as f32);
            assert_eq!(ring.read_interpolated(1, i as f64, 0.0), -((i + 1) as f32));
        }
    }

    #[test]
    fn test_init_clears_contents() {
        let mut ring = RingBuffer::new();
        ring.configure(1, 16);
        let mut data = [1.0; 4];
        write_block(&mut ring, &mut data, 1);
        ring.init();
        assert_eq!(ring.write_pos(), 0);

        let mut silence = [0.0; 4];
        write_block(&mut ring, &mut silence, 1);
        for delay in 0..12 {
            assert_eq!(ring.read_interpolated(0, 0.0, delay as f64), 0.0);
        }
    }
}
