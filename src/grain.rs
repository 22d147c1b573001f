// src/grain.rs
//
// Per-reader grain shaping for the overlap-add pitch shifter.
//
// Reader B is always derived from reader A's phase so the pair can never
// drift apart.

use std::f64::consts::PI;

/// Phase of reader B: half a cycle away from reader A.
#[inline]
pub fn reader_b_phase(phase_a: f64) -> f64 {
    (phase_a + 0.5) % 1.0
}

/// Half-sine crossfade window: 0 at phase 0 and 1, peak 1 at phase 0.5.
#[inline]
pub fn envelope(phase: f64) -> f64 {
    (phase * PI).sin()
}

/// Delay in samples for a reader at `phase`.
#[inline]
pub fn delay_samples(phase: f64, window_samples: f64) -> f64 {
    phase * window_samples
}

/// Envelope gain and delay for one reader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grain {
    pub gain: f64,
    pub delay: f64,
}

impl Grain {
    #[inline]
    pub fn at(phase: f64, window_samples: f64) -> Self {
        Self {
            gain: envelope(phase),
            delay: delay_samples(phase, window_samples),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reader_b_is_half_cycle_away() {
        assert_abs_diff_eq!(reader_b_phase(0.0), 0.5);
        assert_abs_diff_eq!(reader_b_phase(0.25), 0.75);
        assert_abs_diff_eq!(reader_b_phase(0.5), 0.0);
        assert_abs_diff_eq!(reader_b_phase(0.9), 0.4, epsilon = 1e-12);

        for i in 0..1000 {
            let p = i as f64 / 1000.0;
            let b = reader_b_phase(p);
            assert!((0.0..1.0).contains(&b));
            let d = (b - p).abs();
            assert_abs_diff_eq!(d, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_envelope_shape() {
        assert_abs_diff_eq!(envelope(0.0), 0.0);
        assert_abs_diff_eq!(envelope(1.0), 0.0, epsilon = 1e-15);
        assert_eq!(envelope(0.5), 1.0);

        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let e = envelope(p);
            assert!(e >= 0.0);
            assert!(e <= 1.0);
            // Symmetric around the peak
            assert_abs_diff_eq!(e, envelope(1.0 - p), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_envelope_pair_overlaps() {
        // The two readers never fall silent at the same time
        for i in 0..1000 {
            let p = i as f64 / 1000.0;
            let sum = envelope(p) + envelope(reader_b_phase(p));
            assert!(sum >= 1.0 - 1e-12);
            assert!(sum <= 2.0_f64.sqrt() + 1e-12);
        }
    }

    #[test]
    fn test_grain_delay_ramps_over_window() {
        let window = 2400.0;
        assert_eq!(Grain::at(0.0, window).delay, 0.0);
        assert_abs_diff_eq!(Grain::at(0.5, window).delay, 1200.0);
        assert_abs_diff_eq!(Grain::at(0.999, window).delay, 2397.6, epsilon = 1e-9);
        assert_abs_diff_eq!(Grain::at(0.5, window).gain, 1.0);
    }
}
