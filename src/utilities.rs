// src/utilities.rs
//
// Stateless unit conversions.

/// Convert a duration in seconds to a whole number of samples.
///
/// Caller guarantees `seconds >= 0`.
#[inline]
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    (seconds * sample_rate).round() as usize
}

/// Phasor frequency (Hz) for a transposition in semitones.
///
/// One phasor cycle sweeps the delay over the whole window, so the cycle
/// lasts `window / 2^(semitones / 12)`.
#[inline]
pub fn transposition_to_frequency(semitones: f64, window_size_ms: f64) -> f64 {
    2.0_f64.powf(semitones / 12.0) / (window_size_ms / 1000.0)
}

/// Decibels to linear gain.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seconds_to_samples_rounds() {
        assert_eq!(seconds_to_samples(0.05, 48_000.0), 2400);
        assert_eq!(seconds_to_samples(0.0, 44_100.0), 0);
        // 0.0001 s at 44.1k = 4.41 samples
        assert_eq!(seconds_to_samples(0.0001, 44_100.0), 4);
        // 0.3 s at 44.1k = 13230
        assert_eq!(seconds_to_samples(0.3, 44_100.0), 13_230);
    }

    #[test]
    fn test_unison_frequency_is_inverse_window() {
        for window in [5.0, 20.0, 50.0, 123.4, 300.0] {
            assert_relative_eq!(
                transposition_to_frequency(0.0, window),
                1000.0 / window,
                max_relative = 1e-12
            );
        }
        assert_relative_eq!(transposition_to_frequency(0.0, 50.0), 20.0, max_relative = 1e-12);
    }

    #[test]
    fn test_frequency_octaves() {
        assert_relative_eq!(transposition_to_frequency(12.0, 50.0), 40.0, max_relative = 1e-12);
        assert_relative_eq!(transposition_to_frequency(-12.0, 50.0), 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_frequency_monotonic_in_semitones() {
        for window in [5.0, 50.0, 300.0] {
            let mut last = transposition_to_frequency(-12.0, window);
            let mut st = -12.0;
            while st < 12.0 {
                st += 0.01;
                let f = transposition_to_frequency(st, window);
                assert!(f > last, "not increasing at {} st / {} ms", st, window);
                // No jumps: a hundredth of a semitone moves the rate by < 0.06%
                assert!((f - last) / last < 6e-4);
                last = f;
            }
        }
    }

    #[test]
    fn test_db_to_gain() {
        assert_relative_eq!(db_to_gain(0.0), 1.0);
        assert_relative_eq!(db_to_gain(-6.0), 0.501_187_2, max_relative = 1e-5);
        assert_relative_eq!(db_to_gain(20.0), 10.0, max_relative = 1e-6);
    }
}
