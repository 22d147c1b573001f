// src/phasor.rs
//
// Normalized ramp oscillator used as the delay-modulation clock.

use std::f64::consts::TAU;

/// Phasor output shapes. All shapes are unipolar (0.0 - 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhasorShape {
    /// Rising ramp; the output equals the phase.
    #[default]
    Saw,
    Sine,
    Triangle,
    Square,
}

impl PhasorShape {
    #[inline]
    pub fn evaluate(&self, phase: f64) -> f64 {
        match self {
            PhasorShape::Saw => phase,
            PhasorShape::Sine => 0.5 - 0.5 * (phase * TAU).cos(),
            PhasorShape::Triangle => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 - 2.0 * phase
                }
            }
            PhasorShape::Square => {
                if phase < 0.5 { 1.0 } else { 0.0 }
            }
        }
    }

    /// Map a numeric selector (0=saw, 1=sine, 2=tri, 3=square).
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => PhasorShape::Sine,
            2 => PhasorShape::Triangle,
            3 => PhasorShape::Square,
            _ => PhasorShape::Saw,
        }
    }
}

/// Low frequency phasor producing one value per call.
///
/// The owner must call [`Phasor::next_sample`] exactly once per output
/// sample; the second grain reader derives its phase from this one.
#[derive(Debug, Clone)]
pub struct Phasor {
    phase: f64, // 0.0 - 1.0
    freq: f64,  // Hz
    sample_rate: f64,
    shape: PhasorShape,
    debug: bool,
}

impl Phasor {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            freq: 0.0,
            sample_rate,
            shape: PhasorShape::Saw,
            debug: false,
        }
    }

    /// Reset the phase to the start of the ramp.
    #[inline]
    pub fn init(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    #[inline]
    pub fn set_frequency(&mut self, freq: f64) {
        self.freq = freq;
    }

    #[inline]
    pub fn set_shape(&mut self, shape: PhasorShape) {
        self.shape = shape;
    }

    #[inline]
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    #[inline]
    pub fn frequency(&self) -> f64 {
        self.freq
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    #[inline]
    pub fn shape(&self) -> PhasorShape {
        self.shape
    }

    /// Return the current value, then advance one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        let out = self.shape.evaluate(self.phase);

        let next = self.phase + self.freq / self.sample_rate;
        if self.debug && next >= 1.0 {
            log::debug!(
                "phasor cycle complete (freq {:.3} Hz, sr {})",
                self.freq,
                self.sample_rate
            );
        }
        self.phase = next.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_phase_after_k_steps() {
        let sample_rate = 48_000.0;
        for freq in [20.0, 10.0, 40.0, 3.7, 199.9] {
            let mut phasor = Phasor::new(sample_rate);
            phasor.set_frequency(freq);
            phasor.init();
            for k in 0..10_000u32 {
                let expected = (k as f64 * freq / sample_rate).fract();
                let got = phasor.next_sample();
                // Either side of a wrap is the same point on the circle
                let diff = (got - expected).abs();
                assert!(
                    diff < 1e-9 || (1.0 - diff) < 1e-9,
                    "k={} freq={} got={} expected={}",
                    k,
                    freq,
                    got,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_saw_output_stays_in_unit_range() {
        let mut phasor = Phasor::new(44_100.0);
        phasor.set_frequency(333.3);
        for _ in 0..100_000 {
            let p = phasor.next_sample();
            assert!((0.0..1.0).contains(&p));
        }
    }

    #[test]
    fn test_init_resets_phase() {
        let mut phasor = Phasor::new(48_000.0);
        phasor.set_frequency(20.0);
        for _ in 0..1234 {
            phasor.next_sample();
        }
        assert!(phasor.phase() > 0.0);
        phasor.init();
        assert_eq!(phasor.phase(), 0.0);
        assert_eq!(phasor.next_sample(), 0.0);
    }

    #[test]
    fn test_frequency_change_applies_next_sample() {
        let mut phasor = Phasor::new(1000.0);
        phasor.set_frequency(100.0);
        assert_abs_diff_eq!(phasor.next_sample(), 0.0);
        phasor.set_frequency(250.0);
        assert_abs_diff_eq!(phasor.next_sample(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(phasor.next_sample(), 0.35, epsilon = 1e-12);
    }

    #[test]
    fn test_shapes() {
        assert_abs_diff_eq!(PhasorShape::Saw.evaluate(0.25), 0.25);
        assert_abs_diff_eq!(PhasorShape::Sine.evaluate(0.0), 0.0);
        assert_abs_diff_eq!(PhasorShape::Sine.evaluate(0.5), 1.0);
        assert_abs_diff_eq!(PhasorShape::Triangle.evaluate(0.25), 0.5);
        assert_abs_diff_eq!(PhasorShape::Triangle.evaluate(0.75), 0.5);
        assert_abs_diff_eq!(PhasorShape::Square.evaluate(0.2), 1.0);
        assert_abs_diff_eq!(PhasorShape::Square.evaluate(0.7), 0.0);
        assert_eq!(PhasorShape::from_index(2), PhasorShape::Triangle);
        assert_eq!(PhasorShape::from_index(99), PhasorShape::Saw);
    }

    #[test]
    fn test_debug_flag_does_not_change_output() {
        let mut a = Phasor::new(48_000.0);
        let mut b = Phasor::new(48_000.0);
        a.set_frequency(1000.0);
        b.set_frequency(1000.0);
        b.set_debug(true);
        for _ in 0..500 {
            assert_eq!(a.next_sample(), b.next_sample());
        }
    }
}
