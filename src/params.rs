// src/params.rs
//
// Parameter ids, metadata, and the lock-free store shared between the
// control thread and the audio thread.

use std::fmt;
use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

use crate::engine::{DEFAULT_WINDOW_MS, MAX_WINDOW_MS, MIN_WINDOW_MS, NUM_VOICES};
use crate::voice::{MAX_TRANSPOSITION, MIN_TRANSPOSITION};

/// Unique identifier for a parameter.
pub type ParamId = u32;

pub const TRANSPOSITION_1: ParamId = 0;
pub const TRANSPOSITION_2: ParamId = 1;
pub const TRANSPOSITION_3: ParamId = 2;
pub const WINDOW_SIZE: ParamId = 3;

/// Parameter id controlling the transposition of `voice`.
#[inline]
pub fn transposition_param(voice: usize) -> Option<ParamId> {
    (voice < NUM_VOICES).then_some(TRANSPOSITION_1 + voice as ParamId)
}

/// Display curve for parameter UI.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DisplayCurve {
    #[default]
    Linear,
    Logarithmic,
    /// Symmetric around zero (good for pitch)
    Symmetric,
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamUnit {
    #[default]
    None,
    Ms,
    Semitones,
}

impl ParamUnit {
    /// Numeric code for host bindings.
    pub fn code(&self) -> u32 {
        match self {
            ParamUnit::None => 0,
            ParamUnit::Ms => 1,
            ParamUnit::Semitones => 2,
        }
    }
}

impl fmt::Display for ParamUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamUnit::None => Ok(()),
            ParamUnit::Ms => write!(f, "ms"),
            ParamUnit::Semitones => write!(f, "st"),
        }
    }
}

/// Metadata describing a parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub id: ParamId,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParamUnit,
    pub curve: DisplayCurve,

    /// Step size suggested for controls (0 = continuous)
    pub step: f32,
}

impl ParamInfo {
    pub fn new(id: ParamId, name: &'static str) -> Self {
        Self {
            id,
            name,
            min: 0.0,
            max: 1.0,
            default: 0.0,
            unit: ParamUnit::None,
            curve: DisplayCurve::Linear,
            step: 0.0,
        }
    }

    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn default(mut self, value: f32) -> Self {
        self.default = value;
        self
    }

    pub fn unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn curve(mut self, curve: DisplayCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Clamp a value to the valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Normalize a value to 0..1 range.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / (self.max - self.min)
    }

    /// Denormalize a 0..1 value to the parameter range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized * (self.max - self.min)
    }

    /// Format a value for display.
    pub fn format(&self, value: f32) -> String {
        if self.unit == ParamUnit::None {
            format!("{:.2}", value)
        } else {
            format!("{:.2} {}", value, self.unit)
        }
    }
}

/// Every parameter the pitch shifter exposes, ordered by id.
pub fn param_infos() -> Vec<ParamInfo> {
    const NAMES: [&str; NUM_VOICES] = [
        "Transposition Voice 1",
        "Transposition Voice 2",
        "Transposition Voice 3",
    ];

    let mut infos: Vec<ParamInfo> = NAMES
        .iter()
        .enumerate()
        .map(|(voice, name)| {
            ParamInfo::new(TRANSPOSITION_1 + voice as ParamId, name)
                .range(MIN_TRANSPOSITION, MAX_TRANSPOSITION)
                .default(0.0)
                .unit(ParamUnit::Semitones)
                .curve(DisplayCurve::Symmetric)
                .step(0.01)
        })
        .collect();

    infos.push(
        ParamInfo::new(WINDOW_SIZE, "Window Size")
            .range(MIN_WINDOW_MS as f32, MAX_WINDOW_MS as f32)
            .default(DEFAULT_WINDOW_MS as f32)
            .unit(ParamUnit::Ms)
            .curve(DisplayCurve::Logarithmic)
            .step(0.1),
    );

    infos
}

/// Look up metadata for one parameter.
pub fn param_info(id: ParamId) -> Option<ParamInfo> {
    param_infos().into_iter().find(|info| info.id == id)
}

// ═══════════════════════════════════════════════════════════════════
// Shared parameter store
// ═══════════════════════════════════════════════════════════════════

/// Parameter values written by the control thread and read by the audio
/// thread.
///
/// Plain atomic stores and loads, no locks. Values are eventually
/// consistent: the audio thread picks them up at its next block boundary,
/// and a voice and the window may be observed from different writes.
#[derive(Debug)]
pub struct SharedParams {
    transpositions: [AtomicF32; NUM_VOICES],
    window_size_ms: AtomicF32,
}

impl SharedParams {
    pub fn new() -> Self {
        Self {
            transpositions: std::array::from_fn(|_| AtomicF32::new(0.0)),
            window_size_ms: AtomicF32::new(DEFAULT_WINDOW_MS as f32),
        }
    }

    #[inline]
    pub fn transposition(&self, voice: usize) -> f32 {
        self.transpositions
            .get(voice)
            .map_or(0.0, |t| t.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set_transposition(&self, voice: usize, semitones: f32) {
        if let Some(t) = self.transpositions.get(voice) {
            t.store(semitones, Ordering::Release);
        }
    }

    #[inline]
    pub fn window_size_ms(&self) -> f32 {
        self.window_size_ms.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_window_size_ms(&self, ms: f32) {
        self.window_size_ms.store(ms, Ordering::Release);
    }

    /// Read a parameter by id.
    pub fn get(&self, id: ParamId) -> Option<f32> {
        match id {
            TRANSPOSITION_1..=TRANSPOSITION_3 => Some(self.transposition((id - TRANSPOSITION_1) as usize)),
            WINDOW_SIZE => Some(self.window_size_ms()),
            _ => None,
        }
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_param_infos_cover_all_ids() {
        let infos = param_infos();
        assert_eq!(infos.len(), NUM_VOICES + 1);
        for (index, info) in infos.iter().enumerate() {
            assert_eq!(info.id, index as ParamId);
        }

        let window = param_info(WINDOW_SIZE).unwrap();
        assert_eq!(window.min, 5.0);
        assert_eq!(window.max, 300.0);
        assert_eq!(window.default, 50.0);
        assert_eq!(window.format(50.0), "50.00 ms");

        let voice = param_info(TRANSPOSITION_2).unwrap();
        assert_eq!(voice.clamp(13.0), 12.0);
        assert_eq!(voice.clamp(-13.0), -12.0);
        assert_eq!(voice.normalize(0.0), 0.5);
        assert_eq!(voice.denormalize(1.0), 12.0);

        assert!(param_info(99).is_none());
    }

    #[test]
    fn test_transposition_param_ids() {
        assert_eq!(transposition_param(0), Some(TRANSPOSITION_1));
        assert_eq!(transposition_param(2), Some(TRANSPOSITION_3));
        assert_eq!(transposition_param(3), None);
    }

    #[test]
    fn test_shared_params_visible_across_threads() {
        let shared = Arc::new(SharedParams::new());
        assert_eq!(shared.window_size_ms(), 50.0);

        let writer = Arc::clone(&shared);
        std::thread::spawn(move || {
            writer.set_transposition(1, 4.0);
            writer.set_window_size_ms(120.0);
        })
        .join()
        .unwrap();

        assert_eq!(shared.get(TRANSPOSITION_2), Some(4.0));
        assert_eq!(shared.get(WINDOW_SIZE), Some(120.0));
        assert_eq!(shared.get(42), None);

        // Unknown voices are ignored
        shared.set_transposition(7, 1.0);
        assert_eq!(shared.transposition(7), 0.0);
    }
}
