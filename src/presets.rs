// src/presets.rs
//
// Harmony presets: interval sets for the three voices.

use std::fmt;

/// Three-voice interval sets, in semitones above the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmonyPreset {
    MinorThird,
    MajorThird,
    MajorSeventh,
    PerfectFifth,
}

impl HarmonyPreset {
    pub fn all() -> &'static [HarmonyPreset] {
        &[
            HarmonyPreset::MinorThird,
            HarmonyPreset::MajorThird,
            HarmonyPreset::MajorSeventh,
            HarmonyPreset::PerfectFifth,
        ]
    }

    /// Transpositions for voices 1, 2 and 3.
    pub fn transpositions(&self) -> [f32; 3] {
        match self {
            HarmonyPreset::MinorThird => [0.0, 3.0, 7.0],
            HarmonyPreset::MajorThird => [0.0, 4.0, 7.0],
            HarmonyPreset::MajorSeventh => [0.0, 4.0, 11.0],
            HarmonyPreset::PerfectFifth => [0.0, 7.0, 12.0],
        }
    }

    /// Stable numeric id used by host bindings (1-based).
    pub fn id(&self) -> u32 {
        match self {
            HarmonyPreset::MinorThird => 1,
            HarmonyPreset::MajorThird => 2,
            HarmonyPreset::MajorSeventh => 3,
            HarmonyPreset::PerfectFifth => 4,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            HarmonyPreset::MinorThird => "Minor 3rd",
            HarmonyPreset::MajorThird => "Major 3rd",
            HarmonyPreset::MajorSeventh => "Major 7th",
            HarmonyPreset::PerfectFifth => "Perfect Fifth",
        }
    }
}

impl fmt::Display for HarmonyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
