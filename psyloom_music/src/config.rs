// Data-driven engine configuration.
//
// Tunables that are not part of a single request live in `EngineConfig`:
// MIDI resolution and tempo, grid geometry, the controller numbers that carry
// accent and slide, humanize bounds, and the upper limits callers' input is
// validated against. Loaded from JSON; any key left out takes its default.
//
// **Critical constraint: determinism.** Config values feed generation and the
// codec directly. The same seed only reproduces the same bytes under the same
// config.

use crate::error::{PatternError, PatternResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Subdivision a grid cell lasts when converted to ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteLength {
    ThirtySecond,
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    Whole,
}

impl NoteLength {
    /// Length in ticks at the given resolution.
    pub fn ticks(self, ticks_per_quarter: u16) -> u32 {
        let whole = u32::from(ticks_per_quarter) * 4;
        match self {
            NoteLength::ThirtySecond => whole / 32,
            NoteLength::Sixteenth => whole / 16,
            NoteLength::Eighth => whole / 8,
            NoteLength::Quarter => whole / 4,
            NoteLength::Half => whole / 2,
            NoteLength::Whole => whole,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// MIDI pulses per quarter note.
    pub ticks_per_quarter: u16,
    /// Tempo written into encoded streams.
    pub tempo_bpm: u16,
    /// Grid steps in one 4/4 bar.
    pub steps_per_bar: u16,
    /// Duration of a grid cell once converted to a sequence.
    pub note_length: NoteLength,
    /// Controller number whose value brackets accented Note-Ons.
    pub accent_cc: u8,
    /// Controller number whose value brackets sliding Note-Ons.
    pub slide_cc: u8,
    /// Largest accepted `step_count`.
    pub max_step_count: usize,
    /// Largest accepted inspiration length.
    pub max_bars: u32,
    /// Largest accepted decoded source phrase.
    pub max_source_notes: usize,
    /// Humanize moves velocity by at most this much either way.
    pub humanize_velocity_spread: u8,
    /// Velocity given to grid cells and decoded notes that lack one.
    pub default_velocity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ticks_per_quarter: 480,
            tempo_bpm: 145,
            steps_per_bar: 16,
            note_length: NoteLength::Sixteenth,
            accent_cc: 16,
            slide_cc: 17,
            max_step_count: 1024,
            max_bars: 64,
            max_source_notes: 4096,
            humanize_velocity_spread: 8,
            default_velocity: 100,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> PatternResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse from a JSON string and check the values are usable.
    pub fn from_json(data: &str) -> PatternResult<Self> {
        let config: EngineConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PatternResult<()> {
        if self.ticks_per_quarter == 0 || self.ticks_per_quarter > 0x7fff {
            return Err(PatternError::validation(
                "ticks_per_quarter",
                "must be in 1..=32767",
            ));
        }
        if self.tempo_bpm == 0 {
            return Err(PatternError::validation("tempo_bpm", "must be positive"));
        }
        if self.steps_per_bar == 0 || self.ticks_per_step() == 0 {
            return Err(PatternError::validation(
                "steps_per_bar",
                "must be positive and no finer than one tick per step",
            ));
        }
        if self.note_length.ticks(self.ticks_per_quarter) == 0 {
            return Err(PatternError::validation(
                "note_length",
                "is shorter than one tick at this resolution",
            ));
        }
        if self.accent_cc > 127 || self.slide_cc > 127 || self.accent_cc == self.slide_cc {
            return Err(PatternError::validation(
                "accent_cc",
                "accent and slide controllers must be distinct numbers in 0..=127",
            ));
        }
        if !(1..=127).contains(&self.default_velocity) {
            return Err(PatternError::validation("default_velocity", "must be in 1..=127"));
        }
        Ok(())
    }

    /// Ticks covered by one grid step.
    pub fn ticks_per_step(&self) -> u32 {
        u32::from(self.ticks_per_quarter) * 4 / u32::from(self.steps_per_bar.max(1))
    }

    /// Tempo meta value: microseconds per quarter note.
    pub fn tempo_micros(&self) -> u32 {
        60_000_000 / u32::from(self.tempo_bpm.max(1))
    }
}
