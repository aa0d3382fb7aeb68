// Note values: names, the step-based Pattern, and the tick-based NoteSequence.
//
// Pitches are MIDI note numbers throughout (C4 = 60). Names are only used at
// the edges: parsing a root like "F#" or "Bb", and keying grid rows by
// "C#4"-style names. Canonical output spelling uses sharps.
//
// Two flat forms exist:
// - `Pattern` holds `NoteEvent`s positioned in grid steps. The generator
//   produces it and the mood pass rewrites it.
// - `NoteSequence` holds `SequenceNote`s positioned in MIDI ticks. The codec
//   decodes it from bytes; variation and inspiration transform it.
// Converting between them (and to the editor grid) is the codec's job, see
// midi.rs and grid.rs.

use serde::{Deserialize, Serialize};

/// Canonical pitch-class names, sharps only.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Highest valid MIDI pitch.
pub const MAX_PITCH: u8 = 127;

/// Parse a pitch-class name ("C", "F#", "Bb", "e") into a semitone 0-11.
pub fn pitch_class(name: &str) -> Option<u8> {
    spelled_offset(name).map(|offset| offset.rem_euclid(12) as u8)
}

/// Semitones above C for a spelled name, before wrapping: "Cb" is -1 and
/// "B#" is 12, so a note name's octave can borrow or carry.
fn spelled_offset(name: &str) -> Option<i32> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    let letter = chars.next()?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental = match chars.as_str() {
        "" => 0,
        "#" | "s" => 1,
        "b" => -1,
        _ => return None,
    };
    Some(base + accidental)
}

/// Parse a full note name with octave ("C4", "F#3", "Bb-1") into a MIDI pitch.
pub fn parse_note(name: &str) -> Option<u8> {
    let trimmed = name.trim();
    let split = trimmed.find(|c: char| c == '-' || c.is_ascii_digit())?;
    let (pc_part, octave_part) = trimmed.split_at(split);
    let offset = spelled_offset(pc_part)?;
    let octave: i32 = octave_part.parse().ok()?;
    let pitch = (octave + 1) * 12 + offset;
    if (0..=i32::from(MAX_PITCH)).contains(&pitch) {
        Some(pitch as u8)
    } else {
        None
    }
}

/// Canonical name for a MIDI pitch ("C4", "F#3").
pub fn note_name(pitch: u8) -> String {
    let octave = i32::from(pitch / 12) - 1;
    format!("{}{}", NOTE_NAMES[usize::from(pitch % 12)], octave)
}

/// Clamp a signed pitch computation back into the MIDI range.
pub fn clamp_pitch(pitch: i32) -> u8 {
    pitch.clamp(0, i32::from(MAX_PITCH)) as u8
}

/// Clamp a signed velocity computation into [1, 127].
pub fn clamp_velocity(velocity: i32) -> u8 {
    velocity.clamp(1, 127) as u8
}

/// A single generated note, positioned in grid steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Step index of the onset.
    pub step: usize,
    /// MIDI pitch.
    pub pitch: u8,
    /// Velocity in [1, 127].
    pub velocity: u8,
    /// Length in steps, at least 1.
    pub duration: usize,
    pub accent: bool,
    pub slide: bool,
}

impl NoteEvent {
    /// A plain one-step note.
    pub fn new(step: usize, pitch: u8, velocity: u8) -> Self {
        NoteEvent {
            step,
            pitch,
            velocity: velocity.max(1),
            duration: 1,
            accent: false,
            slide: false,
        }
    }

    pub fn with_duration(mut self, duration: usize) -> Self {
        self.duration = duration.max(1);
        self
    }

    pub fn with_accent(mut self, accent: bool) -> Self {
        self.accent = accent;
        self
    }

    pub fn with_slide(mut self, slide: bool) -> Self {
        self.slide = slide;
        self
    }
}

/// A generated pattern: notes on a fixed-length step grid.
///
/// Notes are kept sorted by `(step, pitch)`; at most one note per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    pub step_count: usize,
    pub notes: Vec<NoteEvent>,
}

impl Pattern {
    /// Build a pattern, sorting notes into canonical order.
    pub fn new(step_count: usize, mut notes: Vec<NoteEvent>) -> Self {
        notes.sort_by_key(|n| (n.step, n.pitch));
        Pattern { step_count, notes }
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// True if some note starts at `step` with `pitch`.
    pub fn is_occupied(&self, step: usize, pitch: u8) -> bool {
        self.notes
            .binary_search_by_key(&(step, pitch), |n| (n.step, n.pitch))
            .is_ok()
    }
}

/// A note in the tick-based interchange form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceNote {
    pub start_tick: u32,
    /// Length in ticks, at least 1.
    pub duration_ticks: u32,
    pub pitch: u8,
    /// Velocity in [1, 127].
    pub velocity: u8,
    pub accent: bool,
    pub slide: bool,
}

impl SequenceNote {
    /// Tick at which the note releases. `None` on overflow.
    pub fn end_tick(&self) -> Option<u32> {
        self.start_tick.checked_add(self.duration_ticks)
    }
}

/// A flat, time-stamped note sequence: what the MIDI codec reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSequence {
    /// Pulses per quarter note.
    pub ticks_per_quarter: u16,
    /// Microseconds per quarter note.
    pub tempo_micros: u32,
    /// Total length; the end-of-track marker sits here (or at the last event).
    pub length_ticks: u32,
    pub notes: Vec<SequenceNote>,
}

impl NoteSequence {
    /// Sort notes into canonical order: start, pitch, then length.
    pub fn sort(&mut self) {
        self.notes
            .sort_by_key(|n| (n.start_tick, n.pitch, n.duration_ticks, n.velocity));
    }

    /// Tempo in beats per minute.
    pub fn bpm(&self) -> f64 {
        60_000_000.0 / f64::from(self.tempo_micros.max(1))
    }

    /// Latest release tick over all notes, or `None` on overflow.
    pub fn end_tick(&self) -> Option<u32> {
        self.notes
            .iter()
            .try_fold(0u32, |acc, n| n.end_tick().map(|end| acc.max(end)))
    }

    /// Lowest pitch, if any notes exist.
    pub fn lowest_pitch(&self) -> Option<u8> {
        self.notes.iter().map(|n| n.pitch).min()
    }

    /// Convert a wall-clock offset into ticks at this sequence's tempo.
    pub fn millis_to_ticks(&self, millis: f64) -> f64 {
        millis * 1000.0 / f64::from(self.tempo_micros.max(1)) * f64::from(self.ticks_per_quarter)
    }
}
