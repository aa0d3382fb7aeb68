// The editor grid: the piano-roll form of a pattern.
//
// Rows are keyed by canonical note name ("C#3") and hold one cell per step.
// A cell is either empty or an onset carrying velocity, accent and slide.
// Cells have no length; the codec gives every grid note the configured
// `NoteLength` when it converts the grid to a sequence (see midi.rs).
//
// The grid is what the editor collaborator reads and writes. It arrives over
// serde, so rows are checked (parseable names, exact length) before the codec
// trusts them.

use crate::error::{PatternError, PatternResult};
use crate::note::{note_name, parse_note};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// An onset in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub velocity: u8,
    pub accent: bool,
    pub slide: bool,
}

impl GridCell {
    pub fn new(velocity: u8) -> Self {
        GridCell {
            velocity: velocity.clamp(1, 127),
            accent: false,
            slide: false,
        }
    }
}

/// Note-name rows of fixed-length step cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGrid {
    pub step_count: usize,
    pub rows: BTreeMap<String, Vec<Option<GridCell>>>,
}

impl PatternGrid {
    /// An empty grid with no rows.
    pub fn new(step_count: usize) -> Self {
        PatternGrid {
            step_count,
            rows: BTreeMap::new(),
        }
    }

    /// Set the cell at (pitch, step), creating the row if needed.
    /// Steps past the end are ignored.
    pub fn set(&mut self, pitch: u8, step: usize, cell: GridCell) {
        if step >= self.step_count {
            return;
        }
        let row = self
            .rows
            .entry(note_name(pitch))
            .or_insert_with(|| vec![None; self.step_count]);
        row[step] = Some(cell);
    }

    pub fn cell(&self, pitch: u8, step: usize) -> Option<&GridCell> {
        self.rows
            .get(&note_name(pitch))
            .and_then(|row| row.get(step))
            .and_then(Option::as_ref)
    }

    /// Rows as (pitch, cells), highest pitch first.
    pub fn pitched_rows(&self) -> PatternResult<Vec<(u8, &[Option<GridCell>])>> {
        let mut rows = Vec::with_capacity(self.rows.len());
        for (name, cells) in &self.rows {
            let pitch = parse_note(name).ok_or_else(|| {
                PatternError::Input(format!("grid row '{}' is not a note name", name))
            })?;
            if cells.len() != self.step_count {
                return Err(PatternError::Input(format!(
                    "grid row '{}' has {} cells, expected {}",
                    name,
                    cells.len(),
                    self.step_count
                )));
            }
            rows.push((pitch, cells.as_slice()));
        }
        rows.sort_by_key(|(pitch, _)| Reverse(*pitch));
        Ok(rows)
    }

    /// Compact text rendering: one line per row, highest pitch first.
    /// `X` is an accented onset, `o` a plain one, `~` a slide, `.` empty.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let mut rows: Vec<(Option<u8>, &String, &Vec<Option<GridCell>>)> = self
            .rows
            .iter()
            .map(|(name, cells)| (parse_note(name), name, cells))
            .collect();
        rows.sort_by_key(|(pitch, ..)| Reverse(*pitch));

        for (_, name, cells) in rows {
            out.push_str(&format!("{:>4}: ", name));
            for (step, cell) in cells.iter().enumerate() {
                if step > 0 && step % 16 == 0 {
                    out.push('|');
                }
                out.push(match cell {
                    None => '.',
                    Some(c) if c.slide => '~',
                    Some(c) if c.accent => 'X',
                    Some(_) => 'o',
                });
            }
            out.push('\n');
        }
        out
    }

    pub fn stats(&self) -> GridStats {
        let cells = self.rows.values().flatten().flatten();
        let mut stats = GridStats {
            step_count: self.step_count,
            rows: self.rows.len(),
            onsets: 0,
            accents: 0,
            slides: 0,
        };
        for cell in cells {
            stats.onsets += 1;
            stats.accents += usize::from(cell.accent);
            stats.slides += usize::from(cell.slide);
        }
        stats
    }
}

/// Counts over a grid's contents.
#[derive(Debug, PartialEq, Eq)]
pub struct GridStats {
    pub step_count: usize,
    pub rows: usize,
    pub onsets: usize,
    pub accents: usize,
    pub slides: usize,
}
