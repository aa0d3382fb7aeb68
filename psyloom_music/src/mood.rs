// Mood post-processing, applied once to every generated pattern.
//
// - dark: every velocity drops by 30, floored at 35.
// - uplifting: every velocity rises by 15, capped at 127.
// - dense: about 0.3 x step_count extra one-step notes at random
//   (step, pitch) pairs from the scale; occupied pairs are skipped, so the
//   number actually added can be lower.
// - default: unchanged.
//
// The pass returns a new pattern and is not idempotent: running dense twice
// adds notes twice. `generate_pattern` calls it exactly once.

use crate::note::{NoteEvent, Pattern};
use crate::params::Mood;
use psyloom_prng::PatternRng;
use std::collections::BTreeSet;

const DARK_DROP: u8 = 30;
const DARK_FLOOR: u8 = 35;
const UPLIFT_RISE: u8 = 15;
const DENSE_FRACTION: f64 = 0.3;

pub fn apply_mood(pattern: &Pattern, mood: Mood, scale: &[u8], rng: &mut PatternRng) -> Pattern {
    match mood {
        Mood::Default => pattern.clone(),
        Mood::Dark => map_velocity(pattern, |v| v.saturating_sub(DARK_DROP).max(DARK_FLOOR)),
        Mood::Uplifting => map_velocity(pattern, |v| v.saturating_add(UPLIFT_RISE).min(127)),
        Mood::Dense => densify(pattern, scale, rng),
    }
}

fn map_velocity(pattern: &Pattern, f: impl Fn(u8) -> u8) -> Pattern {
    let notes = pattern
        .notes
        .iter()
        .map(|n| NoteEvent {
            velocity: f(n.velocity),
            ..*n
        })
        .collect();
    Pattern::new(pattern.step_count, notes)
}

fn densify(pattern: &Pattern, scale: &[u8], rng: &mut PatternRng) -> Pattern {
    if scale.is_empty() || pattern.step_count == 0 {
        return pattern.clone();
    }
    let attempts = (pattern.step_count as f64 * DENSE_FRACTION).round() as usize;
    let mut occupied: BTreeSet<(usize, u8)> =
        pattern.notes.iter().map(|n| (n.step, n.pitch)).collect();
    let mut notes = pattern.notes.clone();

    for _ in 0..attempts {
        let step = rng.range_usize(0, pattern.step_count);
        let Some(&pitch) = rng.pick(scale) else {
            break;
        };
        let velocity = rng.range_u8_inclusive(60, 80);
        if occupied.insert((step, pitch)) {
            notes.push(NoteEvent::new(step, pitch, velocity));
        }
    }
    Pattern::new(pattern.step_count, notes)
}
