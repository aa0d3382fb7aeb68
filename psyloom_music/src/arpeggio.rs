// Arpeggio generation: one note per step, walking scale indices.
//
// Starts at the middle index of the range and moves by one of {-2, -1, 1, 2}
// each step, clamped to the range.

use crate::generator::{PartContext, PartGenerator, PatternBuilder, STEPS_PER_BEAT};
use crate::note::{NoteEvent, clamp_velocity};
use psyloom_prng::PatternRng;

pub struct Arpeggio;

const MOVES: [i64; 4] = [-2, -1, 1, 2];

impl PartGenerator for Arpeggio {
    fn generate(&self, ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<NoteEvent> {
        let mut builder = PatternBuilder::new(ctx.step_count);
        let mut index = ctx.scale.len() / 2;
        let base = i32::from(ctx.style.base_velocity()) - 10;

        for step in 0..ctx.step_count {
            let velocity = clamp_velocity(base + rng.range_i32_inclusive(0, 10));
            builder.place(
                NoteEvent::new(step, ctx.pitch(index), velocity)
                    .with_accent(step % STEPS_PER_BEAT == 0),
            );
            let delta = rng.pick(&MOVES).copied().unwrap_or(1);
            index = ctx.clamp_index(index as i64 + delta);
        }

        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Mood, Style};
    use crate::scale::ScaleRegistry;

    #[test]
    fn test_one_note_per_step_with_bounded_moves() {
        let registry = ScaleRegistry::builtin();
        let scale = registry.build_scale(4, "phrygian", 3, 4);
        let intervals = registry.intervals("phrygian");
        let ctx = PartContext::new(Style::Psy, Mood::Default, 64, &scale, &intervals);
        let notes = Arpeggio.generate(&ctx, &mut PatternRng::new(17));

        assert_eq!(notes.len(), 64);
        assert_eq!(notes[0].pitch, scale[scale.len() / 2]);
        for (step, pair) in notes.windows(2).enumerate() {
            assert_eq!(pair[0].step, step);
            let a = scale.iter().position(|&p| p == pair[0].pitch).unwrap() as i64;
            let b = scale.iter().position(|&p| p == pair[1].pitch).unwrap() as i64;
            assert!((a - b).abs() <= 2);
        }
    }
}
