// Pad generation: sustained two-note voicings in the upper half of the range.
//
// A voicing is placed every `interval` steps and held for `hold` steps, both
// fixed per style. The lower voice is drawn from the upper half of the scale
// range; a third above (two scale degrees) is added when it fits. Placements
// may overlap; a later placement on the same (step, pitch) replaces an
// earlier one. A placement with no room to sustain is skipped.

use crate::generator::{PartContext, PartGenerator, PatternBuilder};
use crate::note::{NoteEvent, clamp_velocity};
use crate::params::Style;
use psyloom_prng::PatternRng;

pub struct Pad;

/// (placement interval, hold length) in steps.
fn spacing(style: Style) -> (usize, usize) {
    match style {
        Style::Goa | Style::Psy => (16, 12),
        Style::Prog => (8, 6),
        Style::Downtempo => (8, 8),
        Style::Deep => (8, 12),
        Style::Ambient => (16, 24),
    }
}

impl PartGenerator for Pad {
    fn generate(&self, ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<NoteEvent> {
        let (interval, hold) = spacing(ctx.style);
        let low = ctx.scale.len() / 2;
        let top = ctx.top_index();
        let mut builder = PatternBuilder::new(ctx.step_count);

        for step in (0..ctx.step_count).step_by(interval) {
            if ctx.step_count - step < 2 {
                break;
            }
            let index = rng.range_usize(low, top + 1);
            let velocity = clamp_velocity(70 + rng.range_i32_inclusive(0, 10));
            builder.place(NoteEvent::new(step, ctx.pitch(index), velocity).with_duration(hold));
            if index + 2 <= top {
                builder.place(
                    NoteEvent::new(step, ctx.pitch(index + 2), velocity.saturating_sub(8).max(1))
                        .with_duration(hold),
                );
            }
        }

        builder.finish()
    }
}
