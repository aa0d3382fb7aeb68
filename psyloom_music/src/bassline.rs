// Bassline generation.
//
// Three families of placement, chosen by style:
// - Energetic (goa, psy): the downbeat belongs to the kick, so notes land on
//   the three sixteenths after it. Velocity sits in a narrow high band and a
//   note occasionally swaps the root for another pool degree.
// - Progressive: a sparse offbeat hit every fourth step, alternating root and
//   fifth.
// - Everything else: a root on every downbeat plus sparse fills drawn from
//   the pool.
//
// The pool is the lowest root, its fifth and its octave.

use crate::generator::{PartContext, PartGenerator, PatternBuilder, STEPS_PER_BEAT};
use crate::note::NoteEvent;
use crate::params::Style;
use psyloom_prng::PatternRng;

pub struct Bassline;

impl PartGenerator for Bassline {
    fn generate(&self, ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<NoteEvent> {
        let mut builder = PatternBuilder::new(ctx.step_count);
        let root = 0;
        let pool = [root, ctx.fifth_of(root), ctx.octave_of(root)];

        match ctx.style {
            Style::Goa | Style::Psy => rolling(ctx, rng, &pool, &mut builder),
            Style::Prog => offbeat(ctx, &pool, &mut builder),
            Style::Downtempo | Style::Deep | Style::Ambient => {
                downbeat(ctx, rng, &pool, &mut builder)
            }
        }

        builder.finish()
    }
}

/// Offbeat sixteenths with a narrow high velocity band.
fn rolling(
    ctx: &PartContext<'_>,
    rng: &mut PatternRng,
    pool: &[usize; 3],
    builder: &mut PatternBuilder,
) {
    let (density, velocity_band, slide_chance) = match ctx.style {
        Style::Psy => (0.9, (104, 116), 0.0),
        _ => (0.75, (96, 110), 0.1),
    };

    for step in 0..ctx.step_count {
        if step % STEPS_PER_BEAT == 0 || !rng.chance(density) {
            continue;
        }
        let index = if rng.chance(0.15) {
            rng.pick(pool).copied().unwrap_or(pool[0])
        } else {
            pool[0]
        };
        let velocity = rng.range_u8_inclusive(velocity_band.0, velocity_band.1);
        let slide = slide_chance > 0.0 && rng.chance(slide_chance);
        builder.place(
            NoteEvent::new(step, ctx.pitch(index), velocity)
                .with_accent(step % STEPS_PER_BEAT == 2)
                .with_slide(slide),
        );
    }
}

/// One hit per beat on the offbeat, alternating root and fifth.
fn offbeat(ctx: &PartContext<'_>, pool: &[usize; 3], builder: &mut PatternBuilder) {
    let offset = STEPS_PER_BEAT / 2;
    for (hit, step) in (offset..ctx.step_count).step_by(STEPS_PER_BEAT).enumerate() {
        let index = if hit % 2 == 0 { pool[0] } else { pool[1] };
        builder.place(NoteEvent::new(step, ctx.pitch(index), 100).with_duration(2));
    }
}

/// Root on every downbeat, sparse fills between.
fn downbeat(
    ctx: &PartContext<'_>,
    rng: &mut PatternRng,
    pool: &[usize; 3],
    builder: &mut PatternBuilder,
) {
    let (hold, fill_chance) = match ctx.style {
        Style::Ambient => (4, 0.05),
        Style::Deep => (2, 0.12),
        _ => (2, 0.15),
    };

    for step in 0..ctx.step_count {
        if step % STEPS_PER_BEAT == 0 {
            builder.place(NoteEvent::new(step, ctx.pitch(pool[0]), 90).with_duration(hold));
        } else if step % STEPS_PER_BEAT != 1 && rng.chance(fill_chance) {
            let index = rng.pick(pool).copied().unwrap_or(pool[0]);
            let velocity = rng.range_u8_inclusive(70, 85);
            builder.place(NoteEvent::new(step, ctx.pitch(index), velocity));
        }
    }
}
