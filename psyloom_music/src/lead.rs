// Lead generation: a short motif tiled across the pattern.
//
// The motif (16 steps for goa/psy, 8 otherwise) is a constrained walk over
// scale indices anchored on the root nearest the middle of the range. Each
// motif step is either silent, with a style-dependent probability, or a move:
// - prog weights moves 40/30/20/10 toward tonic / adjacent degree / fifth /
//   a wider leap;
// - every other style takes a plain uniform signed step.
// The motif then repeats across the whole step count.
//
// Two style-specific touches follow the tiling:
// - downtempo sometimes re-times each beat as a triplet (offsets 0, 1, 3);
// - goa stamps hook notes: tonic at step 0 and at the half-way step when the
//   pattern is long enough, and the fifth at the motif midpoint.

use crate::generator::{PartContext, PartGenerator, PatternBuilder, STEPS_PER_BEAT};
use crate::note::{NoteEvent, clamp_velocity};
use crate::params::Style;
use psyloom_prng::PatternRng;

pub struct Lead;

/// Pattern length from which goa repeats its tonic hook half-way.
const HALF_HOOK_MIN_STEPS: usize = 32;

/// Chance that downtempo leads get the triplet re-timing.
const TRIPLET_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
struct MotifNote {
    index: usize,
    velocity: u8,
    accent: bool,
}

impl PartGenerator for Lead {
    fn generate(&self, ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<NoteEvent> {
        let motif = build_motif(ctx, rng);
        let mut builder = PatternBuilder::new(ctx.step_count);

        let triplets = ctx.style == Style::Downtempo && rng.chance(TRIPLET_CHANCE);
        for step in 0..ctx.step_count {
            let Some(note) = motif[step % motif.len()] else {
                continue;
            };
            let placed = if triplets {
                match triplet_step(step) {
                    Some(s) => s,
                    None => continue,
                }
            } else {
                step
            };
            builder.place(
                NoteEvent::new(placed, ctx.pitch(note.index), note.velocity)
                    .with_accent(note.accent),
            );
        }

        if ctx.style == Style::Goa {
            stamp_hooks(ctx, motif.len(), &mut builder);
        }

        builder.finish()
    }
}

fn motif_length(style: Style) -> usize {
    if style.is_energetic() { 16 } else { 8 }
}

fn silence_chance(style: Style) -> f64 {
    match style {
        Style::Goa => 0.2,
        Style::Psy => 0.25,
        Style::Prog => 0.35,
        Style::Downtempo => 0.45,
        Style::Deep => 0.4,
        Style::Ambient => 0.55,
    }
}

fn build_motif(ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<Option<MotifNote>> {
    let anchor = ctx.mid_root();
    let max_step = if ctx.style.is_energetic() { 3 } else { 2 };
    let mut current = anchor;
    let mut motif = Vec::with_capacity(motif_length(ctx.style));

    for _ in 0..motif_length(ctx.style) {
        if rng.chance(silence_chance(ctx.style)) {
            motif.push(None);
            continue;
        }
        current = if ctx.style == Style::Prog {
            weighted_move(ctx, rng, anchor, current)
        } else {
            let offset = rng.range_i32_inclusive(-max_step, max_step);
            ctx.clamp_index(current as i64 + i64::from(offset))
        };
        let velocity =
            clamp_velocity(i32::from(ctx.style.base_velocity()) + rng.range_i32_inclusive(0, 15));
        let accent = ctx.style.is_energetic() && rng.chance(0.2);
        motif.push(Some(MotifNote {
            index: current,
            velocity,
            accent,
        }));
    }
    motif
}

/// Tonic 40%, adjacent degree 30%, fifth 20%, a two-or-three-degree leap 10%.
fn weighted_move(
    ctx: &PartContext<'_>,
    rng: &mut PatternRng,
    anchor: usize,
    current: usize,
) -> usize {
    let roll = rng.next_f64();
    if roll < 0.4 {
        anchor
    } else if roll < 0.7 {
        let dir = if rng.chance(0.5) { 1 } else { -1 };
        ctx.clamp_index(current as i64 + dir)
    } else if roll < 0.9 {
        ctx.fifth_of(anchor)
    } else {
        let leap = i64::from(rng.range_i32_inclusive(2, 3));
        let dir = if rng.chance(0.5) { 1 } else { -1 };
        ctx.clamp_index(current as i64 + dir * leap)
    }
}

/// Map a sixteenth position to its triplet slot within the beat: the four
/// sixteenths 0,1,2,3 become 0,1,3 and the last is dropped.
fn triplet_step(step: usize) -> Option<usize> {
    let beat = step - step % STEPS_PER_BEAT;
    match step % STEPS_PER_BEAT {
        0 => Some(beat),
        1 => Some(beat + 1),
        2 => Some(beat + 3),
        _ => None,
    }
}

fn stamp_hooks(ctx: &PartContext<'_>, motif_len: usize, builder: &mut PatternBuilder) {
    let tonic = ctx.pitch(ctx.mid_root());
    let fifth = ctx.pitch(ctx.fifth_of(ctx.mid_root()));

    place_hook(builder, 0, tonic);
    if ctx.step_count >= HALF_HOOK_MIN_STEPS {
        place_hook(builder, ctx.step_count / 2, tonic);
    }
    place_hook(builder, motif_len / 2, fifth);
}

/// A hook replaces whatever the motif put on its step.
fn place_hook(builder: &mut PatternBuilder, step: usize, pitch: u8) {
    builder.clear_step(step);
    builder.place(NoteEvent::new(step, pitch, 120).with_accent(true));
}
