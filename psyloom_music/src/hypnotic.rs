// Hypnotic lead: a long evolving walk for 64-step and longer patterns.
//
// The walk keeps a direction flag that may flip at every 16-step boundary and
// also flips when the walk hits either end of the range. Each step may be
// silent, may snap back to the tonic, or moves one or two degrees in the
// current direction.
//
// Velocity follows an envelope: the style base (shifted by the mood) plus two
// sine waves, a 32-step macro-cycle and an 8-step sub-cycle, clamped to
// [45, 127]. Notes near the envelope peak are accented.

use crate::generator::{PartContext, PartGenerator, PatternBuilder};
use crate::note::NoteEvent;
use crate::params::Style;
use psyloom_prng::PatternRng;
use std::f64::consts::TAU;

pub struct HypnoticLead;

const PHRASE_STEPS: usize = 16;
const MACRO_CYCLE: f64 = 32.0;
const SUB_CYCLE: f64 = 8.0;
const MACRO_DEPTH: f64 = 14.0;
const SUB_DEPTH: f64 = 6.0;
const MIN_VELOCITY: f64 = 45.0;
const MAX_VELOCITY: f64 = 127.0;

const DIRECTION_FLIP_CHANCE: f64 = 0.5;
const TONIC_RETURN_CHANCE: f64 = 0.12;

fn silence_chance(style: Style) -> f64 {
    match style {
        Style::Goa | Style::Psy => 0.15,
        Style::Prog => 0.25,
        Style::Downtempo | Style::Deep => 0.3,
        Style::Ambient => 0.4,
    }
}

/// Velocity envelope at a step, before rounding.
pub fn envelope(base: f64, step: usize) -> f64 {
    let t = step as f64;
    let value = base
        + MACRO_DEPTH * (TAU * t / MACRO_CYCLE).sin()
        + SUB_DEPTH * (TAU * t / SUB_CYCLE).sin();
    value.clamp(MIN_VELOCITY, MAX_VELOCITY)
}

impl PartGenerator for HypnoticLead {
    fn generate(&self, ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<NoteEvent> {
        let mut builder = PatternBuilder::new(ctx.step_count);
        let tonic = ctx.mid_root();
        let top = ctx.top_index() as i64;
        let base = f64::from(i32::from(ctx.style.base_velocity()) + ctx.mood.velocity_bias());
        let slide_chance = if ctx.style == Style::Psy { 0.1 } else { 0.0 };

        let mut index = tonic as i64;
        let mut direction: i64 = 1;

        for step in 0..ctx.step_count {
            if step > 0 && step % PHRASE_STEPS == 0 && rng.chance(DIRECTION_FLIP_CHANCE) {
                direction = -direction;
            }
            if rng.chance(silence_chance(ctx.style)) {
                continue;
            }

            if rng.chance(TONIC_RETURN_CHANCE) {
                index = tonic as i64;
            } else {
                let stride = if rng.chance(0.25) { 2 } else { 1 };
                let next = index + direction * stride;
                if next < 0 || next > top {
                    direction = -direction;
                }
                index = (index + direction * stride).clamp(0, top);
            }

            let level = envelope(base, step);
            let slide = slide_chance > 0.0 && rng.chance(slide_chance);
            builder.place(
                NoteEvent::new(step, ctx.pitch(index as usize), level.round() as u8)
                    .with_accent(level >= base + MACRO_DEPTH * 0.75)
                    .with_slide(slide),
            );
        }

        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Mood;
    use crate::scale::ScaleRegistry;

    #[test]
    fn test_envelope_bounds_and_shape() {
        for step in 0..128 {
            let v = envelope(100.0, step);
            assert!((MIN_VELOCITY..=MAX_VELOCITY).contains(&v));
        }
        assert_eq!(envelope(100.0, 0), 100.0);
        // Quarter of the macro cycle: both waves add up near the peak.
        assert!(envelope(100.0, 8) > envelope(100.0, 24));
        assert_eq!(envelope(20.0, 24), MIN_VELOCITY);
        assert_eq!(envelope(125.0, 8), MAX_VELOCITY);
    }

    #[test]
    fn test_hypnotic_velocities_follow_envelope() {
        let registry = ScaleRegistry::builtin();
        let scale = registry.build_scale(0, "phrygian_dominant", 3, 5);
        let intervals = registry.intervals("phrygian_dominant");
        for mood in [Mood::Default, Mood::Dark, Mood::Uplifting] {
            let ctx = PartContext::new(Style::Goa, mood, 64, &scale, &intervals);
            let notes = HypnoticLead.generate(&ctx, &mut PatternRng::new(99));
            assert!(!notes.is_empty());
            let base = f64::from(i32::from(Style::Goa.base_velocity()) + mood.velocity_bias());
            for note in &notes {
                assert_eq!(note.velocity, envelope(base, note.step).round() as u8);
                assert!(note.velocity >= 45);
            }
        }
    }

    #[test]
    fn test_hypnotic_walk_moves_at_most_two_degrees_or_returns_to_tonic() {
        let registry = ScaleRegistry::builtin();
        let scale = registry.build_scale(0, "minor", 3, 5);
        let intervals = registry.intervals("minor");
        let ctx = PartContext::new(Style::Psy, Mood::Default, 128, &scale, &intervals);
        let notes = HypnoticLead.generate(&ctx, &mut PatternRng::new(4));
        let tonic = scale[ctx.mid_root()];
        for pair in notes.windows(2) {
            let a = scale.iter().position(|&p| p == pair[0].pitch).unwrap() as i64;
            let b = scale.iter().position(|&p| p == pair[1].pitch).unwrap() as i64;
            assert!((a - b).abs() <= 2 || pair[1].pitch == tonic);
        }
    }
}
