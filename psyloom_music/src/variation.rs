// Variation pipeline: new sequences derived from an existing one.
//
// One variant is produced per requested transposition, in order, all drawing
// from a single PRNG stream. Each variant runs the same fixed pipeline:
//
//   transpose -> invert -> keep-scale -> swing -> humanize -> retrograde
//
// The order matters. Inversion mirrors around the root in the octave of the
// already-transposed first note; quantization snaps the mirrored pitches;
// swing and humanize move onsets before retrograde reads the sequence end.
//
// Every stage takes a sequence and returns a new one, so the source is never
// touched. The stages are public for callers that want one of them alone.

use crate::config::EngineConfig;
use crate::error::{PatternError, PatternResult};
use crate::note::{NoteSequence, SequenceNote, clamp_pitch, clamp_velocity};
use crate::params::VariationOptions;
use crate::scale::{ScaleRegistry, ScaleStore};
use psyloom_prng::PatternRng;
use tracing::{debug, warn};

/// Run the full pipeline once per transposition.
pub fn vary_sequence<S: ScaleStore>(
    source: &NoteSequence,
    options: &VariationOptions,
    registry: &ScaleRegistry<S>,
    config: &EngineConfig,
    rng: &mut PatternRng,
) -> PatternResult<Vec<NoteSequence>> {
    let root = options.validate()?;
    let source = prepare_source(source, config)?;

    let mut variants = Vec::with_capacity(options.transpositions.len());
    for &semitones in &options.transpositions {
        let mut seq = transpose(&source, semitones);
        if options.invert {
            seq = invert(&seq, root);
        }
        if options.keep_scale {
            seq = quantize(&seq, registry, root, &options.scale_name);
        }
        if options.swing_amount > 0.0 {
            seq = swing(&seq, options.swing_amount);
        }
        if options.humanize_amount_ms > 0.0 {
            seq = humanize(&seq, options.humanize_amount_ms, config.humanize_velocity_spread, rng);
        }
        if options.retrograde {
            seq = retrograde(&seq);
        }
        debug!(semitones, notes = seq.notes.len(), "built variant");
        variants.push(seq);
    }
    Ok(variants)
}

/// Reject unusable sources and default zero fields.
fn prepare_source(source: &NoteSequence, config: &EngineConfig) -> PatternResult<NoteSequence> {
    if source.notes.is_empty() {
        return Err(PatternError::Input("source phrase has no notes".to_string()));
    }
    if source.end_tick().is_none() {
        return Err(PatternError::Input(
            "source phrase ends past the representable tick range".to_string(),
        ));
    }

    let steps_per_bar = u32::from(config.steps_per_bar.max(1));
    let step = (u32::from(source.ticks_per_quarter) * 4 / steps_per_bar).max(1);
    let mut defaulted = 0;
    let notes = source
        .notes
        .iter()
        .map(|n| {
            let mut note = *n;
            if note.duration_ticks == 0 {
                note.duration_ticks = step;
                defaulted += 1;
            }
            if note.velocity == 0 {
                note.velocity = config.default_velocity;
                defaulted += 1;
            }
            note
        })
        .collect();
    if defaulted > 0 {
        warn!(fields = defaulted, "defaulted missing note fields in source phrase");
    }

    let mut prepared = NoteSequence {
        notes,
        ..source.clone()
    };
    if prepared.end_tick().is_none() {
        return Err(PatternError::Input(
            "source phrase ends past the representable tick range".to_string(),
        ));
    }
    prepared.sort();
    Ok(prepared)
}

fn map_notes(seq: &NoteSequence, f: impl FnMut(&SequenceNote) -> SequenceNote) -> NoteSequence {
    let mut out = NoteSequence {
        notes: seq.notes.iter().map(f).collect(),
        ..seq.clone()
    };
    out.sort();
    if let Some(end) = out.end_tick() {
        out.length_ticks = out.length_ticks.max(end);
    }
    out
}

/// Shift every pitch by `semitones`, clamped to the MIDI range.
pub fn transpose(seq: &NoteSequence, semitones: i32) -> NoteSequence {
    map_notes(seq, |n| SequenceNote {
        pitch: clamp_pitch(i32::from(n.pitch) + semitones),
        ..*n
    })
}

/// Mirror every pitch around the root in the first note's octave.
pub fn invert(seq: &NoteSequence, root_pc: u8) -> NoteSequence {
    let Some(first) = seq.notes.first() else {
        return seq.clone();
    };
    let axis = i32::from(root_pc % 12) + 12 * i32::from(first.pitch / 12);
    map_notes(seq, |n| SequenceNote {
        pitch: clamp_pitch(2 * axis - i32::from(n.pitch)),
        ..*n
    })
}

/// Snap every pitch onto the scale.
pub fn quantize<S: ScaleStore>(
    seq: &NoteSequence,
    registry: &ScaleRegistry<S>,
    root_pc: u8,
    scale_name: &str,
) -> NoteSequence {
    map_notes(seq, |n| SequenceNote {
        pitch: registry.quantize_to_scale(n.pitch, root_pc, scale_name),
        ..*n
    })
}

/// Delay notes on odd eighth-note positions by `amount` of half a beat.
pub fn swing(seq: &NoteSequence, amount: f64) -> NoteSequence {
    let sub_beat = (u32::from(seq.ticks_per_quarter) / 2).max(1);
    let shift = (amount * f64::from(seq.ticks_per_quarter) / 2.0).round() as u32;
    map_notes(seq, |n| {
        let start = if (n.start_tick / sub_beat) % 2 == 1 {
            n.start_tick.saturating_add(shift)
        } else {
            n.start_tick
        };
        SequenceNote {
            start_tick: start,
            ..*n
        }
    })
}

/// Jitter every onset by up to `amount_ms` either way, never before zero, and
/// every velocity by up to `velocity_spread`.
pub fn humanize(
    seq: &NoteSequence,
    amount_ms: f64,
    velocity_spread: u8,
    rng: &mut PatternRng,
) -> NoteSequence {
    let spread = i32::from(velocity_spread);
    map_notes(seq, |n| {
        let jitter_ms = (rng.next_f64() * 2.0 - 1.0) * amount_ms;
        let jitter = seq.millis_to_ticks(jitter_ms).round();
        let start = (f64::from(n.start_tick) + jitter).clamp(0.0, f64::from(u32::MAX)) as u32;
        let velocity =
            clamp_velocity(i32::from(n.velocity) + rng.range_i32_inclusive(-spread, spread));
        SequenceNote {
            start_tick: start,
            velocity,
            ..*n
        }
    })
}

/// Play the sequence backwards: each note starts where it used to end,
/// measured back from the sequence end.
pub fn retrograde(seq: &NoteSequence) -> NoteSequence {
    let end = seq.end_tick().unwrap_or(u32::MAX);
    map_notes(seq, |n| SequenceNote {
        start_tick: end.saturating_sub(n.start_tick.saturating_add(n.duration_ticks)),
        ..*n
    })
}
