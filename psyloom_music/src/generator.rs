// Pattern generation: part dispatch and the shared placement helpers.
//
// Each structural part (bassline, lead, pad, arpeggio, hypnotic lead) is a
// `PartGenerator`. `generate_pattern` validates the request, builds the scale
// once, looks the part up in a static dispatch table, runs it with the
// caller's PRNG, and hands the result to the mood pass (mood.rs).
//
// Generators only ever place pitches by index into the built scale, so every
// emitted pitch is a member of `build_scale(root, scale, octaves)`. Notes go
// through a `PatternBuilder` keyed by (step, pitch): a later placement on the
// same key replaces the earlier one, and the output order is canonical.
//
// See bassline.rs, lead.rs, pad.rs, arpeggio.rs and hypnotic.rs for the
// individual strategies.

use crate::arpeggio::Arpeggio;
use crate::bassline::Bassline;
use crate::config::EngineConfig;
use crate::error::PatternResult;
use crate::hypnotic::HypnoticLead;
use crate::lead::Lead;
use crate::mood::apply_mood;
use crate::note::{NoteEvent, Pattern};
use crate::pad::Pad;
use crate::params::{GenerationParameters, Mood, Part, Style};
use crate::scale::{ScaleRegistry, ScaleStore, fifth_degree};
use psyloom_prng::PatternRng;
use std::collections::BTreeMap;
use tracing::debug;

/// Steps per beat on the generation grid (sixteenth notes).
pub const STEPS_PER_BEAT: usize = 4;

/// Read-only view of a validated request, shared by all part generators.
#[derive(Debug, Clone)]
pub struct PartContext<'a> {
    pub style: Style,
    pub mood: Mood,
    pub step_count: usize,
    /// Ascending scale pitches; every emitted pitch is one of these.
    pub scale: &'a [u8],
    /// Degrees in one octave of the scale.
    pub degrees: usize,
    /// Index of the fifth within one octave of degrees.
    pub fifth: usize,
}

impl<'a> PartContext<'a> {
    pub fn new(
        style: Style,
        mood: Mood,
        step_count: usize,
        scale: &'a [u8],
        intervals: &[u8],
    ) -> Self {
        PartContext {
            style,
            mood,
            step_count,
            scale,
            degrees: intervals.len().max(1),
            fifth: fifth_degree(intervals),
        }
    }

    pub fn top_index(&self) -> usize {
        self.scale.len().saturating_sub(1)
    }

    /// Index of the root nearest the middle of the range, rounding down.
    pub fn mid_root(&self) -> usize {
        (self.scale.len() / 2 / self.degrees) * self.degrees
    }

    /// The fifth above the root at `root_index`, kept inside the range.
    pub fn fifth_of(&self, root_index: usize) -> usize {
        (root_index + self.fifth).min(self.top_index())
    }

    /// The octave above the root at `root_index`, or the root itself when the
    /// range has no room.
    pub fn octave_of(&self, root_index: usize) -> usize {
        let up = root_index + self.degrees;
        if up <= self.top_index() { up } else { root_index }
    }

    /// Clamp a signed scale index into the range.
    pub fn clamp_index(&self, index: i64) -> usize {
        index.clamp(0, self.top_index() as i64) as usize
    }

    pub fn pitch(&self, index: usize) -> u8 {
        self.scale[index.min(self.top_index())]
    }
}

/// A strategy producing the notes of one structural part.
pub trait PartGenerator: Sync {
    fn generate(&self, ctx: &PartContext<'_>, rng: &mut PatternRng) -> Vec<NoteEvent>;
}

/// Dispatch table from part to strategy.
static GENERATORS: [(Part, &dyn PartGenerator); 5] = [
    (Part::Bassline, &Bassline),
    (Part::Lead, &Lead),
    (Part::Pad, &Pad),
    (Part::Arpeggio, &Arpeggio),
    (Part::HypnoticLead, &HypnoticLead),
];

/// Look up the strategy for a part.
pub fn generator_for(part: Part) -> &'static dyn PartGenerator {
    GENERATORS
        .iter()
        .find(|(p, _)| *p == part)
        .map(|(_, g)| *g)
        .unwrap_or(&Bassline)
}

/// Generate a pattern for validated parameters with an explicit PRNG.
///
/// The mood pass runs exactly once, drawing from the same stream after the
/// part generator. Same parameters and same stream state give the same pattern.
pub fn generate_pattern<S: ScaleStore>(
    params: &GenerationParameters,
    registry: &ScaleRegistry<S>,
    config: &EngineConfig,
    rng: &mut PatternRng,
) -> PatternResult<Pattern> {
    let root = params.validate(config)?;
    let intervals = registry.intervals(&params.scale_name);
    let scale = registry.build_scale(
        root,
        &params.scale_name,
        params.octave_range.min,
        params.octave_range.max,
    );
    if scale.is_empty() {
        debug!(root = %params.root, "octave range holds no playable pitches");
        return Ok(Pattern::new(params.step_count, Vec::new()));
    }

    let ctx = PartContext::new(params.style, params.mood, params.step_count, &scale, &intervals);
    debug!(
        part = %params.part,
        style = %params.style,
        steps = params.step_count,
        scale_len = scale.len(),
        "generating part"
    );
    let notes = generator_for(params.part).generate(&ctx, rng);
    let pattern = Pattern::new(params.step_count, notes);
    Ok(apply_mood(&pattern, params.mood, &scale, rng))
}

/// Accumulates notes keyed by (step, pitch), latest placement wins.
#[derive(Debug, Default)]
pub struct PatternBuilder {
    step_count: usize,
    notes: BTreeMap<(usize, u8), NoteEvent>,
}

impl PatternBuilder {
    pub fn new(step_count: usize) -> Self {
        PatternBuilder {
            step_count,
            notes: BTreeMap::new(),
        }
    }

    /// Place a note, replacing any note with the same step and pitch.
    /// Notes past the end are dropped; durations are cut at the end.
    pub fn place(&mut self, mut note: NoteEvent) {
        if note.step >= self.step_count {
            return;
        }
        note.duration = note.duration.clamp(1, self.step_count - note.step);
        self.notes.insert((note.step, note.pitch), note);
    }

    /// Remove every note starting at `step`.
    pub fn clear_step(&mut self, step: usize) {
        self.notes.retain(|&(s, _), _| s != step);
    }

    pub fn is_occupied(&self, step: usize, pitch: u8) -> bool {
        self.notes.contains_key(&(step, pitch))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn finish(self) -> Vec<NoteEvent> {
        self.notes.into_values().collect()
    }
}
