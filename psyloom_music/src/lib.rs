// Psyloom pattern engine
//
// Seeded generation, variation and Markov inspiration of short melodic and
// rhythmic patterns for psytrance-style sequencing. Given a scale, a style, a
// mood and a structural part, the engine produces a deterministic pattern;
// given an existing phrase as MIDI bytes, it produces transformed variants or
// a longer continuation.
//
// Architecture:
// - note.rs: Pitch names, NoteEvent / Pattern (steps), NoteSequence (ticks)
// - scale.rs: Scale registry over an injectable store, scale building and
//   nearest-degree quantization
// - params.rs: Style / Mood / Part enums and the per-call option structs
// - config.rs: Data-driven EngineConfig (resolution, tempo, limits)
// - generator.rs: Part dispatch table and the shared placement builder
// - bassline.rs, lead.rs, pad.rs, arpeggio.rs, hypnotic.rs: Part strategies
// - mood.rs: Velocity and density post-processing by mood
// - variation.rs: Transpose / invert / quantize / swing / humanize / retrograde
// - markov.rs: Order-2 interval and duration models gated by a Euclidean mask
// - grid.rs: The editor grid (note-name rows of step cells)
// - midi.rs: SMF codec plus grid / pattern / sequence conversions
// - engine.rs: The generate / vary / inspire facade with per-call PRNGs
// - error.rs: PatternError taxonomy
//
// Every result is deterministic given its seed and config.

pub mod arpeggio;
pub mod bassline;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod grid;
pub mod hypnotic;
pub mod lead;
pub mod markov;
pub mod midi;
pub mod mood;
pub mod note;
pub mod pad;
pub mod params;
pub mod scale;
pub mod variation;

pub use config::EngineConfig;
pub use engine::{PatternEngine, Seeded};
pub use error::{PatternError, PatternResult};
pub use params::{GenerationParameters, InspirationOptions, Mood, Part, Style, VariationOptions};
