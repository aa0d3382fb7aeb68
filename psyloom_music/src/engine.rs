// The engine facade: the three public calls over bytes and parameters.
//
// `PatternEngine` owns an `EngineConfig` and a `ScaleRegistry` and exposes
// `generate`, `vary` and `inspire`. Every call creates its own PRNG from the
// request's seed, so calls share no mutable state and an engine can be used
// from several threads at once. When a request carries no seed, one is drawn
// from the OS-seeded `rand` generator, logged, and returned with the result so
// the call can be repeated exactly.
//
// `vary` and `inspire` take and return SMF bytes; the codec (midi.rs) sits on
// both sides of the transformation.

use crate::config::EngineConfig;
use crate::error::{PatternError, PatternResult};
use crate::generator::generate_pattern;
use crate::markov::inspire_sequence;
use crate::midi::{decode_sequence, encode_sequence};
use crate::note::{NoteSequence, Pattern};
use crate::params::{GenerationParameters, InspirationOptions, VariationOptions};
use crate::scale::{MemoryScaleStore, ScaleRegistry, ScaleStore};
use crate::variation::vary_sequence;
use psyloom_prng::PatternRng;
use tracing::info;

/// A result together with the seed that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeded<T> {
    pub seed: u32,
    pub value: T,
}

#[derive(Debug, Clone)]
pub struct PatternEngine<S: ScaleStore = MemoryScaleStore> {
    config: EngineConfig,
    registry: ScaleRegistry<S>,
}

impl PatternEngine<MemoryScaleStore> {
    /// An engine with the built-in scales.
    pub fn new(config: EngineConfig) -> PatternResult<Self> {
        PatternEngine::with_registry(config, ScaleRegistry::builtin())
    }
}

impl<S: ScaleStore> PatternEngine<S> {
    pub fn with_registry(config: EngineConfig, registry: ScaleRegistry<S>) -> PatternResult<Self> {
        config.validate()?;
        Ok(PatternEngine { config, registry })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ScaleRegistry<S> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ScaleRegistry<S> {
        &mut self.registry
    }

    /// Generate one part. An empty pattern is a valid result.
    pub fn generate(&self, params: &GenerationParameters) -> PatternResult<Seeded<Pattern>> {
        params.validate(&self.config)?;
        let seed = resolve_seed(params.seed);
        let mut rng = PatternRng::new(seed);
        let pattern = generate_pattern(params, &self.registry, &self.config, &mut rng)?;
        info!(
            part = %params.part,
            style = %params.style,
            seed,
            notes = pattern.notes.len(),
            "generated pattern"
        );
        Ok(Seeded { seed, value: pattern })
    }

    /// One encoded variant per transposition, in order.
    pub fn vary(
        &self,
        source: &[u8],
        options: &VariationOptions,
    ) -> PatternResult<Seeded<Vec<Vec<u8>>>> {
        options.validate()?;
        let sequence = self.decode_source(source)?;
        let seed = resolve_seed(options.seed);
        let mut rng = PatternRng::new(seed);
        let variants = vary_sequence(&sequence, options, &self.registry, &self.config, &mut rng)?;
        let streams = variants
            .iter()
            .map(|v| encode_sequence(v, &self.config))
            .collect::<PatternResult<Vec<_>>>()?;
        info!(seed, variants = streams.len(), "varied phrase");
        Ok(Seeded { seed, value: streams })
    }

    /// Extend an encoded seed phrase; returns the encoded result.
    pub fn inspire(
        &self,
        source: &[u8],
        options: &InspirationOptions,
    ) -> PatternResult<Seeded<Vec<u8>>> {
        options.validate(&self.config)?;
        let sequence = self.decode_source(source)?;
        let seed = resolve_seed(options.seed);
        let mut rng = PatternRng::new(seed);
        let phrase = inspire_sequence(&sequence, options, &self.registry, &self.config, &mut rng)?;
        info!(seed, notes = phrase.notes.len(), "inspired phrase");
        Ok(Seeded {
            seed,
            value: encode_sequence(&phrase, &self.config)?,
        })
    }

    fn decode_source(&self, source: &[u8]) -> PatternResult<NoteSequence> {
        let sequence = decode_sequence(source, &self.config)?;
        if sequence.notes.len() > self.config.max_source_notes {
            return Err(PatternError::Input(format!(
                "source phrase has {} notes, the limit is {}",
                sequence.notes.len(),
                self.config.max_source_notes
            )));
        }
        Ok(sequence)
    }
}

/// Use the requested seed, or draw and log a fresh one.
fn resolve_seed(requested: Option<u32>) -> u32 {
    match requested {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u32>();
            info!(seed, "no seed given, drew one");
            seed
        }
    }
}
