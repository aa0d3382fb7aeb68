// Markov inspiration: extend a short seed phrase into a longer one.
//
// Two order-2 tables are learned from the seed phrase, one over the pitch
// intervals between consecutive notes and one over note durations. Each maps
// the last two values ("a,b") to the bag of values that followed that pair.
// A key that was never seen falls back to the whole pool of observed values.
//
// Generation starts from the seed's first two notes and then walks a cursor
// forward by sampled durations. Durations are rounded up to whole steps, so
// the cursor visits each step at most once. A Euclidean rhythm mask over the
// output's steps gates emission: a note is only placed when the cursor's step
// is a pulse. Pitches stay within an octave of the seed's range and may be snapped
// to the scale. The last note is cut to end exactly at the requested length.
//
// An order-2 model needs at least two transitions, so the seed must hold four
// or more notes.

use crate::config::EngineConfig;
use crate::error::{PatternError, PatternResult};
use crate::note::{NoteSequence, SequenceNote, clamp_pitch};
use crate::params::InspirationOptions;
use crate::scale::{ScaleRegistry, ScaleStore};
use psyloom_prng::PatternRng;
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::debug;

/// Smallest seed phrase an order-2 model can learn from.
pub const MIN_SEED_NOTES: usize = 4;

/// Context ("a,b") -> values that followed it.
type TransitionTable<T> = BTreeMap<String, Vec<T>>;

/// Learned order-2 model over one kind of value.
#[derive(Debug, Clone)]
pub struct OrderTwoModel<T> {
    table: TransitionTable<T>,
    pool: Vec<T>,
}

impl<T: Copy + Display> OrderTwoModel<T> {
    /// Learn transitions from an observed series.
    pub fn learn(values: &[T]) -> Self {
        let mut table = TransitionTable::new();
        for window in values.windows(3) {
            table
                .entry(context_key(&window[..2]))
                .or_default()
                .push(window[2]);
        }
        OrderTwoModel {
            table,
            pool: values.to_vec(),
        }
    }

    /// Values observed after the context, if the context was ever seen.
    pub fn followers(&self, context: &[T]) -> Option<&[T]> {
        if context.len() < 2 {
            return None;
        }
        self.table
            .get(&context_key(&context[context.len() - 2..]))
            .map(Vec::as_slice)
    }

    /// Draw the next value given recent history.
    pub fn sample(&self, history: &[T], rng: &mut PatternRng) -> Option<T> {
        let bag = self.followers(history).unwrap_or(&self.pool);
        rng.pick(bag).copied()
    }
}

/// Encode a context as a string key for table lookup.
fn context_key<T: Display>(context: &[T]) -> String {
    context.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

/// Spread `pulses` as evenly as possible over `size` slots.
///
/// An accumulator starts at `size - pulses`, gains `pulses` per slot, and a
/// slot is a pulse whenever it reaches `size`. Zero pulses give all rests.
pub fn euclid(size: usize, pulses: usize) -> Vec<bool> {
    let pulses = pulses.min(size);
    if pulses == 0 {
        return vec![false; size];
    }
    let mut acc = size - pulses;
    (0..size)
        .map(|_| {
            acc += pulses;
            if acc >= size {
                acc -= size;
                true
            } else {
                false
            }
        })
        .collect()
}

/// Extend a seed phrase to `options.length_in_bars` bars.
pub fn inspire_sequence<S: ScaleStore>(
    seed_phrase: &NoteSequence,
    options: &InspirationOptions,
    registry: &ScaleRegistry<S>,
    config: &EngineConfig,
    rng: &mut PatternRng,
) -> PatternResult<NoteSequence> {
    let root = options.validate(config)?;
    if seed_phrase.notes.len() < MIN_SEED_NOTES {
        return Err(PatternError::Input(format!(
            "seed phrase has {} notes, at least {} are needed",
            seed_phrase.notes.len(),
            MIN_SEED_NOTES
        )));
    }
    let mut seed = seed_phrase.clone();
    seed.sort();
    let notes = &seed.notes;

    let intervals: Vec<i16> = notes
        .windows(2)
        .map(|w| i16::from(w[1].pitch) - i16::from(w[0].pitch))
        .collect();

    let steps_per_bar = u32::from(config.steps_per_bar.max(1));
    let ticks_per_step = (u32::from(seed.ticks_per_quarter) * 4 / steps_per_bar).max(1);
    let slots = options.length_in_bars as usize * steps_per_bar as usize;
    let total = u32::try_from(slots)
        .ok()
        .and_then(|s| s.checked_mul(ticks_per_step))
        .ok_or_else(|| {
            PatternError::validation("length_in_bars", "phrase is too long at this resolution")
        })?;

    let durations: Vec<u32> = notes
        .iter()
        .map(|n| {
            n.duration_ticks
                .max(1)
                .div_ceil(ticks_per_step)
                .saturating_mul(ticks_per_step)
        })
        .collect();
    let interval_model = OrderTwoModel::learn(&intervals);
    let duration_model = OrderTwoModel::learn(&durations);
    let pulses = (slots as f64 * options.density).round() as usize;
    let mask = euclid(slots, pulses);

    let lowest = notes.iter().map(|n| i32::from(n.pitch)).min().unwrap_or(60) - 12;
    let highest = notes.iter().map(|n| i32::from(n.pitch)).max().unwrap_or(60) + 12;

    let mut out: Vec<SequenceNote> = vec![
        SequenceNote {
            start_tick: 0,
            duration_ticks: durations[0],
            ..notes[0]
        },
        SequenceNote {
            start_tick: durations[0],
            duration_ticks: durations[1],
            ..notes[1]
        },
    ];
    let mut interval_history: Vec<i16> = vec![intervals[0]];
    let mut duration_history: Vec<u32> = vec![durations[0], durations[1]];
    let mut last_pitch = i32::from(notes[1].pitch);
    let mut cursor = durations[0].saturating_add(durations[1]);

    while cursor < total {
        let (Some(interval), Some(duration)) = (
            interval_model.sample(&interval_history, rng),
            duration_model.sample(&duration_history, rng),
        ) else {
            break;
        };

        let slot = (cursor / ticks_per_step) as usize;
        if mask.get(slot).copied().unwrap_or(false) {
            let mut pitch =
                clamp_pitch((last_pitch + i32::from(interval)).clamp(lowest, highest));
            if options.keep_scale {
                pitch = registry.quantize_to_scale(pitch, root, &options.scale_name);
            }
            let template = notes[out.len() % notes.len()];
            out.push(SequenceNote {
                start_tick: cursor,
                duration_ticks: duration,
                pitch,
                ..template
            });
            interval_history.push(interval);
            last_pitch = i32::from(pitch);
        }

        duration_history.push(duration);
        cursor = cursor.saturating_add(duration);
    }

    out.retain(|n| n.start_tick < total);
    for note in &mut out {
        note.duration_ticks = note.duration_ticks.min(total - note.start_tick);
    }

    debug!(
        seed_notes = notes.len(),
        pulses,
        emitted = out.len(),
        length = total,
        "inspired phrase"
    );
    let mut phrase = NoteSequence {
        ticks_per_quarter: seed.ticks_per_quarter,
        tempo_micros: seed.tempo_micros,
        length_ticks: total,
        notes: out,
    };
    phrase.sort();
    Ok(phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn seed(pitches: &[u8]) -> NoteSequence {
        let notes = pitches
            .iter()
            .enumerate()
            .map(|(i, &pitch)| SequenceNote {
                start_tick: i as u32 * 120,
                duration_ticks: 120,
                pitch,
                velocity: 90 + i as u8,
                accent: false,
                slide: false,
            })
            .collect();
        NoteSequence {
            ticks_per_quarter: 480,
            tempo_micros: 413_793,
            length_ticks: pitches.len() as u32 * 120,
            notes,
        }
    }

    #[test]
    fn test_euclid_masks() {
        let bits = |v: Vec<bool>| v.into_iter().map(u8::from).collect::<Vec<_>>();
        assert_eq!(bits(euclid(8, 4)), vec![1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(bits(euclid(8, 3)), vec![1, 0, 0, 1, 0, 0, 1, 0]);
        assert_eq!(bits(euclid(4, 0)), vec![0, 0, 0, 0]);
        assert_eq!(bits(euclid(4, 9)), vec![1, 1, 1, 1]);
        assert!(euclid(0, 0).is_empty());
        assert_eq!(euclid(16, 5).into_iter().filter(|&b| b).count(), 5);
    }

    #[test]
    fn test_context_key() {
        assert_eq!(context_key(&[2i16, -1]), "2,-1");
        assert_eq!(context_key::<u32>(&[]), "");
    }

    #[test]
    fn test_order_two_model_follows_history() {
        let model = OrderTwoModel::learn(&[1i16, 2, 3, 1, 2, 4]);
        assert_eq!(model.followers(&[1, 2]), Some(&[3i16, 4][..]));
        assert_eq!(model.followers(&[9, 9]), None);
        assert_eq!(model.followers(&[1]), None);

        let mut rng = PatternRng::new(2);
        for _ in 0..20 {
            let next = model.sample(&[5, 1, 2], &mut rng).unwrap();
            assert!(next == 3 || next == 4);
        }
    }

    #[test]
    fn test_unseen_context_samples_the_whole_pool() {
        let model = OrderTwoModel::learn(&[1i16, 2, 3, 1, 2, 4]);
        let mut rng = PatternRng::new(5);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            let next = model.sample(&[7, 7], &mut rng).unwrap();
            assert!([1, 2, 3, 4].contains(&next));
            seen.insert(next);
        }
        // 1 and 2 never follow a seen context, so only the pool can produce them.
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(OrderTwoModel::<u32>::learn(&[]).sample(&[1, 2], &mut rng), None);
    }

    #[test]
    fn test_short_durations_stay_within_the_mask() {
        let registry = ScaleRegistry::builtin();
        let config = EngineConfig::default();
        let mut source = seed(&[60, 62, 63, 67]);
        source.ticks_per_quarter = 32767;
        for (i, note) in source.notes.iter_mut().enumerate() {
            note.start_tick = i as u32;
            note.duration_ticks = 1;
        }
        for bars in [1, 8] {
            let options = InspirationOptions {
                length_in_bars: bars,
                density: 1.0,
                ..InspirationOptions::default()
            };
            let phrase =
                inspire_sequence(&source, &options, &registry, &config, &mut PatternRng::new(9))
                    .unwrap();
            let pulses = bars as usize * 16;
            assert!(phrase.notes.len() <= pulses + 2, "{} notes", phrase.notes.len());
            let ticks_per_step = 32767 * 4 / 16;
            for pair in phrase.notes.windows(2) {
                assert!(pair[1].start_tick >= pair[0].start_tick + ticks_per_step);
            }
        }
    }

    #[test]
    fn test_three_note_seed_is_rejected() {
        let registry = ScaleRegistry::builtin();
        let config = EngineConfig::default();
        let err = inspire_sequence(
            &seed(&[60, 62, 63]),
            &InspirationOptions::default(),
            &registry,
            &config,
            &mut PatternRng::new(1),
        );
        assert!(matches!(err, Err(PatternError::Input(_))));
    }

    #[test]
    fn test_four_note_seed_fills_requested_length() {
        let registry = ScaleRegistry::builtin();
        let config = EngineConfig::default();
        let options = InspirationOptions {
            length_in_bars: 2,
            ..InspirationOptions::default()
        };
        let phrase = inspire_sequence(
            &seed(&[60, 62, 63, 67]),
            &options,
            &registry,
            &config,
            &mut PatternRng::new(7),
        )
        .unwrap();
        assert_eq!(phrase.length_ticks, 2 * 16 * 120);
        assert!(phrase.notes.len() > 2);
        assert!(phrase.end_tick().unwrap() <= phrase.length_ticks);
        for note in &phrase.notes {
            assert!((48..=79).contains(&note.pitch));
            assert!(registry.is_in_scale(note.pitch, 0, "minor"));
        }
    }

    #[test]
    fn test_notes_land_on_pulses() {
        let registry = ScaleRegistry::builtin();
        let config = EngineConfig::default();
        let options = InspirationOptions {
            length_in_bars: 1,
            density: 0.25,
            keep_scale: false,
            ..InspirationOptions::default()
        };
        let phrase = inspire_sequence(
            &seed(&[60, 64, 67, 72, 67]),
            &options,
            &registry,
            &config,
            &mut PatternRng::new(3),
        )
        .unwrap();
        let mask = euclid(16, 4);
        // The two seed notes open the phrase; every later note sits on a pulse.
        for note in phrase.notes.iter().skip(2) {
            assert!(mask[(note.start_tick / 120) as usize], "note at {}", note.start_tick);
        }
    }

    #[test]
    fn test_inspiration_is_deterministic() {
        let registry = ScaleRegistry::builtin();
        let config = EngineConfig::default();
        let source = seed(&[57, 60, 64, 62, 60]);
        let options = InspirationOptions::default();
        let run = |seed| {
            inspire_sequence(&source, &options, &registry, &config, &mut PatternRng::new(seed))
                .unwrap()
        };
        let (a, b) = (run(11), run(11));
        assert_eq!(a, b);
    }
}
