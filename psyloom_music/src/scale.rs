// Scale theory: the interval registry, scale construction, and snapping
// pitches onto a scale.
//
// Scales are interval sets (semitone offsets from the root, first element 0,
// strictly ascending, each in 0..=11). They live in a `ScaleRegistry`, which
// wraps a `ScaleStore` so user-defined scales can be persisted by whatever
// collaborator owns storage. The registry is seeded from a static table of
// built-in scales; there is no global registry.
//
// Unknown scale names never fail: they fall back to natural minor.
//
// Used by the generator (candidate pitches come only from `build_scale`),
// by variation (keep-scale quantization) and by inspiration.

use crate::error::{PatternError, PatternResult};
use crate::note::MAX_PITCH;
use std::collections::BTreeMap;
use tracing::debug;

/// Natural minor, the fallback for unknown names.
pub const NATURAL_MINOR: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Built-in scales seeded into every new registry.
pub const BUILTIN_SCALES: &[(&str, &[u8])] = &[
    ("major", &[0, 2, 4, 5, 7, 9, 11]),
    ("minor", &NATURAL_MINOR),
    ("harmonic_minor", &[0, 2, 3, 5, 7, 8, 11]),
    ("melodic_minor", &[0, 2, 3, 5, 7, 9, 11]),
    ("dorian", &[0, 2, 3, 5, 7, 9, 10]),
    ("phrygian", &[0, 1, 3, 5, 7, 8, 10]),
    ("lydian", &[0, 2, 4, 6, 7, 9, 11]),
    ("mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
    ("locrian", &[0, 1, 3, 5, 6, 8, 10]),
    ("phrygian_dominant", &[0, 1, 4, 5, 7, 8, 10]),
    ("hungarian_minor", &[0, 2, 3, 6, 7, 8, 11]),
    ("double_harmonic", &[0, 1, 4, 5, 7, 8, 11]),
    ("pentatonic_major", &[0, 2, 4, 7, 9]),
    ("pentatonic_minor", &[0, 3, 5, 7, 10]),
    ("whole_tone", &[0, 2, 4, 6, 8, 10]),
];

/// Key-value storage behind a registry.
pub trait ScaleStore {
    fn get(&self, name: &str) -> Option<Vec<u8>>;
    fn set(&mut self, name: &str, intervals: Vec<u8>);
    /// All stored names, sorted.
    fn list(&self) -> Vec<String>;
}

/// In-memory store, the default backing for a registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryScaleStore {
    scales: BTreeMap<String, Vec<u8>>,
}

impl ScaleStore for MemoryScaleStore {
    fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.scales.get(name).cloned()
    }

    fn set(&mut self, name: &str, intervals: Vec<u8>) {
        self.scales.insert(name.to_string(), intervals);
    }

    fn list(&self) -> Vec<String> {
        self.scales.keys().cloned().collect()
    }
}

/// Named interval sets, looked up case-insensitively.
#[derive(Debug, Clone)]
pub struct ScaleRegistry<S: ScaleStore = MemoryScaleStore> {
    store: S,
}

impl ScaleRegistry<MemoryScaleStore> {
    /// An in-memory registry holding the built-in scales.
    pub fn builtin() -> Self {
        ScaleRegistry::with_store(MemoryScaleStore::default())
    }
}

impl Default for ScaleRegistry<MemoryScaleStore> {
    fn default() -> Self {
        ScaleRegistry::builtin()
    }
}

impl<S: ScaleStore> ScaleRegistry<S> {
    /// Wrap a store, adding any built-in scale it does not already hold.
    pub fn with_store(mut store: S) -> Self {
        for (name, intervals) in BUILTIN_SCALES {
            if store.get(name).is_none() {
                store.set(name, intervals.to_vec());
            }
        }
        ScaleRegistry { store }
    }

    /// Add or replace a scale. The interval set must start at 0, ascend
    /// strictly and stay within one octave.
    pub fn register(&mut self, name: &str, intervals: &[u8]) -> PatternResult<()> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(PatternError::validation("scale_name", "must not be empty"));
        }
        validate_intervals(intervals)?;
        self.store.set(&key, intervals.to_vec());
        Ok(())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.store.list()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.get(&normalize_name(name)).is_some()
    }

    /// Interval set for a name, falling back to natural minor.
    pub fn intervals(&self, name: &str) -> Vec<u8> {
        match self.store.get(&normalize_name(name)) {
            Some(intervals) => intervals,
            None => {
                debug!(scale = name, "unknown scale, using natural minor");
                NATURAL_MINOR.to_vec()
            }
        }
    }

    /// All scale pitches from `octave_min` to `octave_max` inclusive, ascending.
    ///
    /// Octaves use the C4 = 60 convention. Pitches above 127 are dropped.
    pub fn build_scale(&self, root_pc: u8, name: &str, octave_min: u8, octave_max: u8) -> Vec<u8> {
        let intervals = self.intervals(name);
        let octaves = usize::from(octave_max.saturating_sub(octave_min)) + 1;
        let mut pitches = Vec::with_capacity(intervals.len() * octaves);
        for octave in octave_min..=octave_max {
            let base = (u16::from(octave) + 1) * 12 + u16::from(root_pc % 12);
            for &interval in &intervals {
                let pitch = base + u16::from(interval);
                if pitch <= u16::from(MAX_PITCH) {
                    pitches.push(pitch as u8);
                }
            }
        }
        pitches
    }

    /// Move a pitch onto the nearest scale degree.
    ///
    /// The pitch's offset from the root (mod 12) is compared against each
    /// degree by plain absolute distance; ties go to the first degree in
    /// ascending order. The octave is kept apart from the correction itself.
    pub fn quantize_to_scale(&self, pitch: u8, root_pc: u8, name: &str) -> u8 {
        let intervals = self.intervals(name);
        let offset = (i32::from(pitch) - i32::from(root_pc % 12)).rem_euclid(12);
        let mut best = offset;
        let mut best_distance = i32::MAX;
        for &degree in &intervals {
            let distance = (i32::from(degree) - offset).abs();
            if distance < best_distance {
                best_distance = distance;
                best = i32::from(degree);
            }
        }
        let mut corrected = i32::from(pitch) + (best - offset);
        if corrected > i32::from(MAX_PITCH) {
            corrected -= 12;
        }
        if corrected < 0 {
            corrected += 12;
        }
        corrected as u8
    }

    /// True if the pitch class is a degree of the scale.
    pub fn is_in_scale(&self, pitch: u8, root_pc: u8, name: &str) -> bool {
        let offset = ((i32::from(pitch) - i32::from(root_pc % 12)).rem_euclid(12)) as u8;
        self.intervals(name).contains(&offset)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn validate_intervals(intervals: &[u8]) -> PatternResult<()> {
    if intervals.first() != Some(&0) {
        return Err(PatternError::validation("intervals", "must start at 0"));
    }
    if intervals.iter().any(|&i| i > 11) {
        return Err(PatternError::validation("intervals", "each interval must be in 0..=11"));
    }
    if intervals.windows(2).any(|w| w[0] >= w[1]) {
        return Err(PatternError::validation(
            "intervals",
            "must be strictly ascending with no duplicates",
        ));
    }
    Ok(())
}

/// Index of the fifth (7 semitones) within one octave of degrees, or the
/// nearest degree above it when the scale has no perfect fifth.
pub fn fifth_degree(intervals: &[u8]) -> usize {
    intervals
        .iter()
        .position(|&i| i >= 7)
        .unwrap_or(intervals.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_scale_c_minor() {
        let registry = ScaleRegistry::builtin();
        let notes = registry.build_scale(0, "minor", 3, 4);
        assert_eq!(notes.len(), 14);
        assert_eq!(&notes[..7], &[48, 50, 51, 53, 55, 56, 58]);
        assert_eq!(notes[7], 60);
        assert!(notes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unknown_scale_falls_back_to_minor() {
        let registry = ScaleRegistry::builtin();
        assert_eq!(registry.intervals("no_such_scale"), NATURAL_MINOR.to_vec());
        assert_eq!(
            registry.build_scale(2, "no_such_scale", 2, 2),
            registry.build_scale(2, "minor", 2, 2)
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = ScaleRegistry::builtin();
        assert_eq!(registry.intervals("Phrygian_Dominant"), vec![0, 1, 4, 5, 7, 8, 10]);
        assert!(registry.contains(" MAJOR "));
    }

    #[test]
    fn test_build_scale_drops_out_of_range_pitches() {
        let registry = ScaleRegistry::builtin();
        let notes = registry.build_scale(0, "major", 9, 9);
        assert_eq!(notes, vec![120, 122, 124, 125, 127]);
        assert!(registry.build_scale(11, "major", 9, 9).is_empty());
    }

    #[test]
    fn test_build_scale_full_octave_span() {
        let registry = ScaleRegistry::builtin();
        let notes = registry.build_scale(0, "major", 0, u8::MAX);
        assert_eq!(notes.len(), 9 * 7 + 5);
        assert_eq!(notes.first(), Some(&12));
        assert_eq!(notes.last(), Some(&127));
    }

    #[test]
    fn test_quantize_nearest_and_ties() {
        let registry = ScaleRegistry::builtin();
        // C minor: E (offset 4) is equidistant from Eb (3) and F (5); first wins.
        assert_eq!(registry.quantize_to_scale(64, 0, "minor"), 63);
        // B (offset 11) is 1 from Bb and not wrapped to C.
        assert_eq!(registry.quantize_to_scale(71, 0, "minor"), 70);
        // In-scale pitches are untouched.
        assert_eq!(registry.quantize_to_scale(67, 0, "minor"), 67);
        // Root other than C: D dorian, F# -> F (tie with G goes to F).
        assert_eq!(registry.quantize_to_scale(66, 2, "dorian"), 65);
    }

    #[test]
    fn test_quantize_is_idempotent() {
        let registry = ScaleRegistry::builtin();
        for name in registry.names() {
            for root in 0..12 {
                for pitch in 0..=MAX_PITCH {
                    let once = registry.quantize_to_scale(pitch, root, &name);
                    let twice = registry.quantize_to_scale(once, root, &name);
                    assert_eq!(once, twice, "{name} root {root} pitch {pitch}");
                    assert!(registry.is_in_scale(once, root, &name));
                }
            }
        }
    }

    #[test]
    fn test_register_validates_intervals() {
        let mut registry = ScaleRegistry::builtin();
        assert!(registry.register("bad_start", &[1, 3, 5]).is_err());
        assert!(registry.register("bad_order", &[0, 5, 3]).is_err());
        assert!(registry.register("dupes", &[0, 3, 3]).is_err());
        assert!(registry.register("too_wide", &[0, 12]).is_err());
        assert!(registry.register("", &[0, 7]).is_err());

        registry.register("Power", &[0, 7]).unwrap();
        assert_eq!(registry.intervals("power"), vec![0, 7]);
        assert!(registry.names().contains(&"power".to_string()));
    }

    #[test]
    fn test_with_store_keeps_existing_entries() {
        let mut store = MemoryScaleStore::default();
        store.set("minor", vec![0, 3, 7]);
        let registry = ScaleRegistry::with_store(store);
        assert_eq!(registry.intervals("minor"), vec![0, 3, 7]);
        assert!(registry.contains("major"));
    }

    #[test]
    fn test_fifth_degree() {
        assert_eq!(fifth_degree(&NATURAL_MINOR), 4);
        assert_eq!(fifth_degree(&[0, 3, 5, 7, 10]), 3);
        assert_eq!(fifth_degree(&[0, 2, 4, 6, 8, 10]), 4);
        assert_eq!(fifth_degree(&[0]), 0);
    }
}
