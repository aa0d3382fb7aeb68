// Request parameters for the three engine calls, and their validation.
//
// `Style`, `Mood` and `Part` are closed enums; the string forms accepted on
// the CLI and in JSON are the camelCase variant names ("goa", "hypnoticLead").
// Validation runs before any generation work and reports the first problem as
// `PatternError::Validation`. Bounds that depend on deployment (maximum step
// count, maximum bars) come from `EngineConfig`.

use crate::config::EngineConfig;
use crate::error::{PatternError, PatternResult};
use crate::note::pitch_class;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest octave accepted in an octave range (C4 = 60 convention).
pub const MAX_OCTAVE: u8 = 8;

/// Musical style steering the stochastic rules of every part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Style {
    Goa,
    Psy,
    Prog,
    Downtempo,
    Deep,
    Ambient,
}

impl Style {
    pub const ALL: [Style; 6] = [
        Style::Goa,
        Style::Psy,
        Style::Prog,
        Style::Downtempo,
        Style::Deep,
        Style::Ambient,
    ];

    /// Driving full-on styles: offbeat bass, long motifs.
    pub fn is_energetic(self) -> bool {
        matches!(self, Style::Goa | Style::Psy)
    }

    /// Base velocity for melodic parts.
    pub fn base_velocity(self) -> u8 {
        match self {
            Style::Goa => 105,
            Style::Psy => 100,
            Style::Prog => 95,
            Style::Downtempo => 85,
            Style::Deep => 80,
            Style::Ambient => 70,
        }
    }
}

/// Ambiance tag applied once after generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mood {
    #[default]
    Default,
    Dark,
    Uplifting,
    Dense,
}

impl Mood {
    /// Offset added to the hypnotic lead's base velocity.
    pub fn velocity_bias(self) -> i32 {
        match self {
            Mood::Dark => -10,
            Mood::Uplifting => 10,
            Mood::Default | Mood::Dense => 0,
        }
    }
}

/// Structural role of the generated pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Bassline,
    Lead,
    Pad,
    Arpeggio,
    HypnoticLead,
}

impl Part {
    pub const ALL: [Part; 5] = [
        Part::Bassline,
        Part::Lead,
        Part::Pad,
        Part::Arpeggio,
        Part::HypnoticLead,
    ];
}

/// Implements `FromStr` and `Display` through the serde camelCase names so
/// the CLI, JSON and log output all agree on spelling.
macro_rules! name_conversions {
    ($ty:ty, $param:literal) => {
        impl FromStr for $ty {
            type Err = PatternError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_json::from_value(serde_json::Value::String(s.trim().to_string())).map_err(
                    |_| PatternError::validation($param, format!("unknown value '{}'", s)),
                )
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match serde_json::to_value(self) {
                    Ok(serde_json::Value::String(name)) => f.write_str(&name),
                    _ => write!(f, "{:?}", self),
                }
            }
        }
    };
}

name_conversions!(Style, "style");
name_conversions!(Mood, "mood");
name_conversions!(Part, "part");

/// Inclusive octave span the generator may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OctaveRange {
    pub min: u8,
    pub max: u8,
}

impl OctaveRange {
    pub fn new(min: u8, max: u8) -> Self {
        OctaveRange { min, max }
    }

    fn validate(&self) -> PatternResult<()> {
        if self.min > self.max {
            return Err(PatternError::validation(
                "octave_range",
                format!("min {} is above max {}", self.min, self.max),
            ));
        }
        if self.max > MAX_OCTAVE {
            return Err(PatternError::validation(
                "octave_range",
                format!("max {} is above {}", self.max, MAX_OCTAVE),
            ));
        }
        Ok(())
    }
}

impl Default for OctaveRange {
    fn default() -> Self {
        OctaveRange { min: 2, max: 4 }
    }
}

/// Everything `generate` needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    /// Root pitch class name ("C", "F#", "Bb").
    pub root: String,
    pub scale_name: String,
    pub style: Style,
    #[serde(default)]
    pub mood: Mood,
    pub part: Part,
    pub step_count: usize,
    #[serde(default)]
    pub octave_range: OctaveRange,
    #[serde(default)]
    pub seed: Option<u32>,
}

impl GenerationParameters {
    /// Check every field; returns the parsed root pitch class.
    pub fn validate(&self, config: &EngineConfig) -> PatternResult<u8> {
        let root = parse_root(&self.root)?;
        if self.step_count == 0 {
            return Err(PatternError::validation("step_count", "must be positive"));
        }
        if self.step_count > config.max_step_count {
            return Err(PatternError::validation(
                "step_count",
                format!("{} exceeds the limit of {}", self.step_count, config.max_step_count),
            ));
        }
        self.octave_range.validate()?;
        Ok(root)
    }
}

/// Options for `vary`: one output per transposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationOptions {
    /// Semitone offsets; one variant is produced per entry, in order.
    pub transpositions: Vec<i32>,
    /// Swing in [0, 1].
    #[serde(default)]
    pub swing_amount: f64,
    /// Maximum onset jitter in milliseconds.
    #[serde(default)]
    pub humanize_amount_ms: f64,
    #[serde(default)]
    pub retrograde: bool,
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub seed: Option<u32>,
    pub root: String,
    pub scale_name: String,
    #[serde(default)]
    pub keep_scale: bool,
}

impl Default for VariationOptions {
    fn default() -> Self {
        VariationOptions {
            transpositions: vec![0],
            swing_amount: 0.0,
            humanize_amount_ms: 0.0,
            retrograde: false,
            invert: false,
            seed: None,
            root: "C".to_string(),
            scale_name: "minor".to_string(),
            keep_scale: false,
        }
    }
}

impl VariationOptions {
    /// Check every field; returns the parsed root pitch class.
    pub fn validate(&self) -> PatternResult<u8> {
        let root = parse_root(&self.root)?;
        if self.transpositions.is_empty() {
            return Err(PatternError::validation(
                "transpositions",
                "at least one transposition is required",
            ));
        }
        if let Some(&bad) = self.transpositions.iter().find(|t| t.abs() > 127) {
            return Err(PatternError::validation(
                "transpositions",
                format!("{} semitones is outside the MIDI range", bad),
            ));
        }
        if !(0.0..=1.0).contains(&self.swing_amount) {
            return Err(PatternError::validation("swing_amount", "must be in [0, 1]"));
        }
        if !self.humanize_amount_ms.is_finite() || self.humanize_amount_ms < 0.0 {
            return Err(PatternError::validation(
                "humanize_amount_ms",
                "must be a non-negative number",
            ));
        }
        Ok(root)
    }
}

/// Options for `inspire`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspirationOptions {
    pub length_in_bars: u32,
    #[serde(default)]
    pub seed: Option<u32>,
    pub root: String,
    pub scale_name: String,
    #[serde(default)]
    pub keep_scale: bool,
    /// Fraction of rhythm-mask slots that are pulses, in [0, 1].
    pub density: f64,
}

impl Default for InspirationOptions {
    fn default() -> Self {
        InspirationOptions {
            length_in_bars: 4,
            seed: None,
            root: "C".to_string(),
            scale_name: "minor".to_string(),
            keep_scale: true,
            density: 0.5,
        }
    }
}

impl InspirationOptions {
    /// Check every field; returns the parsed root pitch class.
    pub fn validate(&self, config: &EngineConfig) -> PatternResult<u8> {
        let root = parse_root(&self.root)?;
        if self.length_in_bars == 0 || self.length_in_bars > config.max_bars {
            return Err(PatternError::validation(
                "length_in_bars",
                format!("must be in 1..={}", config.max_bars),
            ));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(PatternError::validation("density", "must be in [0, 1]"));
        }
        Ok(root)
    }
}

fn parse_root(root: &str) -> PatternResult<u8> {
    pitch_class(root)
        .ok_or_else(|| PatternError::validation("root", format!("'{}' is not a note name", root)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bass_params() -> GenerationParameters {
        GenerationParameters {
            root: "C".to_string(),
            scale_name: "minor".to_string(),
            style: Style::Psy,
            mood: Mood::Default,
            part: Part::Bassline,
            step_count: 16,
            octave_range: OctaveRange::new(2, 3),
            seed: Some(42),
        }
    }

    #[test]
    fn test_enum_names() {
        assert_eq!("hypnoticLead".parse::<Part>().unwrap(), Part::HypnoticLead);
        assert_eq!("goa".parse::<Style>().unwrap(), Style::Goa);
        assert_eq!(" dark ".parse::<Mood>().unwrap(), Mood::Dark);
        assert!("trance".parse::<Style>().is_err());
        assert_eq!(Part::HypnoticLead.to_string(), "hypnoticLead");
        assert_eq!(Style::Downtempo.to_string(), "downtempo");
    }

    #[test]
    fn test_generation_validation() {
        let config = EngineConfig::default();
        assert_eq!(bass_params().validate(&config).unwrap(), 0);

        let mut p = bass_params();
        p.step_count = 0;
        assert!(matches!(p.validate(&config), Err(PatternError::Validation { .. })));

        let mut p = bass_params();
        p.step_count = config.max_step_count + 1;
        assert!(p.validate(&config).is_err());

        let mut p = bass_params();
        p.octave_range = OctaveRange::new(4, 2);
        assert!(p.validate(&config).is_err());

        let mut p = bass_params();
        p.octave_range = OctaveRange::new(2, 9);
        assert!(p.validate(&config).is_err());

        let mut p = bass_params();
        p.root = "X".to_string();
        assert!(p.validate(&config).is_err());
    }

    #[test]
    fn test_generation_params_from_json() {
        let json = r#"{"root":"F#","scaleName":"phrygian","style":"goa",
            "part":"hypnoticLead","stepCount":64}"#;
        let params: GenerationParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.mood, Mood::Default);
        assert_eq!(params.octave_range, OctaveRange::default());
        assert_eq!(params.seed, None);
        assert_eq!(params.validate(&EngineConfig::default()).unwrap(), 6);
    }

    #[test]
    fn test_variation_validation() {
        assert!(VariationOptions::default().validate().is_ok());

        fn with(edit: impl FnOnce(&mut VariationOptions)) -> VariationOptions {
            let mut options = VariationOptions::default();
            edit(&mut options);
            options
        }
        let bad = [
            with(|o| o.transpositions.clear()),
            with(|o| o.swing_amount = 1.5),
            with(|o| o.humanize_amount_ms = -1.0),
            with(|o| o.humanize_amount_ms = f64::NAN),
            with(|o| o.transpositions = vec![0, 200]),
            with(|o| o.root = "Q".to_string()),
        ];
        for options in &bad {
            assert!(
                matches!(options.validate(), Err(PatternError::Validation { .. })),
                "{options:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_inspiration_validation() {
        let config = EngineConfig::default();
        assert!(InspirationOptions::default().validate(&config).is_ok());

        fn with(edit: impl FnOnce(&mut InspirationOptions)) -> InspirationOptions {
            let mut options = InspirationOptions::default();
            edit(&mut options);
            options
        }
        let bad = [
            with(|o| o.length_in_bars = 0),
            with(|o| o.length_in_bars = config.max_bars + 1),
            with(|o| o.density = -0.1),
            with(|o| o.density = 1.1),
        ];
        for options in &bad {
            assert!(options.validate(&config).is_err(), "{options:?} should be rejected");
        }
    }
}
