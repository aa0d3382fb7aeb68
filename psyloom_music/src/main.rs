// Psyloom: command-line front end for the pattern engine.
//
// Subcommands:
//   generate  Build one part and print it as a grid; optionally write a .mid
//   vary      Read a .mid and write one transformed copy per transposition
//   inspire   Read a .mid seed phrase and write a longer Markov continuation
//   scales    List the registered scales
//
// `--config <file.json>` replaces the default EngineConfig on any subcommand.
// Logging goes through tracing; set RUST_LOG=debug for dispatch details.
//
// Usage:
//   cargo run -p psyloom_music -- generate --part bassline --style psy --seed 42
//   cargo run -p psyloom_music -- vary phrase.mid --transpose=0,12,-5 --swing 0.3

use clap::{ArgAction, Parser, Subcommand};
use psyloom_music::midi::{pattern_to_grid, pattern_to_sequence, read_sequence, write_sequence};
use psyloom_music::params::OctaveRange;
use psyloom_music::{
    EngineConfig, GenerationParameters, InspirationOptions, Mood, Part, PatternEngine, Style,
    VariationOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "psyloom")]
#[command(about = "Seeded psytrance pattern generation and variation", long_about = None)]
struct Cli {
    /// Engine config (JSON); missing keys take their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one structural part
    Generate {
        #[arg(long, default_value = "bassline")]
        part: Part,

        #[arg(long, default_value = "psy")]
        style: Style,

        #[arg(long, default_value = "default")]
        mood: Mood,

        /// Root note name (C, F#, Bb)
        #[arg(short, long, default_value = "C")]
        root: String,

        #[arg(short, long, default_value = "minor")]
        scale: String,

        #[arg(long, default_value = "16")]
        steps: usize,

        #[arg(long, default_value = "2")]
        octave_min: u8,

        #[arg(long, default_value = "4")]
        octave_max: u8,

        #[arg(long)]
        seed: Option<u32>,

        /// Write the pattern as a MIDI file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write transformed copies of a MIDI phrase
    Vary {
        input: PathBuf,

        /// Semitone offsets, one output file each
        #[arg(
            short,
            long,
            value_delimiter = ',',
            allow_negative_numbers = true,
            default_value = "0"
        )]
        transpose: Vec<i32>,

        #[arg(long, default_value = "0.0")]
        swing: f64,

        #[arg(long, default_value = "0.0")]
        humanize_ms: f64,

        #[arg(long)]
        retrograde: bool,

        #[arg(long)]
        invert: bool,

        #[arg(long)]
        keep_scale: bool,

        #[arg(short, long, default_value = "C")]
        root: String,

        #[arg(short, long, default_value = "minor")]
        scale: String,

        #[arg(long)]
        seed: Option<u32>,

        /// Directory for the output files (defaults to the input's)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Extend a MIDI seed phrase with a Markov model
    Inspire {
        input: PathBuf,

        #[arg(short, long, default_value = "4")]
        bars: u32,

        #[arg(short, long, default_value = "0.5")]
        density: f64,

        #[arg(short, long, default_value = "C")]
        root: String,

        #[arg(short, long, default_value = "minor")]
        scale: String,

        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        keep_scale: bool,

        #[arg(long)]
        seed: Option<u32>,

        #[arg(short, long, default_value = "inspired.mid")]
        out: PathBuf,
    },

    /// List registered scales
    Scales,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = PatternEngine::new(config)?;

    match cli.command {
        Commands::Generate {
            part,
            style,
            mood,
            root,
            scale,
            steps,
            octave_min,
            octave_max,
            seed,
            out,
        } => {
            let params = GenerationParameters {
                root,
                scale_name: scale,
                style,
                mood,
                part,
                step_count: steps,
                octave_range: OctaveRange::new(octave_min, octave_max),
                seed,
            };
            let generated = engine.generate(&params)?;
            let pattern = generated.value;

            println!("{} / {} / {} (seed {})", part, style, mood, generated.seed);
            if pattern.is_empty() {
                eprintln!("warning: the pattern has no notes; try a wider octave range");
            }
            print!("{}", pattern_to_grid(&pattern).summary());

            if let Some(path) = out {
                let sequence = pattern_to_sequence(&pattern, engine.config())?;
                write_sequence(&path, &sequence, engine.config())?;
                println!("Wrote {}", path.display());
            }
        }

        Commands::Vary {
            input,
            transpose,
            swing,
            humanize_ms,
            retrograde,
            invert,
            keep_scale,
            root,
            scale,
            seed,
            out_dir,
        } => {
            let options = VariationOptions {
                transpositions: transpose.clone(),
                swing_amount: swing,
                humanize_amount_ms: humanize_ms,
                retrograde,
                invert,
                seed,
                root,
                scale_name: scale,
                keep_scale,
            };
            let bytes = std::fs::read(&input)?;
            let varied = engine.vary(&bytes, &options)?;

            let dir = out_dir
                .unwrap_or_else(|| input.parent().map(Path::to_path_buf).unwrap_or_default());
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("phrase");
            for (n, (stream, semitones)) in varied.value.iter().zip(&transpose).enumerate() {
                let path = dir.join(format!("{}_{}.mid", stem, n));
                std::fs::write(&path, stream)?;
                println!("{:+} semitones -> {}", semitones, path.display());
            }
            println!("seed {}", varied.seed);
        }

        Commands::Inspire {
            input,
            bars,
            density,
            root,
            scale,
            keep_scale,
            seed,
            out,
        } => {
            let options = InspirationOptions {
                length_in_bars: bars,
                seed,
                root,
                scale_name: scale,
                keep_scale,
                density,
            };
            let bytes = std::fs::read(&input)?;
            let inspired = engine.inspire(&bytes, &options)?;
            std::fs::write(&out, &inspired.value)?;

            let phrase = read_sequence(&out, engine.config())?;
            println!("{} notes over {} bars (seed {})", phrase.notes.len(), bars, inspired.seed);
            println!("Wrote {}", out.display());
        }

        Commands::Scales => {
            for name in engine.registry().names() {
                let intervals = engine.registry().intervals(&name);
                let degrees: Vec<String> = intervals.iter().map(|i| i.to_string()).collect();
                println!("{:<20} {}", name, degrees.join(" "));
            }
        }
    }

    Ok(())
}
