// The note-sequence codec: Standard MIDI File bytes, the flat NoteSequence,
// the step-based Pattern and the editor grid.
//
// Encoding writes SMF format 0: one track on channel 0 holding a tempo meta
// event, every note as a Note-On / Note-Off pair, and an end-of-track marker
// at `max(length_ticks, last event)`. Accent and slide ride on two controller
// numbers from `EngineConfig`: an accented note is bracketed by CC=127 just
// before its Note-On and CC=0 just after, at the same tick. Events sharing a
// tick are ordered: tempo, every Note-Off, then each note's
// CC-on / Note-On / CC-off group in (pitch, note) order. `TrackWriter`
// collects events at absolute ticks and turns them into delta times; midly
// does the variable-length-quantity encoding on write.
//
// Decoding accepts format 0 or 1 (tracks are merged in time order) with
// metrical timing only. A Note-On with velocity 0 is a Note-Off; Note-Offs
// pair with open notes of the same key oldest first. Notes that never close,
// or close at their own onset, get a one-step default duration and a warning.
// A stream without a tempo event plays at 120 BPM.
//
// Encoding a decoded stream reproduces it byte for byte, as long as the
// stream was written by this encoder.
//
// Grid and pattern conversions live here too, so no other module decides how
// steps map to ticks.

use crate::config::EngineConfig;
use crate::error::{PatternError, PatternResult};
use crate::grid::{GridCell, PatternGrid};
use crate::note::{MAX_PITCH, NoteSequence, Pattern, SequenceNote, clamp_velocity};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use tracing::{debug, warn};

/// Tempo assumed when a stream carries none (120 BPM).
pub const DEFAULT_TEMPO_MICROS: u32 = 500_000;

/// Largest delta time a track event can carry.
const MAX_TICK: u32 = 0x0FFF_FFFF;

/// Largest tempo meta value.
const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Controller value sent before a flagged Note-On.
const CC_ON: u8 = 127;

/// Controller values at or above this count as "on" when decoding.
const CC_THRESHOLD: u8 = 64;

/// Position of an event within the track: (tick, rank, pitch, note, sub-order).
type EventKey = (u32, u8, u8, usize, u8);

const RANK_TEMPO: u8 = 0;
const RANK_NOTE_OFF: u8 = 1;
const RANK_NOTE_ON: u8 = 2;

/// Collects events at absolute ticks and emits a delta-timed track.
struct TrackWriter {
    events: Vec<(EventKey, TrackEventKind<'static>)>,
}

impl TrackWriter {
    fn new() -> Self {
        TrackWriter { events: Vec::new() }
    }

    fn append_event(&mut self, key: EventKey, kind: TrackEventKind<'static>) {
        self.events.push((key, kind));
    }

    fn append_midi(&mut self, key: EventKey, message: MidiMessage) {
        self.append_event(
            key,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        );
    }

    /// Sort, convert to deltas and close the track at `end_tick` or at the
    /// last event, whichever is later.
    fn finish(mut self, end_tick: u32) -> PatternResult<Track<'static>> {
        self.events.sort_by_key(|(key, _)| *key);
        let mut track: Track<'static> = Vec::with_capacity(self.events.len() + 1);
        let mut last = 0u32;
        for ((tick, ..), kind) in self.events {
            track.push(TrackEvent {
                delta: delta(tick - last)?,
                kind,
            });
            last = tick;
        }
        track.push(TrackEvent {
            delta: delta(end_tick.saturating_sub(last))?,
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        Ok(track)
    }
}

fn delta(ticks: u32) -> PatternResult<u28> {
    if ticks > MAX_TICK {
        return Err(PatternError::Encoding(format!(
            "delta of {} ticks does not fit a track event",
            ticks
        )));
    }
    Ok(u28::new(ticks))
}

fn controller(number: u8, value: u8) -> MidiMessage {
    MidiMessage::Controller {
        controller: u7::new(number),
        value: u7::new(value),
    }
}

/// Build the in-memory SMF for a sequence.
fn sequence_to_smf(sequence: &NoteSequence, config: &EngineConfig) -> PatternResult<Smf<'static>> {
    if sequence.ticks_per_quarter == 0 || sequence.ticks_per_quarter > 0x7fff {
        return Err(PatternError::Encoding(format!(
            "{} ticks per quarter is outside 1..=32767",
            sequence.ticks_per_quarter
        )));
    }
    if sequence.tempo_micros == 0 || sequence.tempo_micros > MAX_TEMPO_MICROS {
        return Err(PatternError::Encoding(format!(
            "tempo of {} microseconds per quarter cannot be encoded",
            sequence.tempo_micros
        )));
    }

    let mut writer = TrackWriter::new();
    writer.append_event(
        (0, RANK_TEMPO, 0, 0, 0),
        TrackEventKind::Meta(MetaMessage::Tempo(u24::new(sequence.tempo_micros))),
    );

    let mut end = sequence.length_ticks;
    for (index, note) in sequence.notes.iter().enumerate() {
        if note.pitch > MAX_PITCH {
            return Err(PatternError::Encoding(format!("pitch {} is not a MIDI note", note.pitch)));
        }
        let start = note.start_tick;
        let stop = start
            .checked_add(note.duration_ticks.max(1))
            .filter(|&t| t <= MAX_TICK)
            .ok_or_else(|| {
                PatternError::Encoding(format!("note at tick {} ends out of range", start))
            })?;
        end = end.max(stop);

        let key = u7::new(note.pitch);
        let vel = u7::new(clamp_velocity(i32::from(note.velocity)));
        let flags: Vec<u8> = [(note.accent, config.accent_cc), (note.slide, config.slide_cc)]
            .into_iter()
            .filter_map(|(on, cc)| on.then_some(cc))
            .collect();

        for &cc in &flags {
            writer.append_midi((start, RANK_NOTE_ON, note.pitch, index, 0), controller(cc, CC_ON));
        }
        writer.append_midi(
            (start, RANK_NOTE_ON, note.pitch, index, 1),
            MidiMessage::NoteOn { key, vel },
        );
        for &cc in &flags {
            writer.append_midi((start, RANK_NOTE_ON, note.pitch, index, 2), controller(cc, 0));
        }
        writer.append_midi(
            (stop, RANK_NOTE_OFF, note.pitch, index, 0),
            MidiMessage::NoteOff { key, vel: u7::new(0) },
        );
    }

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(sequence.ticks_per_quarter)),
    ));
    smf.tracks.push(writer.finish(end)?);
    Ok(smf)
}

/// Encode a sequence as SMF bytes.
pub fn encode_sequence(sequence: &NoteSequence, config: &EngineConfig) -> PatternResult<Vec<u8>> {
    let smf = sequence_to_smf(sequence, config)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    debug!(notes = sequence.notes.len(), bytes = buf.len(), "encoded sequence");
    Ok(buf)
}

/// Decode SMF bytes into a sequence with notes in canonical order.
pub fn decode_sequence(bytes: &[u8], config: &EngineConfig) -> PatternResult<NoteSequence> {
    let smf = Smf::parse(bytes)?;
    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        Timing::Timecode(..) => {
            return Err(PatternError::Encoding(
                "timecode-based timing is not supported".to_string(),
            ));
        }
    };
    if ticks_per_quarter == 0 {
        return Err(PatternError::Encoding("zero ticks per quarter".to_string()));
    }
    let default_duration =
        (u32::from(ticks_per_quarter) * 4 / u32::from(config.steps_per_bar.max(1))).max(1);

    // Merge every track onto one absolute timeline; the sort is stable, so
    // events at one tick keep their track order.
    let mut timeline: Vec<(u64, &TrackEventKind<'_>)> = Vec::new();
    let mut length: u64 = 0;
    for track in &smf.tracks {
        let mut tick: u64 = 0;
        for event in track {
            tick += u64::from(event.delta.as_int());
            if !matches!(event.kind, TrackEventKind::Meta(MetaMessage::EndOfTrack)) {
                timeline.push((tick, &event.kind));
            }
        }
        length = length.max(tick);
    }
    timeline.sort_by_key(|(tick, _)| *tick);

    let mut tempo_micros = None;
    let mut accent = [false; 16];
    let mut slide = [false; 16];
    let mut open: BTreeMap<(u8, u8), VecDeque<usize>> = BTreeMap::new();
    let mut notes: Vec<SequenceNote> = Vec::new();

    for (tick, kind) in timeline {
        let tick = tick_u32(tick)?;
        match *kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => {
                tempo_micros.get_or_insert(t.as_int());
            }
            TrackEventKind::Midi { channel, message } => {
                let ch = channel.as_int();
                match message {
                    MidiMessage::Controller { controller, value } => {
                        let on = value.as_int() >= CC_THRESHOLD;
                        if controller.as_int() == config.accent_cc {
                            accent[usize::from(ch)] = on;
                        } else if controller.as_int() == config.slide_cc {
                            slide[usize::from(ch)] = on;
                        }
                    }
                    MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                        open.entry((ch, key.as_int())).or_default().push_back(notes.len());
                        notes.push(SequenceNote {
                            start_tick: tick,
                            duration_ticks: 0,
                            pitch: key.as_int(),
                            velocity: vel.as_int(),
                            accent: accent[usize::from(ch)],
                            slide: slide[usize::from(ch)],
                        });
                    }
                    MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                        let pending = open.get_mut(&(ch, key.as_int()));
                        if let Some(index) = pending.and_then(VecDeque::pop_front) {
                            let note = &mut notes[index];
                            note.duration_ticks = tick - note.start_tick;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    let unclosed = notes.iter().filter(|n| n.duration_ticks == 0).count();
    if unclosed > 0 {
        warn!(
            count = unclosed,
            default_ticks = default_duration,
            "notes without a usable Note-Off, using a one-step duration"
        );
        for note in notes.iter_mut().filter(|n| n.duration_ticks == 0) {
            note.duration_ticks = default_duration;
        }
    }
    let tempo_micros = tempo_micros.unwrap_or_else(|| {
        warn!("stream has no tempo event, assuming 120 BPM");
        DEFAULT_TEMPO_MICROS
    });

    let mut sequence = NoteSequence {
        ticks_per_quarter,
        tempo_micros,
        length_ticks: tick_u32(length)?,
        notes,
    };
    sequence.sort();
    debug!(
        notes = sequence.notes.len(),
        tracks = smf.tracks.len(),
        length = sequence.length_ticks,
        "decoded sequence"
    );
    Ok(sequence)
}

fn tick_u32(tick: u64) -> PatternResult<u32> {
    u32::try_from(tick)
        .map_err(|_| PatternError::Encoding(format!("tick {} is out of range", tick)))
}

/// Encode and write a sequence to a file.
pub fn write_sequence(
    path: &Path,
    sequence: &NoteSequence,
    config: &EngineConfig,
) -> PatternResult<()> {
    let bytes = encode_sequence(sequence, config)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read and decode a file.
pub fn read_sequence(path: &Path, config: &EngineConfig) -> PatternResult<NoteSequence> {
    let bytes = std::fs::read(path)?;
    decode_sequence(&bytes, config)
}

fn step_tick(step: usize, ticks_per_step: u32) -> PatternResult<u32> {
    u32::try_from(step)
        .ok()
        .and_then(|s| s.checked_mul(ticks_per_step))
        .ok_or_else(|| PatternError::Encoding(format!("step {} is out of range", step)))
}

/// Ticks per grid step at a sequence's own resolution.
fn sequence_ticks_per_step(ticks_per_quarter: u16, config: &EngineConfig) -> u32 {
    (u32::from(ticks_per_quarter) * 4 / u32::from(config.steps_per_bar.max(1))).max(1)
}

/// Place a generated pattern on the tick timeline. Note lengths keep their
/// step durations.
pub fn pattern_to_sequence(
    pattern: &Pattern,
    config: &EngineConfig,
) -> PatternResult<NoteSequence> {
    let tps = config.ticks_per_step();
    let notes = pattern
        .notes
        .iter()
        .map(|n| {
            Ok(SequenceNote {
                start_tick: step_tick(n.step, tps)?,
                duration_ticks: step_tick(n.duration.max(1), tps)?,
                pitch: n.pitch,
                velocity: n.velocity,
                accent: n.accent,
                slide: n.slide,
            })
        })
        .collect::<PatternResult<Vec<_>>>()?;
    let mut sequence = NoteSequence {
        ticks_per_quarter: config.ticks_per_quarter,
        tempo_micros: config.tempo_micros(),
        length_ticks: step_tick(pattern.step_count, tps)?,
        notes,
    };
    sequence.sort();
    Ok(sequence)
}

/// Lay a pattern out on the editor grid. Durations are not kept; the grid
/// only records onsets.
pub fn pattern_to_grid(pattern: &Pattern) -> PatternGrid {
    let mut grid = PatternGrid::new(pattern.step_count);
    for note in &pattern.notes {
        grid.set(
            note.pitch,
            note.step,
            GridCell {
                velocity: note.velocity,
                accent: note.accent,
                slide: note.slide,
            },
        );
    }
    grid
}

/// Convert editor cells to a sequence; every cell lasts `config.note_length`.
pub fn grid_to_sequence(grid: &PatternGrid, config: &EngineConfig) -> PatternResult<NoteSequence> {
    let tps = config.ticks_per_step();
    let duration = config.note_length.ticks(config.ticks_per_quarter);
    let mut notes = Vec::new();
    for (pitch, cells) in grid.pitched_rows()? {
        for (step, cell) in cells.iter().enumerate() {
            let Some(cell) = cell else {
                continue;
            };
            notes.push(SequenceNote {
                start_tick: step_tick(step, tps)?,
                duration_ticks: duration,
                pitch,
                velocity: if cell.velocity == 0 {
                    config.default_velocity
                } else {
                    cell.velocity.min(127)
                },
                accent: cell.accent,
                slide: cell.slide,
            });
        }
    }
    let mut sequence = NoteSequence {
        ticks_per_quarter: config.ticks_per_quarter,
        tempo_micros: config.tempo_micros(),
        length_ticks: step_tick(grid.step_count, tps)?,
        notes,
    };
    sequence.sort();
    Ok(sequence)
}

/// Snap a sequence onto the editor grid. Onsets round to the nearest step;
/// the grid grows to hold the last onset and the sequence length.
pub fn sequence_to_grid(sequence: &NoteSequence, config: &EngineConfig) -> PatternGrid {
    let tps = sequence_ticks_per_step(sequence.ticks_per_quarter, config);
    let to_step = |tick: u32| ((u64::from(tick) + u64::from(tps) / 2) / u64::from(tps)) as usize;
    let last_onset = sequence.notes.iter().map(|n| to_step(n.start_tick) + 1).max().unwrap_or(0);
    let span = sequence.length_ticks.div_ceil(tps) as usize;
    let mut grid = PatternGrid::new(span.max(last_onset));
    for note in &sequence.notes {
        grid.set(
            note.pitch,
            to_step(note.start_tick),
            GridCell {
                velocity: note.velocity,
                accent: note.accent,
                slide: note.slide,
            },
        );
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteEvent;
    use pretty_assertions::assert_eq;

    fn note(start: u32, duration: u32, pitch: u8) -> SequenceNote {
        SequenceNote {
            start_tick: start,
            duration_ticks: duration,
            pitch,
            velocity: 100,
            accent: false,
            slide: false,
        }
    }

    fn sequence(notes: Vec<SequenceNote>, length: u32) -> NoteSequence {
        let mut seq = NoteSequence {
            ticks_per_quarter: 480,
            tempo_micros: 413_793,
            length_ticks: length,
            notes,
        };
        seq.sort();
        seq
    }

    /// Minimal SMF writer for hand-built test streams.
    fn smf_bytes(format: Format, tracks: Vec<Track<'static>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(format, Timing::Metrical(u15::new(96))));
        smf.tracks = tracks;
        let mut buf = Vec::new();
        smf.write_std(&mut buf).unwrap();
        buf
    }

    fn ev(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind,
        }
    }

    fn on(key: u8, vel: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        }
    }

    fn off(key: u8) -> TrackEventKind<'static> {
        TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        }
    }

    fn eot() -> TrackEventKind<'static> {
        TrackEventKind::Meta(MetaMessage::EndOfTrack)
    }

    #[test]
    fn test_decode_reencode_is_byte_identical() {
        let config = EngineConfig::default();
        let mut accented = note(0, 120, 48);
        accented.accent = true;
        let mut sliding = note(240, 240, 55);
        sliding.slide = true;
        sliding.accent = true;
        let seq = sequence(
            vec![
                accented,
                note(0, 480, 60),
                note(120, 120, 48),
                sliding,
                note(300, 600, 60),
            ],
            1920,
        );
        let bytes = encode_sequence(&seq, &config).unwrap();
        let decoded = decode_sequence(&bytes, &config).unwrap();
        assert_eq!(decoded, seq);
        assert_eq!(encode_sequence(&decoded, &config).unwrap(), bytes);
    }

    #[test]
    fn test_delta_times_use_variable_length_quantities() {
        let config = EngineConfig::default();
        let seq = sequence(vec![note(480, 120, 60)], 960);
        let bytes = encode_sequence(&seq, &config).unwrap();
        // 480 = 0b11_1100000 -> 0x83 0x60.
        assert!(bytes.windows(2).any(|w| w == [0x83, 0x60]));
        assert_eq!(&bytes[..4], b"MThd");
    }

    #[test]
    fn test_accent_brackets_note_on() {
        let config = EngineConfig::default();
        let mut n = note(0, 120, 60);
        n.accent = true;
        let smf = sequence_to_smf(&sequence(vec![n], 120), &config).unwrap();
        let messages: Vec<String> = smf.tracks[0].iter().map(|e| format!("{:?}", e.kind)).collect();
        assert_eq!(messages.len(), 6);
        assert!(messages[0].contains("Tempo"));
        assert!(messages[1].contains("Controller") && messages[1].contains("127"));
        assert!(messages[2].contains("NoteOn"));
        assert!(messages[3].contains("Controller"));
        assert!(messages[4].contains("NoteOff"));
        assert!(messages[5].contains("EndOfTrack"));
    }

    #[test]
    fn test_note_offs_precede_note_ons_at_same_tick() {
        let config = EngineConfig::default();
        let seq = sequence(vec![note(0, 120, 60), note(120, 120, 60)], 240);
        let decoded = decode_sequence(&encode_sequence(&seq, &config).unwrap(), &config).unwrap();
        assert_eq!(decoded.notes, seq.notes);
    }

    #[test]
    fn test_dangling_and_zero_length_notes_get_one_step() {
        let config = EngineConfig::default();
        let bytes = smf_bytes(
            Format::SingleTrack,
            vec![vec![
                ev(0, on(60, 90)),
                ev(0, off(60)),
                ev(0, on(60, 90)),
                ev(48, on(64, 0)),
                ev(0, on(67, 80)),
                ev(48, eot()),
            ]],
        );
        let seq = decode_sequence(&bytes, &config).unwrap();
        assert_eq!(seq.tempo_micros, DEFAULT_TEMPO_MICROS);
        assert_eq!(seq.length_ticks, 96);
        // 96 ppq, 16 steps per bar -> 24 ticks per step.
        let got: Vec<(u32, u32, u8)> = seq
            .notes
            .iter()
            .map(|n| (n.start_tick, n.duration_ticks, n.pitch))
            .collect();
        assert_eq!(got, vec![(0, 24, 60), (0, 24, 60), (48, 24, 67)]);
    }

    #[test]
    fn test_format1_tracks_are_merged() {
        let config = EngineConfig::default();
        let bytes = smf_bytes(
            Format::Parallel,
            vec![
                vec![
                    ev(0, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(600_000)))),
                    ev(0, eot()),
                ],
                vec![ev(0, on(60, 100)), ev(24, off(60)), ev(0, eot())],
                vec![ev(12, on(64, 100)), ev(24, off(64)), ev(60, eot())],
            ],
        );
        let seq = decode_sequence(&bytes, &config).unwrap();
        assert_eq!(seq.tempo_micros, 600_000);
        assert_eq!(seq.length_ticks, 96);
        let got: Vec<(u32, u32, u8)> = seq
            .notes
            .iter()
            .map(|n| (n.start_tick, n.duration_ticks, n.pitch))
            .collect();
        assert_eq!(got, vec![(0, 24, 60), (12, 24, 64)]);
    }

    #[test]
    fn test_overlapping_same_key_pairs_oldest_first() {
        let config = EngineConfig::default();
        let bytes = smf_bytes(
            Format::SingleTrack,
            vec![vec![
                ev(0, on(60, 100)),
                ev(10, on(60, 90)),
                ev(10, off(60)),
                ev(10, off(60)),
                ev(0, eot()),
            ]],
        );
        let seq = decode_sequence(&bytes, &config).unwrap();
        let got: Vec<(u32, u32, u8)> = seq
            .notes
            .iter()
            .map(|n| (n.start_tick, n.duration_ticks, n.velocity))
            .collect();
        assert_eq!(got, vec![(0, 20, 100), (10, 20, 90)]);
    }

    #[test]
    fn test_malformed_and_timecode_streams_are_errors() {
        let config = EngineConfig::default();
        assert!(matches!(
            decode_sequence(b"MThd\x00\x00", &config),
            Err(PatternError::Encoding(_))
        ));

        let mut smf = Smf::new(Header::new(
            Format::SingleTrack,
            Timing::Timecode(midly::Fps::Fps25, 40),
        ));
        smf.tracks.push(vec![ev(0, eot())]);
        let mut buf = Vec::new();
        smf.write_std(&mut buf).unwrap();
        assert!(matches!(decode_sequence(&buf, &config), Err(PatternError::Encoding(_))));
    }

    #[test]
    fn test_encoder_rejects_unencodable_values() {
        let config = EngineConfig::default();
        let mut seq = sequence(vec![note(0, 10, 200)], 10);
        assert!(encode_sequence(&seq, &config).is_err());
        seq.notes[0].pitch = 60;
        seq.tempo_micros = 0;
        assert!(encode_sequence(&seq, &config).is_err());
    }

    #[test]
    fn test_pattern_grid_sequence_conversions() {
        let config = EngineConfig::default();
        let pattern = Pattern::new(
            16,
            vec![
                NoteEvent::new(0, 48, 100).with_accent(true),
                NoteEvent::new(4, 55, 90).with_duration(2),
                NoteEvent::new(8, 48, 80).with_slide(true),
            ],
        );

        let seq = pattern_to_sequence(&pattern, &config).unwrap();
        assert_eq!(seq.length_ticks, 1920);
        assert_eq!((seq.notes[1].start_tick, seq.notes[1].duration_ticks), (480, 240));

        let grid = pattern_to_grid(&pattern);
        assert_eq!(grid.stats().onsets, 3);
        assert!(grid.cell(48, 0).is_some_and(|c| c.accent));

        let from_grid = grid_to_sequence(&grid, &config).unwrap();
        assert!(from_grid.notes.iter().all(|n| n.duration_ticks == 120));
        assert_eq!(sequence_to_grid(&from_grid, &config), grid);
    }

    #[test]
    fn test_sequence_to_grid_rounds_onsets() {
        let config = EngineConfig::default();
        let seq = sequence(vec![note(50, 100, 60), note(70, 100, 62)], 300);
        let grid = sequence_to_grid(&seq, &config);
        assert_eq!(grid.step_count, 3);
        assert!(grid.cell(60, 0).is_some());
        assert!(grid.cell(62, 1).is_some());
    }
}
