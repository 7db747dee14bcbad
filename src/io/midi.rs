//! Standard MIDI File export
//!
//! Serializes a transcribed melody as a single-track SMF: fixed tempo meta
//! event, NoteOn/NoteOff pairs with delta timing, constant velocity.

use std::path::Path;

use midly::num::{u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};

use crate::analysis::result::Melody;
use crate::error::TranscriptionError;

/// Ticks per quarter note in exported files
const PPQ: u16 = 480;

/// Fixed export tempo; note times are seconds, so any tempo works as long
/// as tick conversion matches it
const TEMPO_BPM: u32 = 120;

/// Serialize a melody to SMF bytes
///
/// # Arguments
///
/// * `melody` - The transcribed melody; note events must be sorted by start
/// * `velocity` - Constant velocity for every note (clamped to 127)
///
/// # Errors
///
/// Returns `ProcessingError` if SMF serialization fails.
pub fn melody_to_smf_bytes(melody: &Melody, velocity: u8) -> Result<Vec<u8>, TranscriptionError> {
    let micros_per_quarter = 60_000_000 / TEMPO_BPM;
    let ticks_per_sec = PPQ as f64 * 1_000_000.0 / micros_per_quarter as f64;

    // Flatten notes into timed on/off events. At equal timestamps the off
    // event must precede the on event, or back-to-back notes of the same
    // pitch would cancel each other.
    let mut events: Vec<(u32, bool, u8)> = Vec::with_capacity(melody.notes.len() * 2);
    for note in &melody.notes {
        let on_tick = (note.start_time.max(0.0) as f64 * ticks_per_sec) as u32;
        let off_tick = (note.end_time.max(0.0) as f64 * ticks_per_sec) as u32;
        events.push((on_tick, true, note.pitch));
        events.push((off_tick, false, note.pitch));
    }
    events.sort_by_key(|&(tick, is_on, _)| (tick, is_on));

    let mut track: Vec<TrackEvent> = Vec::with_capacity(events.len() + 2);
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(micros_per_quarter.into())),
    });

    let mut last_tick = 0u32;
    for (tick, is_on, pitch) in events {
        let delta = tick.saturating_sub(last_tick);
        last_tick = tick;
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(pitch.min(127)),
                vel: u7::new(velocity.min(127)),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(pitch.min(127)),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: delta.into(),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        });
    }

    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(PPQ.into()),
        },
        tracks: vec![track],
    };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| TranscriptionError::ProcessingError(format!("SMF write failed: {}", e)))?;
    Ok(bytes)
}

/// Write a melody to a `.mid` file
///
/// # Errors
///
/// Returns `ProcessingError` if serialization or the file write fails.
pub fn write_midi(melody: &Melody, velocity: u8, path: &Path) -> Result<(), TranscriptionError> {
    let bytes = melody_to_smf_bytes(melody, velocity)?;
    std::fs::write(path, bytes).map_err(|e| {
        TranscriptionError::ProcessingError(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        ))
    })?;
    log::debug!("Wrote {} notes to {}", melody.notes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::{NoteEvent, TranscriptionMetadata};

    fn melody(notes: Vec<NoteEvent>) -> Melody {
        let mut pitches_used: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        pitches_used.sort_unstable();
        pitches_used.dedup();
        Melody {
            notes,
            pitches_used,
            metadata: TranscriptionMetadata::default(),
        }
    }

    #[test]
    fn test_smf_roundtrip_note_count() {
        let m = melody(vec![
            NoteEvent { pitch: 60, start_time: 0.0, end_time: 0.5 },
            NoteEvent { pitch: 62, start_time: 0.5, end_time: 1.0 },
            NoteEvent { pitch: 64, start_time: 1.2, end_time: 2.0 },
        ]);

        let bytes = melody_to_smf_bytes(&m, 100).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);

        let note_ons = smf.tracks[0]
            .iter()
            .filter(|ev| {
                matches!(
                    ev.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { vel, .. },
                        ..
                    } if vel.as_int() > 0
                )
            })
            .count();
        assert_eq!(note_ons, 3);
    }

    #[test]
    fn test_back_to_back_same_pitch_off_before_on() {
        let m = melody(vec![
            NoteEvent { pitch: 60, start_time: 0.0, end_time: 1.0 },
            NoteEvent { pitch: 60, start_time: 1.0, end_time: 2.0 },
        ]);

        let bytes = melody_to_smf_bytes(&m, 100).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        // Collect the on/off order of the two events at the shared boundary
        let kinds: Vec<bool> = smf.tracks[0]
            .iter()
            .filter_map(|ev| match ev.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { .. },
                    ..
                } => Some(true),
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOff { .. },
                    ..
                } => Some(false),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![true, false, true, false]);
    }

    #[test]
    fn test_empty_melody_serializes() {
        let m = melody(vec![]);
        let bytes = melody_to_smf_bytes(&m, 100).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
    }
}
