//! Transcription result types

use serde::{Deserialize, Serialize};

/// A single transcribed note
///
/// Invariants upheld by the segmenter:
/// - `end_time > start_time`
/// - `end_time - start_time > min_note_duration`
/// - events within a melody are sorted by `start_time` and never overlap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number (integer semitone, 60 = C4)
    pub pitch: u8,

    /// Note onset in seconds from the start of the recording
    pub start_time: f32,

    /// Note offset in seconds from the start of the recording
    pub end_time: f32,
}

impl NoteEvent {
    /// Note duration in seconds
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }
}

/// A transcribed melody: the note events plus diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    /// Note events in start-time order
    pub notes: Vec<NoteEvent>,

    /// Sorted distinct pitches appearing in `notes`
    pub pitches_used: Vec<u8>,

    /// Transcription metadata
    pub metadata: TranscriptionMetadata,
}

/// Transcription outcome
///
/// `NoVoicedSignal` is a distinguished result, not an error: the recording
/// decoded and analyzed fine, but no frame passed the voicing gate. Callers
/// must not conflate it with a melody that happens to contain zero notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transcription {
    /// A valid analysis, possibly with zero notes
    Melody(Melody),

    /// No frame passed the voicing gate; nothing to transcribe
    NoVoicedSignal,
}

impl Transcription {
    /// The melody, if one was produced
    pub fn melody(&self) -> Option<&Melody> {
        match self {
            Transcription::Melody(m) => Some(m),
            Transcription::NoVoicedSignal => None,
        }
    }

    /// True when no frame passed the voicing gate
    pub fn is_no_voiced_signal(&self) -> bool {
        matches!(self, Transcription::NoVoicedSignal)
    }
}

/// Transcription metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionMetadata {
    /// Total input duration in seconds (num_frames * hop / sample_rate)
    pub duration_seconds: f32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of analysis frames
    pub num_frames: usize,

    /// Number of frames that passed the voicing gate
    pub voiced_frames: usize,

    /// Size of the learned pitch alphabet (distinct rounded cluster centers)
    pub alphabet_size: usize,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,

    /// Algorithm version
    pub algorithm_version: String,
}

impl Default for TranscriptionMetadata {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: 0,
            num_frames: 0,
            voiced_frames: 0,
            alphabet_size: 0,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
