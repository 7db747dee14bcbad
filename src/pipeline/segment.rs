//! Note segmenter: run-length encoding into note events
//!
//! Converts the smoothed per-frame pitch sequence into discrete note events
//! with a single pass. A note closes whenever the frame value changes
//! (pitch change or silence) and is emitted only if it exceeds the minimum
//! duration; a short run still terminates its neighbor's boundary correctly,
//! it is simply not itself emitted. The trailing open note closes at the
//! total-duration timestamp under the same emission rule.
//!
//! Output is sorted by start time and non-overlapping by construction.

use crate::analysis::result::NoteEvent;
use crate::error::TranscriptionError;
use crate::pipeline::SILENCE;

/// Segment a quantized pitch contour into note events
///
/// # Arguments
///
/// * `contour` - Smoothed per-frame integer pitches, `SILENCE` (0) for
///   unvoiced frames; voiced values must be in 1..=127
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size in samples; frame `i` starts at `i * hop / rate`
/// * `min_note_duration` - Minimum emitted note duration in seconds
///
/// # Errors
///
/// Returns `InvalidInput` for a zero sample rate or hop size, or a contour
/// value outside 0..=127.
pub fn segment_notes(
    contour: &[i32],
    sample_rate: u32,
    hop_size: usize,
    min_note_duration: f32,
) -> Result<Vec<NoteEvent>, TranscriptionError> {
    if sample_rate == 0 {
        return Err(TranscriptionError::InvalidInput(
            "Sample rate must be > 0".to_string(),
        ));
    }
    if hop_size == 0 {
        return Err(TranscriptionError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    let frame_time = hop_size as f32 / sample_rate as f32;
    let mut notes = Vec::new();

    let mut current_pitch: Option<u8> = None;
    let mut start_time = 0.0f32;

    let close = |pitch: u8, start: f32, end: f32, notes: &mut Vec<NoteEvent>| {
        if end - start > min_note_duration {
            notes.push(NoteEvent {
                pitch,
                start_time: start,
                end_time: end,
            });
        }
    };

    for (i, &value) in contour.iter().enumerate() {
        if !(0..=127).contains(&value) {
            return Err(TranscriptionError::InvalidInput(format!(
                "Contour value {} at frame {} outside 0..=127",
                value, i
            )));
        }

        let t = i as f32 * frame_time;

        if value == SILENCE {
            if let Some(pitch) = current_pitch.take() {
                close(pitch, start_time, t, &mut notes);
            }
            continue;
        }

        let value = value as u8;
        if current_pitch != Some(value) {
            if let Some(pitch) = current_pitch {
                close(pitch, start_time, t, &mut notes);
            }
            current_pitch = Some(value);
            start_time = t;
        }
    }

    // Trailing open note closes at the total-duration timestamp.
    if let Some(pitch) = current_pitch {
        let end = contour.len() as f32 * frame_time;
        close(pitch, start_time, end, &mut notes);
    }

    log::debug!(
        "Segmented {} frames into {} notes (frame time {:.4} s)",
        contour.len(),
        notes.len(),
        frame_time
    );

    Ok(notes)
}
