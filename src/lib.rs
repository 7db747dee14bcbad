//! # hum2note
//!
//! Monophonic hum-to-melody transcription: turns a hummed recording into a
//! sequence of discrete note events suitable for MIDI export or melody
//! matching.
//!
//! ## Pipeline
//!
//! ```text
//! Audio Input → Pitch Tracking → Voicing Gate → Pitch Quantizer
//!             → Contour Smoother → Note Segmenter → Melody
//! ```
//!
//! The pitch quantizer learns a small discrete pitch alphabet from the
//! specific input's pitch distribution (seeded k-means over the voiced
//! semitone values), so drifting or imprecise humming still lands on a
//! consistent set of integer semitones without assuming a fixed scale.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hum2note::{transcribe_audio, Transcription, TranscriptionConfig};
//!
//! // Mono samples, normalized to [-1.0, 1.0]
//! let samples: Vec<f32> = vec![];
//! let sample_rate = 22050;
//!
//! match transcribe_audio(&samples, sample_rate, &TranscriptionConfig::default())? {
//!     Transcription::Melody(melody) => {
//!         for note in &melody.notes {
//!             println!("{} from {:.2}s to {:.2}s", note.pitch, note.start_time, note.end_time);
//!         }
//!     }
//!     Transcription::NoVoicedSignal => println!("No voiced signal detected"),
//! }
//! # Ok::<(), hum2note::TranscriptionError>(())
//! ```
//!
//! Each conversion is a pure, one-shot batch computation; nothing is shared
//! between calls. To process many files concurrently, run one whole
//! conversion per worker (see the `hum2note` binary's batch mode).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod pitch;

// Re-export main types
pub use analysis::result::{Melody, NoteEvent, Transcription, TranscriptionMetadata};
pub use config::TranscriptionConfig;
pub use error::TranscriptionError;
pub use pitch::{FramePitchSource, PitchFrame, YinTracker};

use std::time::Instant;

/// Transcribe a pre-tracked frame sequence into a melody
///
/// This is the core pitch-to-note pipeline: voicing gate, pitch
/// quantization, contour smoothing, and note segmentation. Use it directly
/// when frames come from an external pitch tracker; use [`transcribe_audio`]
/// to run the built-in tracker first.
///
/// # Arguments
///
/// * `frames` - Per-frame (f0, voicing confidence) pairs, one per hop
/// * `sample_rate` - Sample rate of the analyzed waveform in Hz
/// * `config` - Pipeline parameters
///
/// # Returns
///
/// [`Transcription::Melody`] for a valid analysis (possibly with zero
/// notes), or [`Transcription::NoVoicedSignal`] when no frame passes the
/// voicing gate — a recoverable outcome the caller should distinguish from
/// an empty melody.
///
/// # Errors
///
/// Returns `TranscriptionError` for invalid parameters (empty frame
/// sequence, zero sample rate, even smoothing window, bad cluster bounds).
pub fn transcribe_frames(
    frames: &[PitchFrame],
    sample_rate: u32,
    config: &TranscriptionConfig,
) -> Result<Transcription, TranscriptionError> {
    let start_time = Instant::now();

    if frames.is_empty() {
        return Err(TranscriptionError::InvalidInput(
            "Empty frame sequence".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(TranscriptionError::InvalidInput(
            "Invalid sample rate".to_string(),
        ));
    }

    log::debug!(
        "Transcribing {} frames at {} Hz (hop {})",
        frames.len(),
        sample_rate,
        config.hop_size
    );

    // Stage 1: voicing gate
    let gated = pipeline::voicing::gate_frames(frames, config.voicing_threshold);
    let voiced_frames = gated.iter().filter(|&&s| s > 0.0).count();

    if voiced_frames == 0 {
        log::warn!("No frame passed the voicing gate; nothing to transcribe");
        return Ok(Transcription::NoVoicedSignal);
    }

    // Stage 2: pitch quantization
    let quantized = pipeline::quantize::quantize_contour(
        &gated,
        config.min_clusters,
        config.max_clusters,
        config.kmeans_restarts,
        config.kmeans_seed,
    )?;

    // Stage 3: contour smoothing
    let smoothed = pipeline::smoothing::median_smooth(&quantized.contour, config.smoothing_window)?;

    // Stage 4: note segmentation
    let notes = pipeline::segment::segment_notes(
        &smoothed,
        sample_rate,
        config.hop_size,
        config.min_note_duration,
    )?;

    let mut pitches_used: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
    pitches_used.sort_unstable();
    pitches_used.dedup();

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Transcribed {} notes over pitches {:?} in {:.2} ms",
        notes.len(),
        pitches_used,
        processing_time_ms
    );

    Ok(Transcription::Melody(Melody {
        notes,
        pitches_used,
        metadata: TranscriptionMetadata {
            duration_seconds: frames.len() as f32 * config.hop_size as f32 / sample_rate as f32,
            sample_rate,
            num_frames: frames.len(),
            voiced_frames,
            alphabet_size: quantized.alphabet.len(),
            processing_time_ms,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }))
}

/// Transcribe raw audio samples into a melody
///
/// Runs the built-in [`YinTracker`] configured from `config`, then the
/// pitch-to-note pipeline via [`transcribe_frames`].
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (typically 22050 or 44100)
/// * `config` - Pipeline parameters
///
/// # Errors
///
/// Returns `TranscriptionError` if the input is empty, shorter than one
/// analysis frame, or parameters are invalid.
pub fn transcribe_audio(
    samples: &[f32],
    sample_rate: u32,
    config: &TranscriptionConfig,
) -> Result<Transcription, TranscriptionError> {
    if samples.is_empty() {
        return Err(TranscriptionError::InvalidInput(
            "Empty audio samples".to_string(),
        ));
    }
    if sample_rate == 0 {
        return Err(TranscriptionError::InvalidInput(
            "Invalid sample rate".to_string(),
        ));
    }

    log::debug!(
        "Transcribing audio: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    let tracker = YinTracker::new(
        config.frame_size,
        config.hop_size,
        config.fmin_hz,
        config.fmax_hz,
    );
    let frames = tracker.track(samples, sample_rate)?;

    transcribe_frames(&frames, sample_rate, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frames_rejected() {
        let result = transcribe_frames(&[], 22050, &TranscriptionConfig::default());
        assert!(matches!(result, Err(TranscriptionError::InvalidInput(_))));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let frames = vec![PitchFrame { f0_hz: 440.0, voicing: 1.0 }; 10];
        let result = transcribe_frames(&frames, 0, &TranscriptionConfig::default());
        assert!(matches!(result, Err(TranscriptionError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_samples_rejected() {
        let result = transcribe_audio(&[], 22050, &TranscriptionConfig::default());
        assert!(matches!(result, Err(TranscriptionError::InvalidInput(_))));
    }

    #[test]
    fn test_all_unvoiced_is_no_voiced_signal() {
        let frames = vec![PitchFrame { f0_hz: 440.0, voicing: 0.05 }; 50];
        let result = transcribe_frames(&frames, 22050, &TranscriptionConfig::default()).unwrap();
        assert!(result.is_no_voiced_signal());
    }
}
