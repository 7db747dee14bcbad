//! Voicing gate: confidence thresholding and Hz to semitone conversion
//!
//! Zeroes out frames whose voicing confidence is below the threshold, or
//! whose f0 is undefined or non-positive, and converts surviving frequencies
//! to the continuous semitone scale. The output array is what the rest of
//! the pipeline consumes.

use crate::pitch::PitchFrame;

/// Convert a frequency in Hz to a fractional MIDI semitone (A4 = 440 Hz = 69)
pub fn hz_to_semitone(hz: f32) -> f32 {
    69.0 + 12.0 * (hz / 440.0).log2()
}

/// Convert a fractional MIDI semitone to a frequency in Hz
pub fn semitone_to_hz(semitone: f32) -> f32 {
    440.0 * 2.0_f32.powf((semitone - 69.0) / 12.0)
}

/// Gate frames by voicing confidence
///
/// # Arguments
///
/// * `frames` - Per-frame (f0, confidence) pairs from the pitch tracker
/// * `threshold` - Voicing confidence threshold (typically 0.15)
///
/// # Returns
///
/// One value per input frame: the raw fractional semitone for frames that
/// pass the gate, `0.0` for frames that do not. An f0 of NaN is treated
/// identically to confidence below threshold.
pub fn gate_frames(frames: &[PitchFrame], threshold: f32) -> Vec<f32> {
    let gated: Vec<f32> = frames
        .iter()
        .map(|frame| {
            if frame.voicing < threshold || !frame.f0_hz.is_finite() || frame.f0_hz <= 0.0 {
                0.0
            } else {
                hz_to_semitone(frame.f0_hz)
            }
        })
        .collect();

    let voiced = gated.iter().filter(|&&s| s > 0.0).count();
    log::debug!(
        "Voicing gate: {} of {} frames voiced (threshold {:.2})",
        voiced,
        frames.len(),
        threshold
    );

    gated
}
