//! Pitch-to-note pipeline stages
//!
//! The core of the transcription engine, in dependency order:
//! - Voicing gate: confidence thresholding and Hz to semitone conversion
//! - Pitch quantizer: per-input k-means pitch alphabet learning
//! - Contour smoother: sliding median jitter removal
//! - Note segmenter: run-length encoding into note events
//!
//! Every stage is a total function of the previous stage's output; nothing
//! is shared between conversions.

pub mod quantize;
pub mod segment;
pub mod smoothing;
pub mod voicing;

/// Sentinel value meaning "silence / no pitch" in per-frame sequences.
///
/// Real semitone values for humming sit roughly in 36..=96; quantized cluster
/// centers are clamped to 1..=127, so the sentinel can never collide with a
/// musical pitch.
pub const SILENCE: i32 = 0;
