//! Frame-level pitch sources
//!
//! The pipeline consumes per-frame (f0, voicing confidence) pairs and does
//! not care where they come from. `YinTracker` is the built-in source; any
//! monophonic f0 tracker with a confidence output can substitute by
//! implementing `FramePitchSource`.

pub mod yin;

use crate::error::TranscriptionError;

pub use yin::YinTracker;

/// One analysis frame of pitch tracker output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchFrame {
    /// Estimated fundamental frequency in Hz; NaN when the frame is unvoiced
    pub f0_hz: f32,

    /// Voicing confidence in [0, 1]
    pub voicing: f32,
}

/// A source of per-frame pitch estimates
pub trait FramePitchSource {
    /// Produce one `PitchFrame` per fixed hop over the waveform
    fn track(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<PitchFrame>, TranscriptionError>;
}
