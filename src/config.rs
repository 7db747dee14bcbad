//! Configuration parameters for melody transcription

/// Transcription configuration parameters
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    // Pitch tracking
    /// Frame size for f0 analysis (default: 2048)
    pub frame_size: usize,

    /// Hop size between analysis frames in samples (default: 512)
    pub hop_size: usize,

    /// Minimum trackable fundamental frequency in Hz (default: 60.0, ~B1)
    pub fmin_hz: f32,

    /// Maximum trackable fundamental frequency in Hz (default: 1000.0, ~B5)
    pub fmax_hz: f32,

    // Voicing gate
    /// Voicing confidence threshold (default: 0.15)
    /// Frames with confidence below this value are treated as silence
    pub voicing_threshold: f32,

    // Pitch quantization
    /// Lower bound on the learned pitch alphabet size (default: 3)
    /// Even a near-monotone hum gets some cluster structure
    pub min_clusters: usize,

    /// Upper bound on the learned pitch alphabet size (default: 30)
    /// Bounds clustering cost and avoids over-fragmentation on noisy input
    pub max_clusters: usize,

    /// Seed for the k-means random number generator (default: 42)
    /// Fixed seeding makes the whole pipeline deterministic; vary deliberately
    pub kmeans_seed: u64,

    /// Number of k-means restarts, keeping the fit with lowest inertia
    /// (default: 10)
    pub kmeans_restarts: usize,

    // Contour smoothing
    /// Median filter window in frames, must be odd (default: 5)
    pub smoothing_window: usize,

    // Note segmentation
    /// Minimum note duration in seconds (default: 0.03)
    /// Shorter spans are discarded as noise
    pub min_note_duration: f32,

    // MIDI export
    /// Constant note velocity for export (default: 100)
    pub velocity: u8,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            fmin_hz: 60.0,
            fmax_hz: 1000.0,
            voicing_threshold: 0.15,
            min_clusters: 3,
            max_clusters: 30,
            kmeans_seed: 42,
            kmeans_restarts: 10,
            smoothing_window: 5,
            min_note_duration: 0.03,
            velocity: 100,
        }
    }
}
