//! YIN fundamental frequency tracking
//!
//! Frame-wise implementation of the YIN algorithm: squared-difference
//! function computed via FFT-accelerated autocorrelation, cumulative mean
//! normalized difference (CMNDF), absolute threshold search, and parabolic
//! interpolation of the selected lag. The voicing confidence reported per
//! frame is `1 - CMNDF` at the selected lag, so strongly periodic frames
//! score near 1 and noise scores near 0.
//!
//! # Reference
//!
//! de Cheveigné, A., & Kawahara, H. (2002). YIN, a fundamental frequency
//! estimator for speech and music.
//! *Journal of the Acoustical Society of America*, 111(4), 1917-1930.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::TranscriptionError;
use crate::pitch::{FramePitchSource, PitchFrame};

/// Frames quieter than this RMS are unvoiced without further analysis
const SILENCE_RMS: f32 = 1e-4;

const EPSILON: f32 = 1e-8;

/// YIN-based frame pitch source
#[derive(Debug, Clone)]
pub struct YinTracker {
    /// Analysis frame size in samples (default: 2048)
    pub frame_size: usize,

    /// Hop between frames in samples (default: 512)
    pub hop_size: usize,

    /// Minimum trackable f0 in Hz (default: 60.0)
    pub fmin_hz: f32,

    /// Maximum trackable f0 in Hz (default: 1000.0)
    pub fmax_hz: f32,

    /// CMNDF absolute threshold (default: 0.1)
    pub threshold: f32,
}

impl Default for YinTracker {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            fmin_hz: 60.0,
            fmax_hz: 1000.0,
            threshold: 0.1,
        }
    }
}

impl FramePitchSource for YinTracker {
    fn track(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<Vec<PitchFrame>, TranscriptionError> {
        if sample_rate == 0 {
            return Err(TranscriptionError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }
        if self.frame_size == 0 || self.hop_size == 0 {
            return Err(TranscriptionError::InvalidInput(
                "Frame size and hop size must be > 0".to_string(),
            ));
        }
        if !(0.0 < self.fmin_hz && self.fmin_hz < self.fmax_hz) {
            return Err(TranscriptionError::InvalidInput(format!(
                "Invalid f0 range [{}, {}]",
                self.fmin_hz, self.fmax_hz
            )));
        }
        if samples.len() < self.frame_size {
            return Err(TranscriptionError::InvalidInput(format!(
                "Audio too short: {} samples, need at least one frame of {}",
                samples.len(),
                self.frame_size
            )));
        }

        let num_frames = (samples.len() - self.frame_size) / self.hop_size + 1;
        let sr = sample_rate as f32;

        let min_tau = ((sr / self.fmax_hz).floor() as usize).max(2);
        let max_tau = ((sr / self.fmin_hz).ceil() as usize).min(self.frame_size - 2);
        if min_tau >= max_tau {
            return Err(TranscriptionError::InvalidInput(format!(
                "f0 range [{}, {}] Hz unresolvable at frame size {}",
                self.fmin_hz, self.fmax_hz, self.frame_size
            )));
        }

        log::debug!(
            "YIN tracking {} frames: frame={}, hop={}, tau=[{}, {}]",
            num_frames,
            self.frame_size,
            self.hop_size,
            min_tau,
            max_tau
        );

        // FFT plans are shared across frames of one call; nothing persists
        // between calls.
        let fft_len = (2 * self.frame_size).next_power_of_two();
        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let mut frames = Vec::with_capacity(num_frames);
        let mut spectrum = vec![Complex::new(0.0f32, 0.0f32); fft_len];

        for frame_idx in 0..num_frames {
            let offset = frame_idx * self.hop_size;
            let frame = &samples[offset..offset + self.frame_size];
            frames.push(self.analyze_frame(
                frame,
                sr,
                min_tau,
                max_tau,
                forward.as_ref(),
                inverse.as_ref(),
                &mut spectrum,
            ));
        }

        Ok(frames)
    }
}

impl YinTracker {
    /// Build a tracker from explicit analysis parameters
    pub fn new(frame_size: usize, hop_size: usize, fmin_hz: f32, fmax_hz: f32) -> Self {
        Self {
            frame_size,
            hop_size,
            fmin_hz,
            fmax_hz,
            ..Self::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn analyze_frame(
        &self,
        frame: &[f32],
        sample_rate: f32,
        min_tau: usize,
        max_tau: usize,
        forward: &dyn rustfft::Fft<f32>,
        inverse: &dyn rustfft::Fft<f32>,
        spectrum: &mut [Complex<f32>],
    ) -> PitchFrame {
        let n = frame.len();

        let energy: f32 = frame.iter().map(|&s| s * s).sum();
        let rms = (energy / n as f32).sqrt();
        if rms < SILENCE_RMS {
            return PitchFrame {
                f0_hz: f32::NAN,
                voicing: 0.0,
            };
        }

        // Linear autocorrelation via zero-padded FFT:
        // r[tau] = IFFT(|FFT(x)|^2)[tau]
        for (slot, &s) in spectrum.iter_mut().zip(frame.iter()) {
            *slot = Complex::new(s, 0.0);
        }
        for slot in spectrum.iter_mut().skip(n) {
            *slot = Complex::new(0.0, 0.0);
        }
        forward.process(spectrum);
        for slot in spectrum.iter_mut() {
            *slot = Complex::new(slot.norm_sqr(), 0.0);
        }
        inverse.process(spectrum);
        let scale = 1.0 / spectrum.len() as f32;

        // Difference function from the autocorrelation identity:
        // d[tau] = e(0, n-tau) + e(tau, n) - 2 r[tau]
        let mut prefix = Vec::with_capacity(n + 1);
        prefix.push(0.0f32);
        let mut acc = 0.0f32;
        for &s in frame {
            acc += s * s;
            prefix.push(acc);
        }

        let mut cmndf = vec![1.0f32; max_tau + 1];
        let mut running = 0.0f32;
        for tau in 1..=max_tau {
            let r = spectrum[tau].re * scale;
            let d = (prefix[n - tau] + (prefix[n] - prefix[tau]) - 2.0 * r).max(0.0);
            running += d;
            cmndf[tau] = d * tau as f32 / running.max(EPSILON);
        }

        // Absolute threshold: first dip below threshold wins; follow the dip
        // to its local minimum before interpolating.
        let mut tau_est = None;
        for tau in min_tau..=max_tau {
            if cmndf[tau] < self.threshold {
                let mut t = tau;
                while t + 1 <= max_tau && cmndf[t + 1] < cmndf[t] {
                    t += 1;
                }
                tau_est = Some(t);
                break;
            }
        }

        match tau_est {
            Some(tau) => {
                let refined = parabolic_interpolation(&cmndf, tau);
                let confidence = (1.0 - cmndf[tau]).clamp(0.0, 1.0);
                PitchFrame {
                    f0_hz: sample_rate / refined,
                    voicing: confidence,
                }
            }
            None => {
                // No dip below threshold: report unvoiced with the residual
                // periodicity as (low) confidence.
                let best = (min_tau..=max_tau)
                    .min_by(|&a, &b| {
                        cmndf[a]
                            .partial_cmp(&cmndf[b])
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .unwrap_or(min_tau);
                PitchFrame {
                    f0_hz: f32::NAN,
                    voicing: (1.0 - cmndf[best]).clamp(0.0, 1.0),
                }
            }
        }
    }
}

/// Refine an integer lag by fitting a parabola through its neighbors
fn parabolic_interpolation(cmndf: &[f32], tau: usize) -> f32 {
    if tau == 0 || tau + 1 >= cmndf.len() {
        return tau as f32;
    }
    let a = cmndf[tau - 1];
    let b = cmndf[tau];
    let c = cmndf[tau + 1];
    let denom = a - 2.0 * b + c;
    if denom.abs() < EPSILON {
        tau as f32
    } else {
        tau as f32 + (a - c) / (2.0 * denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_tracks_a4_sine() {
        let samples = sine(440.0, 22050, 1.0);
        let tracker = YinTracker::default();
        let frames = tracker.track(&samples, 22050).unwrap();
        assert!(!frames.is_empty());

        for frame in &frames {
            assert!(frame.f0_hz.is_finite(), "sine frames should be voiced");
            assert!(
                (frame.f0_hz - 440.0).abs() < 5.0,
                "expected ~440 Hz, got {}",
                frame.f0_hz
            );
            assert!(frame.voicing > 0.5);
        }
    }

    #[test]
    fn test_low_frequency_hum() {
        let samples = sine(110.0, 22050, 1.0);
        let tracker = YinTracker::default();
        let frames = tracker.track(&samples, 22050).unwrap();
        for frame in &frames {
            assert!((frame.f0_hz - 110.0).abs() < 3.0, "got {}", frame.f0_hz);
        }
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let samples = vec![0.0f32; 22050];
        let tracker = YinTracker::default();
        let frames = tracker.track(&samples, 22050).unwrap();
        assert!(!frames.is_empty());
        for frame in &frames {
            assert!(frame.f0_hz.is_nan());
            assert_eq!(frame.voicing, 0.0);
        }
    }

    #[test]
    fn test_frame_count() {
        let tracker = YinTracker::default();
        let samples = vec![0.1f32; 2048 + 512 * 9];
        let frames = tracker.track(&samples, 22050).unwrap();
        assert_eq!(frames.len(), 10);
    }

    #[test]
    fn test_too_short_audio_is_error() {
        let tracker = YinTracker::default();
        assert!(tracker.track(&[0.0; 100], 22050).is_err());
    }

    #[test]
    fn test_invalid_parameters() {
        let tracker = YinTracker::default();
        assert!(tracker.track(&[0.0; 4096], 0).is_err());

        let bad_range = YinTracker {
            fmin_hz: 500.0,
            fmax_hz: 100.0,
            ..YinTracker::default()
        };
        assert!(bad_range.track(&[0.0; 4096], 22050).is_err());
    }
}
