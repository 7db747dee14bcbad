//! Pitch quantizer: per-input pitch alphabet learning
//!
//! Learns a small discrete alphabet of pitches from the specific input's
//! pitch distribution and snaps every voiced frame to the nearest member.
//! This corrects humming drift and produces musically quantized
//! integer-semitone notes without assuming a fixed global scale.
//!
//! The cluster count is chosen from the observed range (roughly one cluster
//! per semitone, clamped to configured bounds) and the centers are fit with
//! seeded k-means, so the whole step is deterministic for a given seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::TranscriptionError;
use crate::pipeline::SILENCE;

const MAX_ITERATIONS: usize = 100;
const CONVERGENCE_EPSILON: f32 = 1e-6;

/// Quantization output
#[derive(Debug, Clone)]
pub struct QuantizedContour {
    /// Per-frame integer pitch, `SILENCE` (0) for unvoiced frames
    pub contour: Vec<i32>,

    /// Sorted distinct rounded cluster centers
    ///
    /// Two trained clusters may round to the same integer semitone; the
    /// alphabet deduplicates, so its size can be smaller than the cluster
    /// count.
    pub alphabet: Vec<i32>,
}

/// Choose the cluster count from the observed semitone range
///
/// `K = clamp(round(range) + 1, min_clusters, max_clusters)`: roughly one
/// cluster per semitone of range, floored so even a flat hum gets some
/// structure, capped to bound compute cost.
pub fn choose_cluster_count(range: f32, min_clusters: usize, max_clusters: usize) -> usize {
    let k = range.round() as usize + 1;
    k.clamp(min_clusters, max_clusters)
}

/// Quantize a gated semitone sequence onto a learned pitch alphabet
///
/// # Arguments
///
/// * `gated` - Per-frame raw semitone values, `0.0` for unvoiced frames
/// * `min_clusters` / `max_clusters` - Bounds on the alphabet size
/// * `restarts` - Number of k-means restarts (best inertia kept)
/// * `seed` - RNG seed; fixed seed makes the fit deterministic
///
/// # Returns
///
/// The per-frame quantized contour (0 for unvoiced) and the pitch alphabet.
///
/// # Errors
///
/// Returns `InvalidInput` if no frame is voiced (callers are expected to
/// short-circuit that case before quantization) or if the cluster bounds
/// are inconsistent.
///
/// A perfectly flat input is not an error: the clamp still requests
/// `min_clusters` clusters and k-means collapses them onto the same center,
/// which is documented degenerate-but-valid behavior.
pub fn quantize_contour(
    gated: &[f32],
    min_clusters: usize,
    max_clusters: usize,
    restarts: usize,
    seed: u64,
) -> Result<QuantizedContour, TranscriptionError> {
    if min_clusters == 0 || min_clusters > max_clusters {
        return Err(TranscriptionError::InvalidInput(format!(
            "Invalid cluster bounds [{}, {}]",
            min_clusters, max_clusters
        )));
    }

    let voiced: Vec<f32> = gated.iter().copied().filter(|&s| s > 0.0).collect();
    if voiced.is_empty() {
        return Err(TranscriptionError::InvalidInput(
            "Cannot quantize a sequence with no voiced frames".to_string(),
        ));
    }

    let (min, max) = voiced
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    let range = max - min;

    // Never ask for more clusters than there are samples.
    let k = choose_cluster_count(range, min_clusters, max_clusters).min(voiced.len());

    log::debug!(
        "Quantizing {} voiced frames, range {:.2} semitones, k = {}",
        voiced.len(),
        range,
        k
    );

    let fit = kmeans_1d(&voiced, k, restarts.max(1), seed);

    // Round each center to the nearest integer semitone. Clamped to 1..=127
    // so a center can never collide with the silence sentinel and always
    // fits a MIDI note number.
    let rounded: Vec<i32> = fit
        .centers
        .iter()
        .map(|&c| (c.round() as i32).clamp(1, 127))
        .collect();

    let mut contour = Vec::with_capacity(gated.len());
    let mut label_iter = fit.labels.iter();
    for &s in gated {
        if s > 0.0 {
            // Labels were produced in voiced-frame order.
            let &label = label_iter
                .next()
                .ok_or_else(|| {
                    TranscriptionError::ProcessingError(
                        "Cluster label count does not match voiced frame count".to_string(),
                    )
                })?;
            contour.push(rounded[label]);
        } else {
            contour.push(SILENCE);
        }
    }

    let mut alphabet = rounded;
    alphabet.sort_unstable();
    alphabet.dedup();

    log::debug!("Learned pitch alphabet: {:?}", alphabet);

    Ok(QuantizedContour { contour, alphabet })
}

/// Result of a single k-means fit
struct KMeansFit {
    centers: Vec<f32>,
    labels: Vec<usize>,
    inertia: f32,
}

/// Seeded 1-D k-means: k-means++ initialization, Lloyd iterations, multiple
/// restarts keeping the fit with the lowest inertia.
fn kmeans_1d(values: &[f32], k: usize, restarts: usize, seed: u64) -> KMeansFit {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut best: Option<KMeansFit> = None;
    for _ in 0..restarts {
        let fit = kmeans_single(values, k, &mut rng);
        let better = match &best {
            Some(b) => fit.inertia < b.inertia,
            None => true,
        };
        if better {
            best = Some(fit);
        }
    }

    // restarts >= 1, so a fit always exists
    best.unwrap_or(KMeansFit {
        centers: vec![],
        labels: vec![],
        inertia: f32::INFINITY,
    })
}

fn kmeans_single(values: &[f32], k: usize, rng: &mut StdRng) -> KMeansFit {
    let mut centers = init_plus_plus(values, k, rng);
    let mut labels = vec![0usize; values.len()];

    for _ in 0..MAX_ITERATIONS {
        // Assignment step
        for (i, &v) in values.iter().enumerate() {
            labels[i] = nearest_center(v, &centers);
        }

        // Update step; empty clusters keep their previous center
        let mut sums = vec![0.0f64; k];
        let mut counts = vec![0usize; k];
        for (&v, &label) in values.iter().zip(labels.iter()) {
            sums[label] += v as f64;
            counts[label] += 1;
        }

        let mut max_shift = 0.0f32;
        for c in 0..k {
            if counts[c] > 0 {
                let new_center = (sums[c] / counts[c] as f64) as f32;
                max_shift = max_shift.max((new_center - centers[c]).abs());
                centers[c] = new_center;
            }
        }

        if max_shift < CONVERGENCE_EPSILON {
            break;
        }
    }

    // Final assignment against converged centers
    let mut inertia = 0.0f32;
    for (i, &v) in values.iter().enumerate() {
        let label = nearest_center(v, &centers);
        labels[i] = label;
        let d = v - centers[label];
        inertia += d * d;
    }

    KMeansFit {
        centers,
        labels,
        inertia,
    }
}

/// k-means++ seeding: first center uniform, each subsequent center drawn
/// with probability proportional to squared distance from the nearest
/// already-chosen center.
fn init_plus_plus(values: &[f32], k: usize, rng: &mut StdRng) -> Vec<f32> {
    let mut centers = Vec::with_capacity(k);
    centers.push(values[rng.gen_range(0..values.len())]);

    let mut dist_sq = vec![0.0f32; values.len()];
    while centers.len() < k {
        let mut total = 0.0f32;
        for (i, &v) in values.iter().enumerate() {
            let nearest = centers
                .iter()
                .map(|&c| (v - c) * (v - c))
                .fold(f32::INFINITY, f32::min);
            dist_sq[i] = nearest;
            total += nearest;
        }

        let next = if total > 0.0 {
            let mut target = rng.gen::<f32>() * total;
            let mut chosen = values.len() - 1;
            for (i, &d) in dist_sq.iter().enumerate() {
                target -= d;
                if target <= 0.0 {
                    chosen = i;
                    break;
                }
            }
            values[chosen]
        } else {
            // All points coincide with an existing center (degenerate input)
            values[rng.gen_range(0..values.len())]
        };
        centers.push(next);
    }

    centers
}

fn nearest_center(value: f32, centers: &[f32]) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (c, &center) in centers.iter().enumerate() {
        let d = (value - center).abs();
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}
