//! Contour smoother: sliding median jitter removal
//!
//! Removes single-frame outliers (spurious octave jumps, isolated cluster
//! mis-assignments) that would otherwise fragment a sustained note. The
//! filter runs over the raw quantized+silence sequence on purpose: a brief
//! single-frame silence gap inside a note gets smoothed over, and an
//! isolated voiced blip surrounded by silence gets smoothed away to silence.

use crate::error::TranscriptionError;

/// Apply a sliding median filter of odd width `window` to the contour
///
/// Edge policy: the sequence is zero-padded, so the first and last
/// `(window - 1) / 2` positions see sentinel silence beyond the boundary.
/// A window of 1 is the identity.
///
/// # Errors
///
/// Returns `InvalidInput` if `window` is zero or even.
pub fn median_smooth(contour: &[i32], window: usize) -> Result<Vec<i32>, TranscriptionError> {
    if window == 0 || window % 2 == 0 {
        return Err(TranscriptionError::InvalidInput(format!(
            "Median window must be odd and non-zero, got {}",
            window
        )));
    }

    if window == 1 || contour.is_empty() {
        return Ok(contour.to_vec());
    }

    log::debug!(
        "Median smoothing {} frames with window {}",
        contour.len(),
        window
    );

    let half = window / 2;
    let mut buf = Vec::with_capacity(window);
    let smoothed = (0..contour.len())
        .map(|i| {
            buf.clear();
            for offset in 0..window {
                let j = i as isize - half as isize + offset as isize;
                if j >= 0 && (j as usize) < contour.len() {
                    buf.push(contour[j as usize]);
                } else {
                    buf.push(0);
                }
            }
            buf.sort_unstable();
            buf[half]
        })
        .collect();

    Ok(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_must_be_odd() {
        assert!(median_smooth(&[1, 2, 3], 4).is_err());
        assert!(median_smooth(&[1, 2, 3], 0).is_err());
    }

    #[test]
    fn test_window_one_is_identity() {
        let contour = vec![60, 0, 62, 0, 64];
        assert_eq!(median_smooth(&contour, 1).unwrap(), contour);
    }

    #[test]
    fn test_removes_single_frame_blip() {
        // One spurious octave jump inside a sustained note
        let contour = vec![60, 60, 60, 72, 60, 60, 60];
        let smoothed = median_smooth(&contour, 5).unwrap();
        assert!(smoothed.iter().all(|&p| p == 60));
    }

    #[test]
    fn test_isolated_blip_in_silence_is_removed() {
        let contour = vec![0, 0, 0, 0, 72, 0, 0, 0, 0];
        let smoothed = median_smooth(&contour, 5).unwrap();
        assert!(smoothed.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_fills_single_frame_gap_inside_note() {
        let contour = vec![60, 60, 60, 0, 60, 60, 60];
        let smoothed = median_smooth(&contour, 5).unwrap();
        assert!(smoothed.iter().all(|&p| p == 60));
    }

    #[test]
    fn test_zero_padded_edges_keep_sustained_note() {
        // Zero padding must not eat a note that starts at frame 0
        let contour = vec![60; 10];
        let smoothed = median_smooth(&contour, 5).unwrap();
        assert_eq!(smoothed, contour);
    }

    #[test]
    fn test_long_silence_gap_survives() {
        let mut contour = vec![60; 20];
        contour.extend(vec![0; 20]);
        contour.extend(vec![60; 20]);
        let smoothed = median_smooth(&contour, 5).unwrap();
        // The gap is far wider than the window, so it must remain
        assert!(smoothed[25..35].iter().all(|&p| p == 0));
        assert!(smoothed[5..15].iter().all(|&p| p == 60));
        assert!(smoothed[45..55].iter().all(|&p| p == 60));
    }

    #[test]
    fn test_preserves_length() {
        let contour = vec![60, 0, 62, 64, 0, 0, 65];
        assert_eq!(median_smooth(&contour, 5).unwrap().len(), contour.len());
    }
}
