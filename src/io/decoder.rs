//! Audio decoding using Symphonia
//!
//! Decodes any container/codec Symphonia supports into mono f32 samples.
//! Multi-channel audio is downmixed by averaging.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::TranscriptionError;

/// Decode an audio file to mono PCM samples
///
/// # Arguments
///
/// * `path` - Path to the audio file
///
/// # Returns
///
/// Tuple of (mono samples normalized to [-1.0, 1.0], sample rate)
///
/// # Errors
///
/// Returns `DecodingError` if the file cannot be opened, probed, or decoded,
/// or contains no supported audio track.
pub fn decode_audio(path: &Path) -> Result<(Vec<f32>, u32), TranscriptionError> {
    log::debug!("Decoding audio file: {}", path.display());

    let src = File::open(path).map_err(|e| {
        TranscriptionError::DecodingError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TranscriptionError::DecodingError(format!("Unsupported format: {}", e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            TranscriptionError::DecodingError("No supported audio tracks found".to_string())
        })?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
        TranscriptionError::DecodingError("Track has no sample rate".to_string())
    })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TranscriptionError::DecodingError(format!("Unsupported codec: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream (or unrecoverable container error) ends decoding.
            Err(_) => break,
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count().max(1);

                if sample_buf.is_none() {
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    for frame in buf.samples().chunks(channels) {
                        mono.push(frame.iter().sum::<f32>() / channels as f32);
                    }
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupted packets are skipped, not fatal.
                log::warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => {
                return Err(TranscriptionError::DecodingError(format!(
                    "Decode failed: {}",
                    e
                )));
            }
        }
    }

    if mono.is_empty() {
        return Err(TranscriptionError::DecodingError(format!(
            "No audio decoded from {}",
            path.display()
        )));
    }

    log::debug!(
        "Decoded {} mono samples at {} Hz ({:.2} s)",
        mono.len(),
        sample_rate,
        mono.len() as f32 / sample_rate as f32
    );

    Ok((mono, sample_rate))
}
