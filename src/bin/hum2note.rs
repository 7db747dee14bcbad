//! Hum-to-MIDI command line tool
//!
//! Usage:
//!   hum2note [--jobs N] [--output-dir DIR] <file1> [file2 ...]
//!
//! Decodes each recording, transcribes it, and writes `<stem>.mid` next to
//! the input (or into `--output-dir`). Multiple inputs are processed in
//! parallel, one whole conversion per worker; each conversion itself is
//! single-threaded.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rayon::prelude::*;

use hum2note::io::{decoder, midi};
use hum2note::{transcribe_audio, Transcription, TranscriptionConfig, TranscriptionError};

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let dir = output_dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(stem).with_extension("mid")
}

fn convert(input: &Path, output_dir: Option<&Path>) -> Result<(), TranscriptionError> {
    let (samples, sample_rate) = decoder::decode_audio(input)?;

    let config = TranscriptionConfig::default();
    match transcribe_audio(&samples, sample_rate, &config)? {
        Transcription::Melody(melody) => {
            let out = output_path(input, output_dir);
            midi::write_midi(&melody, config.velocity, &out)?;
            println!(
                "{}: {} notes, pitches {:?} -> {}",
                input.display(),
                melody.notes.len(),
                melody.pitches_used,
                out.display()
            );
        }
        Transcription::NoVoicedSignal => {
            println!(
                "{}: no voiced signal detected, try re-recording",
                input.display()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let mut jobs: Option<usize> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut inputs: Vec<PathBuf> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--jobs" => match args.next().and_then(|v| v.parse().ok()) {
                Some(n) if n >= 1 => jobs = Some(n),
                _ => {
                    eprintln!("--jobs requires a positive integer");
                    return ExitCode::FAILURE;
                }
            },
            "--output-dir" => match args.next() {
                Some(dir) => output_dir = Some(PathBuf::from(dir)),
                None => {
                    eprintln!("--output-dir requires a path");
                    return ExitCode::FAILURE;
                }
            },
            _ => inputs.push(PathBuf::from(arg)),
        }
    }

    if inputs.is_empty() {
        eprintln!("Usage: hum2note [--jobs N] [--output-dir DIR] <file1> [file2 ...]");
        return ExitCode::FAILURE;
    }

    if let Some(dir) = output_dir.as_deref() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Cannot create output directory {}: {}", dir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let failures = if inputs.len() == 1 {
        match convert(&inputs[0], output_dir.as_deref()) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}: {}", inputs[0].display(), e);
                1
            }
        }
    } else {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.unwrap_or_else(default_jobs))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                eprintln!("Failed to build worker pool: {}", e);
                return ExitCode::FAILURE;
            }
        };

        pool.install(|| {
            inputs
                .par_iter()
                .map(|input| match convert(input, output_dir.as_deref()) {
                    Ok(()) => 0usize,
                    Err(e) => {
                        eprintln!("{}: {}", input.display(), e);
                        1
                    }
                })
                .sum::<usize>()
        })
    };

    if failures > 0 {
        eprintln!("{} of {} files failed", failures, inputs.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
