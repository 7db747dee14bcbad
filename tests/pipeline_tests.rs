//! Integration tests for the hum-to-melody pipeline

use hum2note::{
    transcribe_audio, transcribe_frames, PitchFrame, Transcription, TranscriptionConfig,
};

const SR: u32 = 22050;
const HOP: usize = 512;
const FRAME_TIME: f32 = HOP as f32 / SR as f32;

fn semitone_to_hz(semitone: f32) -> f32 {
    440.0 * 2.0_f32.powf((semitone - 69.0) / 12.0)
}

fn voiced(semitone: f32) -> PitchFrame {
    PitchFrame {
        f0_hz: semitone_to_hz(semitone),
        voicing: 0.9,
    }
}

fn unvoiced() -> PitchFrame {
    PitchFrame {
        f0_hz: f32::NAN,
        voicing: 0.0,
    }
}

fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * seconds) as usize;
    (0..n)
        .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
        .collect()
}

#[test]
fn test_sustained_hum_yields_one_note() {
    // 100 frames at semitone 60, hop 512 @ 22050 Hz: ~2.32 s total
    let frames = vec![voiced(60.0); 100];
    let result = transcribe_frames(&frames, SR, &TranscriptionConfig::default()).unwrap();

    let melody = result.melody().expect("expected a melody");
    assert_eq!(melody.notes.len(), 1);
    assert_eq!(melody.notes[0].pitch, 60);
    assert_eq!(melody.notes[0].start_time, 0.0);
    assert!((melody.notes[0].end_time - 100.0 * FRAME_TIME).abs() < 0.01);

    assert_eq!(melody.pitches_used, vec![60]);
    assert_eq!(melody.metadata.num_frames, 100);
    assert_eq!(melody.metadata.voiced_frames, 100);
    assert_eq!(melody.metadata.sample_rate, SR);
}

#[test]
fn test_long_silence_gap_splits_notes() {
    // 20 voiced, 20 unvoiced, 20 voiced: the ~0.46 s gap is far longer than
    // the minimum note duration and must not be smoothed away.
    let mut frames = vec![voiced(60.0); 20];
    frames.extend(vec![unvoiced(); 20]);
    frames.extend(vec![voiced(60.0); 20]);

    let result = transcribe_frames(&frames, SR, &TranscriptionConfig::default()).unwrap();
    let melody = result.melody().expect("expected a melody");

    assert_eq!(melody.notes.len(), 2);
    for note in &melody.notes {
        assert_eq!(note.pitch, 60);
        assert!((note.duration() - 20.0 * FRAME_TIME).abs() < 0.05);
    }
    let gap = melody.notes[1].start_time - melody.notes[0].end_time;
    assert!((gap - 20.0 * FRAME_TIME).abs() < 0.05);
}

#[test]
fn test_isolated_blip_is_smoothed_to_silence() {
    // A single voiced frame surrounded by >= 4 unvoiced frames on each side:
    // the width-5 median removes it entirely. The analysis is still valid,
    // so the result is an empty melody, not NoVoicedSignal.
    let mut frames = vec![unvoiced(); 5];
    frames.push(voiced(72.0));
    frames.extend(vec![unvoiced(); 5]);

    let result = transcribe_frames(&frames, SR, &TranscriptionConfig::default()).unwrap();
    let melody = result.melody().expect("valid analysis with zero notes");
    assert!(melody.notes.is_empty());
    assert!(melody.pitches_used.is_empty());
    assert_eq!(melody.metadata.voiced_frames, 1);
}

#[test]
fn test_all_unvoiced_is_no_voiced_signal() {
    let frames = vec![unvoiced(); 80];
    let result = transcribe_frames(&frames, SR, &TranscriptionConfig::default()).unwrap();
    assert!(result.is_no_voiced_signal());
    assert!(result.melody().is_none());
}

#[test]
fn test_low_confidence_frames_are_no_voiced_signal() {
    // Defined f0 but confidence below the gate on every frame
    let frames = vec![
        PitchFrame {
            f0_hz: 440.0,
            voicing: 0.1,
        };
        60
    ];
    let result = transcribe_frames(&frames, SR, &TranscriptionConfig::default()).unwrap();
    assert!(result.is_no_voiced_signal());
}

#[test]
fn test_distinct_pitches_bounded_by_cluster_count() {
    // Six sustained pitches spanning 15 semitones
    let mut frames = Vec::new();
    for &semitone in &[55.0f32, 58.0, 61.0, 64.0, 67.0, 70.0] {
        frames.extend(vec![voiced(semitone); 15]);
    }

    let result = transcribe_frames(&frames, SR, &TranscriptionConfig::default()).unwrap();
    let melody = result.melody().expect("expected a melody");

    // K = clamp(round(range) + 1, 3, 30) over the gated semitone range
    let k: usize = 15 + 1;
    assert!(!melody.notes.is_empty());
    assert!(melody.pitches_used.len() <= k);
    assert!(melody.metadata.alphabet_size <= k);
}

#[test]
fn test_note_invariants_hold_on_jittered_input() {
    // Sustained runs with sub-semitone jitter, as a real hum would produce
    let mut frames = Vec::new();
    for run in 0..8 {
        let base = 57.0 + (run % 4) as f32 * 3.0;
        for i in 0..20 {
            frames.push(voiced(base + 0.3 * ((i * 7 % 5) as f32 - 2.0) / 2.0));
        }
        frames.extend(vec![unvoiced(); 6]);
    }

    let config = TranscriptionConfig::default();
    let result = transcribe_frames(&frames, SR, &config).unwrap();
    let melody = result.melody().expect("expected a melody");
    assert!(!melody.notes.is_empty());

    for note in &melody.notes {
        assert!(note.end_time > note.start_time);
        assert!(note.duration() > config.min_note_duration);
    }
    for pair in melody.notes.windows(2) {
        assert!(pair[0].start_time <= pair[1].start_time);
        assert!(pair[0].end_time <= pair[1].start_time + 1e-6);
    }
}

#[test]
fn test_pipeline_is_deterministic_for_fixed_seed() {
    let mut frames = Vec::new();
    for i in 0..200 {
        let base = 60.0 + ((i / 25) % 3) as f32 * 5.0;
        frames.push(voiced(base + 0.4 * (i as f32 * 0.9).sin()));
    }

    let config = TranscriptionConfig::default();
    let a = transcribe_frames(&frames, SR, &config).unwrap();
    let b = transcribe_frames(&frames, SR, &config).unwrap();

    let (a, b) = (a.melody().unwrap(), b.melody().unwrap());
    assert_eq!(a.notes, b.notes);
    assert_eq!(a.pitches_used, b.pitches_used);
}

#[test]
fn test_short_note_dropped_without_merging() {
    // With smoothing disabled, a single-frame run (~0.023 s < 0.03 s) is
    // dropped but still terminates its neighbor's boundary.
    let mut frames = vec![voiced(60.0); 10];
    frames.push(voiced(62.0));
    frames.extend(vec![voiced(60.0); 10]);

    let config = TranscriptionConfig {
        smoothing_window: 1,
        ..TranscriptionConfig::default()
    };
    let result = transcribe_frames(&frames, SR, &config).unwrap();
    let melody = result.melody().expect("expected a melody");

    assert_eq!(melody.notes.len(), 2);
    assert!(melody.notes.iter().all(|n| n.pitch == 60));
    assert!((melody.notes[0].end_time - 10.0 * FRAME_TIME).abs() < 1e-4);
    assert!((melody.notes[1].start_time - 11.0 * FRAME_TIME).abs() < 1e-4);
}

#[test]
fn test_audio_end_to_end_middle_c() {
    // 1.5 s sine at middle C (semitone 60)
    let samples = sine(semitone_to_hz(60.0), SR, 1.5);
    let result = transcribe_audio(&samples, SR, &TranscriptionConfig::default()).unwrap();

    let melody = result.melody().expect("expected a melody");
    assert_eq!(melody.notes.len(), 1);
    assert_eq!(melody.notes[0].pitch, 60);
    assert!(melody.notes[0].duration() > 1.0);
}

#[test]
fn test_audio_silence_is_no_voiced_signal() {
    let samples = vec![0.0f32; SR as usize];
    let result = transcribe_audio(&samples, SR, &TranscriptionConfig::default()).unwrap();
    assert!(result.is_no_voiced_signal());
}
