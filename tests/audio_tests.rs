// Audio I/O tests
//
// These tests focus on reading source WAV files, reducing them to the mono
// buffer the analysis runs on, and writing grains back out. WAV files are
// synthesized into temporary directories.
//
// The tests cover:
// - WAV file loading and format conversion
// - Channel selection, mixing and time range extraction
// - Grain writing
// - Error handling for invalid parameters and files

use grain_extractor::audio::{self, AudioError, ChannelSelection};
use std::path::Path;
use tempfile::tempdir;

use test_utils::{interleave, sine, write_wav_16bit, A4, SAMPLE_RATE};

/// Test WAV file loading functionality.
///
/// This test verifies:
/// - Loading a stereo 16-bit WAV file from disk
/// - Correct extraction of WAV properties (sample rate, channels)
/// - Conversion of integer samples to the [-1, 1] range
#[test]
fn test_wav_file_loading() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("stereo.wav");
    let left = sine(A4, SAMPLE_RATE, 1.0, 0.5);
    let right = vec![0.25_f32; left.len()];
    write_wav_16bit(&path, &interleave(&left, &right), SAMPLE_RATE, 2);

    let wav = audio::read_wav_file(&path).expect("Failed to load WAV file");

    assert_eq!(wav.sample_rate, SAMPLE_RATE);
    assert_eq!(wav.channels, 2);
    assert_eq!(wav.frames(), left.len());
    assert!((wav.duration() - 1.0).abs() < 1e-6);
    assert!(wav.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!((wav.samples[1] - 0.25).abs() < 1e-3);
}

/// Test reduction of a stereo file to a mono buffer.
///
/// This test verifies:
/// - Picking a single channel keeps only that channel
/// - Mixing averages the channels
/// - The time range selects the expected number of samples
#[test]
fn test_channel_selection() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("stereo.wav");
    let frames = SAMPLE_RATE as usize * 2;
    let left = vec![0.5_f32; frames];
    let right = vec![-0.25_f32; frames];
    write_wav_16bit(&path, &interleave(&left, &right), SAMPLE_RATE, 2);
    let wav = audio::read_wav_file(&path).expect("Failed to load WAV file");

    let first = wav
        .to_buffer(ChannelSelection::Index(0), 1.0, Some(0.5))
        .expect("valid range");
    assert_eq!(first.len(), 22050);
    assert!(first.samples().iter().all(|s| (s - 0.5).abs() < 1e-3));

    let second = wav
        .to_buffer(ChannelSelection::Index(1), 0.0, None)
        .expect("valid range");
    assert_eq!(second.len(), frames);
    assert!(second.samples().iter().all(|s| (s + 0.25).abs() < 1e-3));

    let mixed = wav
        .to_buffer(ChannelSelection::Mix, 0.0, Some(0.1))
        .expect("valid range");
    assert_eq!(mixed.len(), 4410);
    assert!(mixed.samples().iter().all(|s| (s - 0.125).abs() < 1e-3));
}

/// Test time range clipping and validation.
///
/// This test verifies:
/// - A range running past the end of the file is clipped
/// - A start time beyond the file and a missing channel are rejected
/// - A non-positive duration is rejected
#[test]
fn test_range_validation() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("mono.wav");
    write_wav_16bit(&path, &sine(A4, SAMPLE_RATE, 1.0, 0.5), SAMPLE_RATE, 1);
    let wav = audio::read_wav_file(&path).expect("Failed to load WAV file");

    let tail = wav
        .to_buffer(ChannelSelection::Index(0), 0.75, Some(0.5))
        .expect("clipped range");
    assert_eq!(tail.len(), 11025);

    assert!(matches!(
        wav.to_buffer(ChannelSelection::Index(0), 10.0, Some(0.5)),
        Err(AudioError::InvalidParams(_))
    ));
    assert!(matches!(
        wav.to_buffer(ChannelSelection::Index(1), 0.0, Some(0.5)),
        Err(AudioError::InvalidParams(_))
    ));
    assert!(matches!(
        wav.to_buffer(ChannelSelection::Index(0), 0.0, Some(0.0)),
        Err(AudioError::InvalidParams(_))
    ));
}

/// Test grain writing.
///
/// This test verifies:
/// - Grains are written as mono 32-bit float WAV files
/// - Samples survive the round trip exactly
#[test]
fn test_write_wav_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("grain.wav");
    let samples: Vec<f32> = (0..400).map(|i| (i as f32 / 200.0) - 1.0).collect();

    audio::write_wav_file(&path, 48000, &samples).expect("Failed to write WAV file");
    let wav = audio::read_wav_file(&path).expect("Failed to load WAV file");

    assert_eq!(wav.sample_rate, 48000);
    assert_eq!(wav.channels, 1);
    assert_eq!(wav.samples, samples);
}

/// Test audio processing error cases.
///
/// This test verifies:
/// - Proper error handling for non-existent WAV files
/// - Unsupported sample formats are reported as parse errors
#[test]
fn test_audio_error_cases() {
    let result = audio::read_wav_file(Path::new("non_existent_file.wav"));
    assert!(result.is_err(), "Should return error for non-existent file");

    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("8bit.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV file");
    for i in 0..100 {
        writer.write_sample((i % 64) as i8).expect("Failed to write sample");
    }
    writer.finalize().expect("Failed to finalize WAV file");

    assert!(matches!(
        audio::read_wav_file(&path),
        Err(AudioError::WavParse(_))
    ));
}
