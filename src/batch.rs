//! Directory driver: every WAV file in the source directory becomes a grain
//! (plus an optional plot) in the destination directory.

use crate::analysis::{analyze_buffer, Analysis, Grain, PitchEstimate};
use crate::audio::{self, AudioError};
use crate::config::Config;
use crate::plot;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Why a file produced no grain
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("no pitch detected")]
    UndetectedPitch,

    #[error("no periodic candidate found at {0:.2} Hz")]
    NoCandidate(f32),

    #[error("{0}")]
    Failed(String),
}

/// A grain that was written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct GrainRecord {
    pub pitch: f32,
    pub grain_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub start: usize,
    pub len: usize,
    pub score: f32,
}

/// Result of processing a single source file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Extracted(GrainRecord),
    Skipped(SkipReason),
}

/// Outcome of every file in a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl BatchReport {
    pub fn extracted(&self) -> impl Iterator<Item = (&Path, &GrainRecord)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Extracted(record) => Some((path.as_path(), record)),
            FileOutcome::Skipped(_) => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&Path, &SkipReason)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Skipped(reason) => Some((path.as_path(), reason)),
            FileOutcome::Extracted(_) => None,
        })
    }
}

/// Errors that stop a batch before any file is processed
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Failed to read source directory {}: {}", .path.display(), .source)]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create destination directory {}: {}", .path.display(), .source)]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Output file stem embedding the source name and detected pitch,
/// e.g. `piano_A4.440.00Hz`.
pub fn grain_file_stem(source_stem: &str, pitch: f32) -> String {
    format!("{}.{:.2}Hz", source_stem, pitch)
}

/// Lists `.wav` files (case-insensitive) directly inside `dir`, sorted by name.
pub fn list_wav_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads `path`, reduces it to the configured channel and time range, and
/// runs pitch detection and grain extraction on it.
pub fn analyze_file(path: &Path, config: &Config) -> Result<Analysis, AudioError> {
    let wav = audio::read_wav_file(path)?;
    let buffer = wav.to_buffer(
        config.channel_selection(),
        config.input.start_time,
        Some(config.input.duration),
    )?;
    Ok(analyze_buffer(&buffer, &config.analysis_settings())?)
}

/// Analyzes one file and writes its grain into `dest_dir`.
///
/// Every failure is folded into [`FileOutcome::Skipped`] so the caller can
/// move on to the next file.
pub fn process_file(path: &Path, dest_dir: &Path, config: &Config) -> FileOutcome {
    let analysis = match analyze_file(path, config) {
        Ok(analysis) => analysis,
        Err(e) => return FileOutcome::Skipped(SkipReason::Failed(e.to_string())),
    };

    let pitch = match analysis.pitch {
        PitchEstimate::Detected(freq) => freq,
        PitchEstimate::Undetected => return FileOutcome::Skipped(SkipReason::UndetectedPitch),
    };
    info!(pitch, "Detected pitch");

    let grain = match analysis.grain {
        Some(grain) => grain,
        None => return FileOutcome::Skipped(SkipReason::NoCandidate(pitch)),
    };

    let source_stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "grain".to_string());
    let stem = grain_file_stem(&source_stem, pitch);

    match write_grain(&grain, dest_dir, &stem, config.output.plot) {
        Ok((grain_path, plot_path)) => FileOutcome::Extracted(GrainRecord {
            pitch,
            grain_path,
            plot_path,
            start: grain.start,
            len: grain.len(),
            score: grain.score,
        }),
        Err(e) => FileOutcome::Skipped(SkipReason::Failed(e.to_string())),
    }
}

/// Processes every WAV file in the configured source directory.
///
/// # Errors
/// * If the source directory cannot be listed
/// * If the destination directory cannot be created
pub fn run_batch(config: &Config) -> Result<BatchReport, BatchError> {
    let source_dir = &config.paths.source_dir;
    let dest_dir = &config.paths.dest_dir;

    let files = list_wav_files(source_dir).map_err(|source| BatchError::ReadDir {
        path: source_dir.clone(),
        source,
    })?;
    fs::create_dir_all(dest_dir).map_err(|source| BatchError::CreateDir {
        path: dest_dir.clone(),
        source,
    })?;

    let mut report = BatchReport::default();
    for path in files {
        info!("Working on {}", path.display());
        let outcome = process_file(&path, dest_dir, config);
        match &outcome {
            FileOutcome::Extracted(record) => info!(
                score = record.score,
                len = record.len,
                "Wrote {}",
                record.grain_path.display()
            ),
            FileOutcome::Skipped(reason) => warn!("Skipping {}: {}", path.display(), reason),
        }
        report.files.push((path, outcome));
    }

    Ok(report)
}

fn write_grain(
    grain: &Grain,
    dest_dir: &Path,
    stem: &str,
    with_plot: bool,
) -> Result<(PathBuf, Option<PathBuf>), AudioError> {
    let grain_path = dest_dir.join(format!("{}.wav", stem));
    audio::write_wav_file(&grain_path, grain.sample_rate, &grain.samples)?;

    let plot_path = if with_plot {
        let plot_path = dest_dir.join(format!("{}.svg", stem));
        plot::write_plot(&plot_path, &grain.samples, stem)?;
        Some(plot_path)
    } else {
        None
    };

    Ok((grain_path, plot_path))
}
