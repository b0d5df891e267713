use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use grain_extractor::analysis::{self, AnalysisError, AudioBuffer, PitchEstimate};
use grain_extractor::audio::{self, AudioError};
use grain_extractor::batch::{self, BatchError, FileOutcome};
use grain_extractor::config::{self, Config, ConfigError};
use grain_extractor::plot;

/// Pitch detection and grain extraction for wavetable synthesis
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the fundamental frequency of a WAV file
    Pitch(PitchArgs),

    /// Extract the most periodic grain from a WAV file
    Grain(GrainArgs),

    /// Extract grains from every WAV file in a directory
    Batch(BatchArgs),
}

#[derive(Args)]
struct PitchArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: PathBuf,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

#[derive(Args)]
struct GrainArgs {
    /// Path to the input WAV file
    #[arg(required = true)]
    wav_file: PathBuf,

    /// Where to write the grain WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Use this fundamental (Hz) instead of detecting one
    #[arg(long)]
    freq: Option<f32>,

    /// Also write an SVG plot of the grain to this path
    #[arg(long)]
    plot: Option<PathBuf>,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory to scan for WAV files
    #[arg(long)]
    source: Option<PathBuf>,

    /// Directory to write grains to
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Do not write SVG plots
    #[arg(long)]
    no_plot: bool,

    #[command(flatten)]
    analysis: AnalysisArgs,
}

/// Overrides for values otherwise taken from config.toml
#[derive(Args)]
struct AnalysisArgs {
    /// Configuration file (defaults to ./config.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Channel to analyze (zero-based)
    #[arg(long)]
    channel: Option<u16>,

    /// Average all channels instead of picking one
    #[arg(long)]
    mix: bool,

    /// Position in audio to begin analysis (seconds)
    #[arg(long)]
    start_time: Option<f32>,

    /// Seconds of audio to analyze
    #[arg(long)]
    duration: Option<f32>,

    /// Lowest fundamental to consider (Hz)
    #[arg(long)]
    min_freq: Option<f32>,

    /// Highest fundamental to consider (Hz)
    #[arg(long)]
    max_freq: Option<f32>,

    /// Fraction of zero-lag energy the pitch peak must exceed
    #[arg(long)]
    threshold: Option<f32>,

    /// Number of periods per grain
    #[arg(long)]
    periods: Option<u32>,

    /// Half-width of the period search band (Hz)
    #[arg(long)]
    tolerance: Option<f32>,

    /// Also score windows cut short by the end of the audio
    #[arg(long)]
    keep_short_windows: bool,

    /// Reject input at any other sample rate
    #[arg(long)]
    sample_rate: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("No pitch detected in {}", .0.display())]
    UndetectedPitch(PathBuf),

    #[error("No periodic grain found at {:.2} Hz in {}", .freq, .path.display())]
    NoCandidate { path: PathBuf, freq: f32 },
}

impl AnalysisArgs {
    /// Loads the configuration file and applies command line overrides on top.
    fn resolve(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config_from(path)?,
            None => config::load_config()?,
        };

        if let Some(channel) = self.channel {
            config.input.channel = channel;
            config.input.mix = false;
        }
        if self.mix {
            config.input.mix = true;
        }
        if let Some(start_time) = self.start_time {
            config.input.start_time = start_time;
        }
        if let Some(duration) = self.duration {
            config.input.duration = duration;
        }
        if let Some(sample_rate) = self.sample_rate {
            config.input.required_sample_rate = Some(sample_rate);
        }
        if let Some(min_freq) = self.min_freq {
            config.pitch.min_freq = min_freq;
        }
        if let Some(max_freq) = self.max_freq {
            config.pitch.max_freq = max_freq;
        }
        if let Some(threshold) = self.threshold {
            config.pitch.threshold = threshold;
        }
        if let Some(periods) = self.periods {
            config.grain.num_periods = periods;
        }
        if let Some(tolerance) = self.tolerance {
            config.grain.band_tolerance = tolerance;
        }
        if self.keep_short_windows {
            config.grain.keep_short_windows = true;
        }

        Ok(config)
    }
}

fn check_input_exists(path: &Path) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::Audio(AudioError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("WAV file not found: {}", path.display()),
        ))));
    }
    Ok(())
}

/// Reads the configured channel and time range, enforcing any required sample rate.
fn load_buffer(path: &Path, config: &Config) -> Result<AudioBuffer, CliError> {
    check_input_exists(path)?;
    let wav = audio::read_wav_file(path)?;
    let buffer = wav.to_buffer(
        config.channel_selection(),
        config.input.start_time,
        Some(config.input.duration),
    )?;
    if let Some(expected) = config.input.required_sample_rate {
        if buffer.sample_rate() != expected {
            return Err(AnalysisError::SampleRateMismatch {
                expected,
                actual: buffer.sample_rate(),
            }
            .into());
        }
    }
    Ok(buffer)
}

fn run_pitch_command(args: &PitchArgs) -> Result<(), CliError> {
    let config = args.analysis.resolve()?;
    let buffer = load_buffer(&args.wav_file, &config)?;
    let settings = config.analysis_settings();

    match analysis::detect_pitch(buffer.samples(), buffer.sample_rate(), &settings.pitch)? {
        PitchEstimate::Detected(freq) => println!("{:.2}", freq),
        PitchEstimate::Undetected => println!("undetected"),
    }
    Ok(())
}

fn run_grain_command(args: &GrainArgs) -> Result<(), CliError> {
    let config = args.analysis.resolve()?;
    let buffer = load_buffer(&args.wav_file, &config)?;
    let settings = config.analysis_settings();

    let grain = match args.freq {
        Some(freq) => {
            analysis::extract_grain(buffer.samples(), buffer.sample_rate(), freq, &settings.grain)?
                .ok_or_else(|| CliError::NoCandidate {
                    path: args.wav_file.clone(),
                    freq,
                })?
        }
        None => {
            let result = analysis::analyze_buffer(&buffer, &settings)?;
            let freq = result
                .pitch
                .frequency()
                .ok_or_else(|| CliError::UndetectedPitch(args.wav_file.clone()))?;
            result.grain.ok_or_else(|| CliError::NoCandidate {
                path: args.wav_file.clone(),
                freq,
            })?
        }
    };

    audio::write_wav_file(&args.output, grain.sample_rate, &grain.samples)?;
    if let Some(plot_path) = &args.plot {
        let title = batch::grain_file_stem(
            &args.wav_file.file_stem().unwrap_or_default().to_string_lossy(),
            grain.frequency,
        );
        plot::write_plot(plot_path, &grain.samples, &title)?;
    }

    println!(
        "{:.2} Hz: {} samples from index {} (periodicity {:.4}) -> {}",
        grain.frequency,
        grain.len(),
        grain.start,
        grain.score,
        args.output.display()
    );
    Ok(())
}

fn run_batch_command(args: &BatchArgs) -> Result<(), CliError> {
    let mut config = args.analysis.resolve()?;
    if let Some(source) = &args.source {
        config.paths.source_dir = source.clone();
    }
    if let Some(dest) = &args.dest {
        config.paths.dest_dir = dest.clone();
    }
    if args.no_plot {
        config.output.plot = false;
    }

    let report = batch::run_batch(&config)?;

    for (path, outcome) in &report.files {
        match outcome {
            FileOutcome::Extracted(record) => println!(
                "{} -> {} ({:.2} Hz, periodicity {:.4})",
                path.display(),
                record.grain_path.display(),
                record.pitch,
                record.score
            ),
            FileOutcome::Skipped(reason) => println!("{} skipped: {}", path.display(), reason),
        }
    }
    println!(
        "Extracted {} grain(s), skipped {} file(s)",
        report.extracted().count(),
        report.skipped().count()
    );
    Ok(())
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Pitch(args) => run_pitch_command(args)?,
        Commands::Grain(args) => run_grain_command(args)?,
        Commands::Batch(args) => run_batch_command(args)?,
    }

    Ok(())
}

fn main() {
    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grain_extractor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(err) = run() {
        eprintln!("\nERROR: {}\n", err);
        match &err {
            CliError::Audio(AudioError::Io(io_err)) if io_err.kind() == io::ErrorKind::NotFound => {
                eprintln!("Please check that:");
                eprintln!("1. The file path is correct");
                eprintln!("2. The file exists");
                eprintln!("3. You have permission to read the file");
            }
            CliError::Batch(BatchError::ReadDir { .. }) => {
                eprintln!("Set [paths] source_dir in config.toml or pass --source.");
            }
            _ => {}
        }
        process::exit(1);
    }
}
