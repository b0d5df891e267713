use crate::analysis::{AnalysisSettings, GrainConfig, PitchConfig, ShortWindowPolicy};
use crate::audio::ChannelSelection;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration for the CLI and the batch driver
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub input: InputConfig,
    pub pitch: PitchSettings,
    pub grain: GrainSettings,
    pub output: OutputConfig,
}

/// Source and destination directories for batch runs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `.wav` files
    pub source_dir: PathBuf,
    /// Directory grains and plots are written to
    pub dest_dir: PathBuf,
}

/// How each source file is reduced to the analyzed buffer
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Zero-based channel to analyze
    pub channel: u16,
    /// Average all channels instead of picking one
    pub mix: bool,
    /// Position in seconds where analysis begins
    pub start_time: f32,
    /// Seconds of audio to analyze
    pub duration: f32,
    /// Skip files at any other sample rate
    pub required_sample_rate: Option<u32>,
}

/// Pitch search range and acceptance threshold
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PitchSettings {
    pub min_freq: f32,
    pub max_freq: f32,
    pub threshold: f32,
}

/// Grain length and scoring parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GrainSettings {
    pub num_periods: u32,
    pub band_tolerance: f32,
    /// Score windows cut short by the end of the buffer
    pub keep_short_windows: bool,
}

/// Output options
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write an SVG plot next to every grain
    pub plot: bool,
}

/// Errors raised while loading the configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            source_dir: PathBuf::from("samples"),
            dest_dir: PathBuf::from("grains"),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            channel: 0,
            mix: false,
            start_time: 1.0,
            duration: 0.5,
            required_sample_rate: None,
        }
    }
}

impl Default for PitchSettings {
    fn default() -> Self {
        let defaults = PitchConfig::default();
        PitchSettings {
            min_freq: defaults.min_freq,
            max_freq: defaults.max_freq,
            threshold: defaults.threshold,
        }
    }
}

impl Default for GrainSettings {
    fn default() -> Self {
        let defaults = GrainConfig::default();
        GrainSettings {
            num_periods: defaults.num_periods,
            band_tolerance: defaults.band_tolerance,
            keep_short_windows: defaults.short_windows == ShortWindowPolicy::Keep,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { plot: true }
    }
}

impl Config {
    /// Parses a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Analysis parameters in the form the analysis functions take
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            pitch: PitchConfig {
                min_freq: self.pitch.min_freq,
                max_freq: self.pitch.max_freq,
                threshold: self.pitch.threshold,
            },
            grain: GrainConfig {
                num_periods: self.grain.num_periods,
                band_tolerance: self.grain.band_tolerance,
                short_windows: if self.grain.keep_short_windows {
                    ShortWindowPolicy::Keep
                } else {
                    ShortWindowPolicy::Discard
                },
            },
            required_sample_rate: self.input.required_sample_rate,
        }
    }

    pub fn channel_selection(&self) -> ChannelSelection {
        if self.input.mix {
            ChannelSelection::Mix
        } else {
            ChannelSelection::Index(self.input.channel)
        }
    }
}

/// Load configuration from `config.toml` in the working directory.
///
/// A missing file is not an error; the defaults are returned instead.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config_from(path)
}

/// Load configuration from an explicit path, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
