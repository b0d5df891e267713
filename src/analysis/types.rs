/// Outcome of a pitch search over one buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    /// Fundamental frequency in Hz
    Detected(f32),
    /// No lag in the search range cleared the periodicity threshold
    Undetected,
}

impl PitchEstimate {
    /// Returns the detected frequency, if any.
    pub fn frequency(&self) -> Option<f32> {
        match *self {
            PitchEstimate::Detected(freq) => Some(freq),
            PitchEstimate::Undetected => None,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, PitchEstimate::Detected(_))
    }
}

/// A single channel of samples at a known sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Creates a buffer, rejecting empty sample data and a zero sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::EmptyBuffer);
        }
        if sample_rate == 0 {
            return Err(AnalysisError::InvalidSampleRate);
        }
        Ok(AudioBuffer {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true, construction rejects empty sample data.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Parameters for the autocorrelation pitch search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchConfig {
    /// Lowest plausible fundamental (Hz)
    pub min_freq: f32,
    /// Highest plausible fundamental (Hz)
    pub max_freq: f32,
    /// Fraction of zero-lag energy the peak must exceed
    pub threshold: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        PitchConfig {
            min_freq: 200.0,
            max_freq: 1000.0,
            threshold: 0.7,
        }
    }
}

/// What to do with candidate windows cut short by the end of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortWindowPolicy {
    /// Only full-length windows are scored
    #[default]
    Discard,
    /// Truncated windows are scored alongside full-length ones
    Keep,
}

/// Parameters for grain selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainConfig {
    /// Number of fundamental periods per grain
    pub num_periods: u32,
    /// Half-width (Hz) of the frequency band searched for the period peak
    pub band_tolerance: f32,
    pub short_windows: ShortWindowPolicy,
}

impl Default for GrainConfig {
    fn default() -> Self {
        GrainConfig {
            num_periods: 4,
            band_tolerance: 20.0,
            short_windows: ShortWindowPolicy::Discard,
        }
    }
}

/// A zero-crossing aligned window and its periodicity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrainCandidate {
    pub start: usize,
    pub len: usize,
    pub score: f32,
}

/// The selected grain
#[derive(Debug, Clone, PartialEq)]
pub struct Grain {
    /// Normalized samples of the winning window
    pub samples: Vec<f32>,
    /// Index of the first sample in the source buffer
    pub start: usize,
    pub score: f32,
    pub sample_rate: u32,
    /// Frequency the window length and lag band were derived from
    pub frequency: f32,
}

impl Grain {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Errors raised before any numeric search runs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// Search range or grain parameters are unusable for this buffer
    #[error("Invalid analysis configuration: {0}")]
    Configuration(String),

    /// Target frequency is not a positive finite number
    #[error("Invalid target frequency: {0} Hz")]
    InvalidFrequency(f32),

    #[error("Audio buffer is empty")]
    EmptyBuffer,

    #[error("Sample rate must be positive")]
    InvalidSampleRate,

    #[error("Sample rate mismatch: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch { expected: u32, actual: u32 },
}
