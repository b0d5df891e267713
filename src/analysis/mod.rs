/// Pitch detection and grain selection.
///
/// This module provides functionality to:
/// - Normalize sample buffers to [-1, 1]
/// - Compute FFT-based autocorrelation
/// - Estimate a fundamental frequency from the autocorrelation peak
/// - Select the most periodic zero-crossing aligned window as a grain
mod autocorrelation;
mod grain;
mod normalize;
mod pitch;
mod types;

pub use autocorrelation::{autocorrelate, transform_len, Autocorrelation, Autocorrelator};
pub use grain::{
    extract_grain, lag_band, periodicity_score, select_best, window_len, zero_crossings,
};
pub use normalize::normalize;
pub use pitch::{detect_pitch, lag_range};
pub use types::{
    AnalysisError, AudioBuffer, Grain, GrainCandidate, GrainConfig, PitchConfig, PitchEstimate,
    ShortWindowPolicy,
};

use tracing::debug;

/// Everything needed to take one buffer from samples to grain
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisSettings {
    pub pitch: PitchConfig,
    pub grain: GrainConfig,
    /// Reject buffers at any other rate
    pub required_sample_rate: Option<u32>,
}

/// Result of analyzing one buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub pitch: PitchEstimate,
    /// `None` when the pitch was undetected or no candidate scored above zero
    pub grain: Option<Grain>,
}

/// Detects the pitch of `buffer` and, if one was found, extracts a grain at it.
///
/// # Errors
/// * If `required_sample_rate` is set and differs from the buffer's rate
/// * If either the pitch or grain parameters are invalid for this buffer
pub fn analyze_buffer(
    buffer: &AudioBuffer,
    settings: &AnalysisSettings,
) -> Result<Analysis, AnalysisError> {
    if let Some(expected) = settings.required_sample_rate {
        if buffer.sample_rate() != expected {
            return Err(AnalysisError::SampleRateMismatch {
                expected,
                actual: buffer.sample_rate(),
            });
        }
    }

    let pitch = detect_pitch(buffer.samples(), buffer.sample_rate(), &settings.pitch)?;

    let grain = match pitch {
        PitchEstimate::Detected(freq) => {
            extract_grain(buffer.samples(), buffer.sample_rate(), freq, &settings.grain)?
        }
        PitchEstimate::Undetected => {
            debug!("No pitch detected; skipping grain search");
            None
        }
    };

    Ok(Analysis { pitch, grain })
}
