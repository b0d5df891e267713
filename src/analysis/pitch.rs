use super::autocorrelation::autocorrelate;
use super::types::{AnalysisError, PitchConfig, PitchEstimate};
use std::ops::Range;
use tracing::debug;

/// Estimates the fundamental frequency of `samples` by autocorrelation.
///
/// This function performs the following steps:
/// 1. Converts the frequency range into a lag range (higher frequency, shorter lag)
/// 2. Validates the lag range against the buffer length
/// 3. Computes the autocorrelation
/// 4. Finds the leftmost maximum within the lag range
/// 5. Accepts the peak if it exceeds `threshold` times the zero-lag energy
///
/// # Arguments
/// * `samples` - Mono samples to analyze
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Frequency range and acceptance threshold
///
/// # Returns
/// * `Ok(PitchEstimate::Detected(hz))` - `sample_rate / peak_lag`
/// * `Ok(PitchEstimate::Undetected)` - No lag cleared the threshold (including silence)
///
/// # Errors
/// * If the buffer is empty or the sample rate is zero
/// * If the frequency range or threshold is invalid
/// * If the implied lag range is empty or reaches past the buffer
pub fn detect_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchConfig,
) -> Result<PitchEstimate, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyBuffer);
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidSampleRate);
    }

    let lags = lag_range(sample_rate, config)?;
    if lags.end > samples.len() {
        return Err(AnalysisError::Configuration(format!(
            "Lag range {}..{} needs at least {} samples but the buffer holds {}. Raise min_freq or supply more audio.",
            lags.start,
            lags.end,
            lags.end,
            samples.len()
        )));
    }

    let autocorr = autocorrelate(samples);
    let energy = autocorr.energy();

    let (peak_lag, peak) = autocorr.values()[lags.clone()]
        .iter()
        .enumerate()
        .fold((lags.start, f32::NEG_INFINITY), |(best_lag, best), (i, &v)| {
            if v > best {
                (lags.start + i, v)
            } else {
                (best_lag, best)
            }
        });

    debug!(
        peak_lag,
        peak,
        energy,
        "Autocorrelation peak in lag range {}..{}",
        lags.start,
        lags.end
    );

    if energy > 0.0 && peak > config.threshold * energy {
        Ok(PitchEstimate::Detected(sample_rate as f32 / peak_lag as f32))
    } else {
        Ok(PitchEstimate::Undetected)
    }
}

/// Converts a frequency search range into a half-open lag range.
///
/// # Errors
/// * If the frequencies are not finite and positive, or `max_freq <= min_freq`
/// * If the threshold lies outside `[0, 1]`
/// * If `max_freq` is above the sample rate (lag 0) or the range is empty
pub fn lag_range(sample_rate: u32, config: &PitchConfig) -> Result<Range<usize>, AnalysisError> {
    let PitchConfig {
        min_freq,
        max_freq,
        threshold,
    } = *config;

    if !(min_freq.is_finite() && max_freq.is_finite()) || min_freq <= 0.0 {
        return Err(AnalysisError::Configuration(format!(
            "Frequency range must be positive and finite, got {}..{} Hz",
            min_freq, max_freq
        )));
    }
    if max_freq <= min_freq {
        return Err(AnalysisError::Configuration(format!(
            "max_freq ({:.1} Hz) must be greater than min_freq ({:.1} Hz)",
            max_freq, min_freq
        )));
    }
    if !(0.0..=1.0).contains(&threshold) {
        return Err(AnalysisError::Configuration(format!(
            "Threshold must lie in [0, 1], got {}",
            threshold
        )));
    }

    let sr = sample_rate as f32;
    let start = (sr / max_freq) as usize;
    let end = (sr / min_freq) as usize;

    if start == 0 {
        return Err(AnalysisError::Configuration(format!(
            "max_freq ({:.1} Hz) is at or above the sample rate ({} Hz)",
            max_freq, sample_rate
        )));
    }
    if start >= end {
        return Err(AnalysisError::Configuration(format!(
            "Frequency range {:.1}..{:.1} Hz maps to an empty lag range at {} Hz",
            min_freq, max_freq, sample_rate
        )));
    }

    Ok(start..end)
}
