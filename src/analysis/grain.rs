use super::autocorrelation::{Autocorrelation, Autocorrelator};
use super::normalize::normalize;
use super::types::{AnalysisError, Grain, GrainCandidate, GrainConfig, ShortWindowPolicy};
use std::ops::Range;
use tracing::debug;

/// Extracts the most periodic zero-crossing aligned window from `samples`.
///
/// This function performs the following steps:
/// 1. Validates the target frequency and grain parameters
/// 2. Normalizes the buffer to [-1, 1]
/// 3. Derives the window length (`num_periods` periods) and the lag band
///    (`target_freq ± band_tolerance`) from the sample rate
/// 4. Scores a window starting at every zero crossing
/// 5. Keeps the first candidate with the strictly highest positive score
///
/// The target frequency must be a concrete estimate; an undetected pitch has
/// to be handled by the caller before getting here.
///
/// # Arguments
/// * `samples` - Mono samples to search
/// * `sample_rate` - Sample rate in Hz
/// * `target_freq` - Fundamental frequency the grain should repeat at (Hz)
/// * `config` - Grain length, band tolerance and short window policy
///
/// # Returns
/// * `Ok(Some(Grain))` - The best window, with normalized samples
/// * `Ok(None)` - No zero crossings, or no window with a positive score
///
/// # Errors
/// * If the buffer is empty or the sample rate is zero
/// * If the target frequency is not positive and finite
/// * If the window length or lag band come out empty
pub fn extract_grain(
    samples: &[f32],
    sample_rate: u32,
    target_freq: f32,
    config: &GrainConfig,
) -> Result<Option<Grain>, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::EmptyBuffer);
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidSampleRate);
    }

    let window_len = window_len(sample_rate, target_freq, config.num_periods)?;
    let band = lag_band(sample_rate, target_freq, config.band_tolerance)?;
    if band.start >= window_len {
        return Err(AnalysisError::Configuration(format!(
            "A {}-sample grain cannot contain lag {} of the {:.1} Hz band",
            window_len, band.start, target_freq
        )));
    }

    let normalized = normalize(samples);
    let crossings = zero_crossings(&normalized);
    let mut autocorrelator = Autocorrelator::new();

    let candidates = crossings.iter().filter_map(|&start| {
        let end = (start + window_len).min(normalized.len());
        if end - start < window_len && config.short_windows == ShortWindowPolicy::Discard {
            return None;
        }
        let autocorr = autocorrelator.compute(&normalized[start..end]);
        band_peak(&autocorr, band.clone()).map(|score| GrainCandidate {
            start,
            len: end - start,
            score,
        })
    });

    let best = select_best(candidates);

    debug!(
        crossings = crossings.len(),
        window_len,
        band_start = band.start,
        band_end = band.end,
        "Grain search finished"
    );

    Ok(best.map(|candidate| Grain {
        samples: normalized[candidate.start..candidate.start + candidate.len].to_vec(),
        start: candidate.start,
        score: candidate.score,
        sample_rate,
        frequency: target_freq,
    }))
}

/// Reduces scored candidates to the best one.
///
/// The search starts from a sentinel with score 0, so a candidate must score
/// strictly above 0 to be selected at all. A later candidate only replaces the
/// current best when its score is strictly greater; on ties the earliest wins.
pub fn select_best<I>(candidates: I) -> Option<GrainCandidate>
where
    I: IntoIterator<Item = GrainCandidate>,
{
    candidates.into_iter().fold(None, |best, candidate| {
        let to_beat = best.map_or(0.0, |b: GrainCandidate| b.score);
        if candidate.score > to_beat {
            Some(candidate)
        } else {
            best
        }
    })
}

/// Returns every index `i` where the sign of `samples[i]` differs from the
/// sign of `samples[i + 1]`. Zero counts as its own sign.
pub fn zero_crossings(samples: &[f32]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| sign(pair[0]) != sign(pair[1]))
        .map(|(i, _)| i)
        .collect()
}

/// Periodicity score of a window over a lag band.
///
/// The score is the highest normalized autocorrelation in `band`, after
/// clipping the band to the window length. It never leaves [-1, 1]. Returns `None` for a
/// silent window or when nothing of the band fits in the window.
pub fn periodicity_score(window: &[f32], band: Range<usize>) -> Option<f32> {
    let autocorr = Autocorrelator::new().compute(window);
    band_peak(&autocorr, band)
}

/// Number of samples spanning `num_periods` periods of `freq`, rounded down.
pub fn window_len(
    sample_rate: u32,
    freq: f32,
    num_periods: u32,
) -> Result<usize, AnalysisError> {
    if !freq.is_finite() || freq <= 0.0 {
        return Err(AnalysisError::InvalidFrequency(freq));
    }
    if num_periods == 0 {
        return Err(AnalysisError::Configuration(
            "A grain needs at least one period".to_string(),
        ));
    }

    let len = (num_periods as f64 * sample_rate as f64 / freq as f64) as usize;
    if len < 2 {
        return Err(AnalysisError::Configuration(format!(
            "{} period(s) of {:.1} Hz is shorter than two samples at {} Hz",
            num_periods, freq, sample_rate
        )));
    }
    Ok(len)
}

/// Half-open lag band covering `freq - tolerance .. freq + tolerance`.
///
/// # Errors
/// * If `freq` is not positive and finite
/// * If `tolerance` is negative or reaches down to 0 Hz
/// * If the band maps to lag 0 or to no lags at all
pub fn lag_band(
    sample_rate: u32,
    freq: f32,
    tolerance: f32,
) -> Result<Range<usize>, AnalysisError> {
    if !freq.is_finite() || freq <= 0.0 {
        return Err(AnalysisError::InvalidFrequency(freq));
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(AnalysisError::Configuration(format!(
            "Band tolerance must be a non-negative number of Hz, got {}",
            tolerance
        )));
    }
    if freq <= tolerance {
        return Err(AnalysisError::Configuration(format!(
            "Target frequency {:.1} Hz must exceed the band tolerance of {:.1} Hz",
            freq, tolerance
        )));
    }

    let sr = sample_rate as f64;
    let start = (sr / (freq + tolerance) as f64) as usize;
    let end = (sr / (freq - tolerance) as f64) as usize;

    if start == 0 || start >= end {
        return Err(AnalysisError::Configuration(format!(
            "Band {:.1} ± {:.1} Hz maps to an empty lag band at {} Hz",
            freq, tolerance, sample_rate
        )));
    }
    Ok(start..end)
}

fn band_peak(autocorr: &Autocorrelation, band: Range<usize>) -> Option<f32> {
    let end = band.end.min(autocorr.len());
    (band.start..end)
        .filter_map(|k| autocorr.normalized(k))
        .reduce(f32::max)
}

fn sign(x: f32) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}
