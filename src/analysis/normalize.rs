/// Linearly remaps samples so the minimum becomes -1 and the maximum +1.
///
/// A constant buffer has no range to map from; it comes back as all zeros
/// rather than a buffer of NaNs. The same applies if the range is not finite.
pub fn normalize(samples: &[f32]) -> Vec<f32> {
    let (min, max) = samples
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    let range = max - min;

    if !(range.is_finite() && range > 0.0) {
        return vec![0.0; samples.len()];
    }

    samples
        .iter()
        .map(|&s| (s - min) / range * 2.0 - 1.0)
        .collect()
}
