use rustfft::{num_complex::Complex, FftPlanner};

/// Autocorrelation of a signal, indexed by lag.
///
/// Holds one value per lag in `0..signal.len()`. Lag 0 is the signal energy.
#[derive(Debug, Clone, PartialEq)]
pub struct Autocorrelation {
    values: Vec<f32>,
    /// Running sum of squared samples, `cumulative_energy[i]` covers `0..i`
    cumulative_energy: Vec<f64>,
}

impl Autocorrelation {
    /// Zero-lag value, i.e. the sum of squared samples
    pub fn energy(&self) -> f32 {
        self.values.first().copied().unwrap_or(0.0)
    }

    pub fn lag(&self, k: usize) -> Option<f32> {
        self.values.get(k).copied()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Normalized cross-correlation between the signal and itself shifted by `k`.
    ///
    /// `r[k]` is divided by the geometric mean of the energies of the two
    /// overlapping segments, `signal[..n - k]` and `signal[k..]`, so the result
    /// lies in [-1, 1] for any lag. A perfectly periodic signal scores 1.0 at
    /// its period. Returns `None` for a lag outside the signal or when either
    /// segment is silent.
    pub fn normalized(&self, k: usize) -> Option<f32> {
        let n = self.values.len();
        if k >= n {
            return None;
        }
        let head = self.cumulative_energy[n - k];
        let tail = self.cumulative_energy[n] - self.cumulative_energy[k];
        let denominator = (head * tail).sqrt();
        if denominator <= 0.0 {
            return None;
        }
        Some((self.values[k] as f64 / denominator).clamp(-1.0, 1.0) as f32)
    }
}

/// FFT-based autocorrelation with a plan cache.
///
/// Reusing one `Autocorrelator` across many windows of the same length avoids
/// re-planning the transform; results match [`autocorrelate`] exactly.
pub struct Autocorrelator {
    planner: FftPlanner<f32>,
}

impl Default for Autocorrelator {
    fn default() -> Self {
        Self::new()
    }
}

impl Autocorrelator {
    pub fn new() -> Self {
        Autocorrelator {
            planner: FftPlanner::new(),
        }
    }

    /// Computes the linear autocorrelation of `signal`.
    ///
    /// The signal is zero-padded to a power of two of at least `2 * len - 1`
    /// samples, so no lag wraps around and no input sample is dropped.
    pub fn compute(&mut self, signal: &[f32]) -> Autocorrelation {
        if signal.is_empty() {
            return Autocorrelation {
                values: Vec::new(),
                cumulative_energy: vec![0.0],
            };
        }

        let fft_len = transform_len(signal.len());
        let forward = self.planner.plan_fft_forward(fft_len);
        let inverse = self.planner.plan_fft_inverse(fft_len);

        let mut buffer: Vec<Complex<f32>> = signal
            .iter()
            .map(|&x| Complex::new(x, 0.0))
            .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
            .take(fft_len)
            .collect();

        forward.process(&mut buffer);

        // Spectrum times its own conjugate is the power spectrum
        buffer
            .iter_mut()
            .for_each(|bin| *bin = Complex::new(bin.norm_sqr(), 0.0));

        inverse.process(&mut buffer);

        // rustfft leaves the inverse unscaled
        let scale = 1.0 / fft_len as f32;
        let values = buffer
            .iter()
            .take(signal.len())
            .map(|c| c.re * scale)
            .collect();

        let cumulative_energy = std::iter::once(0.0)
            .chain(signal.iter().scan(0.0_f64, |sum, &x| {
                *sum += x as f64 * x as f64;
                Some(*sum)
            }))
            .collect();

        Autocorrelation {
            values,
            cumulative_energy,
        }
    }
}

/// Computes the autocorrelation of `signal` with a fresh planner.
pub fn autocorrelate(signal: &[f32]) -> Autocorrelation {
    Autocorrelator::new().compute(signal)
}

/// Transform length used for a signal of `len` samples.
pub fn transform_len(len: usize) -> usize {
    (2 * len).saturating_sub(1).max(1).next_power_of_two()
}
