//! Pitch detection and periodic grain extraction for wavetable synthesis.
//!
//! The [`analysis`] module holds the numeric core (normalization, FFT-based
//! autocorrelation, pitch detection and grain selection). The remaining modules
//! are thin collaborators: WAV I/O in [`audio`], SVG rendering in [`plot`],
//! the directory driver in [`batch`] and `config.toml` handling in [`config`].
pub mod analysis;
pub mod audio;
pub mod batch;
pub mod config;
pub mod plot;
