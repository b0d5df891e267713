/// Audio I/O for reading source samples and writing grains.
///
/// This module provides functionality to:
/// - Read and parse WAV files of common integer and float formats
/// - Reduce a multi-channel file to a mono buffer over a time range
/// - Write grains back out as mono float WAV files
mod types;
mod wav;

pub use types::{AudioError, ChannelSelection, WavData};
pub use wav::{read_wav_file, write_wav_file};
