use super::types::{AudioError, WavData};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Read;
use std::path::Path;

/// Reads and parses a WAV file, converting samples to normalized f32 values.
///
/// This function supports the following WAV formats:
/// - 32-bit float
/// - 16-bit integer
/// - 24-bit integer
/// - 32-bit integer
///
/// All integer formats are normalized to the [-1, 1] range.
///
/// # Arguments
/// * `path` - Path to the WAV file to read
///
/// # Returns
/// * `Result<WavData, AudioError>` - Parsed WAV data or an error
///
/// # Errors
/// * If the file cannot be read
/// * If the WAV format is unsupported
/// * If there's an error during sample conversion
pub fn read_wav_file(path: &Path) -> Result<WavData, AudioError> {
    let reader = WavReader::open(path).map_err(|e| AudioError::WavParse(e.to_string()))?;
    let spec = reader.spec();

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => decode_samples::<f32, _>(reader, 1.0)?,
        (SampleFormat::Int, 16) => decode_samples::<i16, _>(reader, 32768.0)?,
        (SampleFormat::Int, 24) => decode_samples::<i32, _>(reader, 8388608.0)?,
        (SampleFormat::Int, 32) => decode_samples::<i32, _>(reader, 2147483648.0)?,
        (format, bits) => {
            return Err(AudioError::WavParse(format!(
                "Unsupported WAV format: {:?} {}-bit",
                format, bits
            )))
        }
    };

    Ok(WavData {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Writes mono samples as a 32-bit float WAV file.
///
/// # Arguments
/// * `path` - Destination path; an existing file is overwritten
/// * `sample_rate` - Sample rate in Hz
/// * `samples` - Mono samples, expected in [-1, 1]
///
/// # Errors
/// * If the file cannot be created or the samples cannot be encoded
pub fn write_wav_file(path: &Path, sample_rate: u32, samples: &[f32]) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer =
        WavWriter::create(path, spec).map_err(|e| AudioError::WavWrite(e.to_string()))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| AudioError::WavWrite(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::WavWrite(e.to_string()))
}

/// Decodes every sample and divides by `full_scale` to land in [-1, 1].
fn decode_samples<T, R>(reader: WavReader<R>, full_scale: f64) -> Result<Vec<f32>, AudioError>
where
    T: hound::Sample + Into<f64>,
    R: Read,
{
    reader
        .into_samples::<T>()
        .map(|s| {
            s.map(|value| (value.into() / full_scale) as f32)
                .map_err(|e| AudioError::WavParse(e.to_string()))
        })
        .collect()
}
