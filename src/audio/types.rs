use crate::analysis::{AnalysisError, AudioBuffer};

/// Represents the data from a WAV file after reading
#[derive(Debug, Clone)]
pub struct WavData {
    /// Interleaved samples normalized to [-1, 1] range
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of audio channels
    pub channels: u16,
}

/// Which channel of a multi-channel file feeds the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelection {
    /// A single channel, zero-based
    Index(u16),
    /// The average of all channels
    Mix,
}

impl Default for ChannelSelection {
    fn default() -> Self {
        ChannelSelection::Index(0)
    }
}

/// Errors that can occur during audio I/O
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// IO errors when reading/writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors during WAV file parsing
    #[error("WAV parsing error: {0}")]
    WavParse(String),

    /// Errors while encoding a WAV file
    #[error("WAV writing error: {0}")]
    WavWrite(String),

    /// Invalid parameter values
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The extracted buffer could not be analyzed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl WavData {
    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    /// Extracts one channel over a time range as a mono buffer.
    ///
    /// # Arguments
    /// * `channel` - Channel to keep, or a mix of all channels
    /// * `start_time` - Position in seconds of the first sample
    /// * `duration` - Length in seconds; `None` or a range running past the end
    ///   of the file is clipped to the available audio
    ///
    /// # Errors
    /// * If the channel index does not exist
    /// * If the start time is negative or beyond the end of the file
    /// * If the resulting range holds no samples
    pub fn to_buffer(
        &self,
        channel: ChannelSelection,
        start_time: f32,
        duration: Option<f32>,
    ) -> Result<AudioBuffer, AudioError> {
        let channels = self.channels as usize;
        if channels == 0 {
            return Err(AudioError::WavParse("File declares zero channels".to_string()));
        }
        if let ChannelSelection::Index(index) = channel {
            if index as usize >= channels {
                return Err(AudioError::InvalidParams(format!(
                    "Channel {} requested but the file only has {} channel(s)",
                    index, channels
                )));
            }
        }

        let total_frames = self.frames();
        let file_duration = self.duration();
        if !(start_time >= 0.0 && start_time < file_duration) {
            return Err(AudioError::InvalidParams(format!(
                "Start time ({:.2}s) is outside the audio duration ({:.2}s)",
                start_time, file_duration
            )));
        }

        let sample_rate = self.sample_rate as f32;
        let start = (start_time * sample_rate) as usize;
        let end = match duration {
            Some(seconds) if seconds > 0.0 => {
                (start + (seconds * sample_rate) as usize).min(total_frames)
            }
            Some(seconds) => {
                return Err(AudioError::InvalidParams(format!(
                    "Duration must be positive, got {:.3}s",
                    seconds
                )))
            }
            None => total_frames,
        };

        let mono: Vec<f32> = (start..end)
            .map(|frame| {
                let offset = frame * channels;
                match channel {
                    ChannelSelection::Index(index) => self.samples[offset + index as usize],
                    ChannelSelection::Mix => {
                        let sum: f32 = self.samples[offset..offset + channels].iter().sum();
                        sum / channels as f32
                    }
                }
            })
            .collect();

        Ok(AudioBuffer::new(mono, self.sample_rate)?)
    }
}
