// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! WAV sample decoding.

use std::path::Path;
use std::sync::Arc;

use hound::{SampleFormat, WavReader};

use super::AudioError;

/// A decoded sample, interleaved f32 frames in [-1.0, 1.0]
#[derive(Debug, Clone)]
pub struct DecodedSample {
    /// File name the sample was decoded from
    pub name: String,
    /// Interleaved samples
    pub data: Arc<[f32]>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count
    pub channels: u16,
}

impl DecodedSample {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.data.len() / self.channels as usize
        }
    }
}

/// Decode a WAV file into f32 samples.
///
/// Integer formats of any bit depth and 32-bit float are accepted.
pub fn decode_wav(path: &Path) -> Result<DecodedSample, AudioError> {
    let reader = WavReader::open(path)
        .map_err(|e| AudioError::Decode(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(AudioError::Decode(format!("{}: no channels", path.display())));
    }

    let data: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| AudioError::Decode(format!("{}: {}", path.display(), e)))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| AudioError::Decode(format!("{}: {}", path.display(), e)))?
        }
    };

    Ok(DecodedSample {
        name: path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        data: data.into(),
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}
