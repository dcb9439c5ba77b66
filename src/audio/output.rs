// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device at its default configuration and pulls
//! f32 frames from a render callback, converting to the device's sample
//! format.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{error, info};

use super::AudioError;

/// Audio output configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of output channels
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
        }
    }
}

/// Audio output stream
///
/// The cpal stream is not `Send` on every platform, so an `AudioOutput` must
/// stay on the thread that opened it.
pub struct AudioOutput {
    /// cpal stream
    _stream: Stream,
    /// Output device
    _device: Device,
    /// Negotiated configuration
    config: AudioConfig,
}

impl AudioOutput {
    /// Open the default output device and start pulling frames from `callback`.
    ///
    /// The callback receives an interleaved buffer, already zeroed, and the
    /// channel count.
    pub fn open<F>(callback: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::InitFailed(format!("Failed to get default config: {}", e)))?;

        let sample_format = supported.sample_format();
        let stream_config = supported.config();
        let config = AudioConfig {
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32, _>(&device, &stream_config, callback)?,
            SampleFormat::I16 => build_stream::<i16, _>(&device, &stream_config, callback)?,
            SampleFormat::U16 => build_stream::<u16, _>(&device, &stream_config, callback)?,
            other => {
                return Err(AudioError::InvalidConfig(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream
            .play()
            .map_err(|e| AudioError::StreamFailed(format!("Failed to start stream: {}", e)))?;

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate = config.sample_rate,
            channels = config.channels,
            "audio output started"
        );

        Ok(Self {
            _stream: stream,
            _device: device,
            config,
        })
    }

    /// Get negotiated configuration
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }
}

fn build_stream<T, F>(
    device: &Device,
    config: &StreamConfig,
    mut callback: F,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
    F: FnMut(&mut [f32], usize) + Send + 'static,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.clear();
                scratch.resize(data.len(), 0.0);
                callback(&mut scratch, channels);
                for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                    *out = T::from_sample(*sample);
                }
            },
            move |err| {
                error!("Audio stream error: {}", err);
            },
            None, // No timeout
        )
        .map_err(|e| AudioError::StreamFailed(format!("Failed to build stream: {}", e)))
}
