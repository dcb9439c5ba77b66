// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio engine for drum808.
//!
//! This module provides:
//! - WAV sample decoding via hound
//! - A voice mixer summing concurrently playing samples
//! - Audio output via cpal
//! - The process-wide output device, opened lazily on first use
//!
//! # Device reset
//!
//! There is one output device per process. `AudioDevice::reset` drops every
//! queued voice, silencing anything still playing. Each audio sink resets the
//! device when it is constructed, so building a new sink stops all sounds
//! started by earlier sinks.

pub mod mixer;
pub mod output;
pub mod sample;

pub use mixer::{Mixer, VoiceId};
pub use output::{AudioConfig, AudioOutput};
pub use sample::{decode_wav, DecodedSample};

use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

static GLOBAL_DEVICE: OnceLock<Result<Arc<AudioDevice>, AudioError>> = OnceLock::new();

/// Shared output device and its mixer
#[derive(Debug)]
pub struct AudioDevice {
    /// Voices rendered by the output stream
    mixer: Arc<Mutex<Mixer>>,
    /// Signalled whenever voices finish or are cleared
    finished: Arc<Condvar>,
    /// Negotiated output configuration
    config: AudioConfig,
}

impl AudioDevice {
    /// The process-wide output device, opened on first call.
    ///
    /// The cpal stream is owned by a dedicated thread for the life of the
    /// process. An open failure is cached and returned to every caller.
    pub fn global() -> Result<Arc<AudioDevice>, AudioError> {
        GLOBAL_DEVICE
            .get_or_init(|| Self::open().map(Arc::new))
            .clone()
    }

    /// A device with no output stream; voices only advance through `render`.
    pub fn detached(config: AudioConfig) -> Self {
        Self {
            mixer: Arc::new(Mutex::new(Mixer::new())),
            finished: Arc::new(Condvar::new()),
            config,
        }
    }

    fn open() -> Result<Self, AudioError> {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let finished = Arc::new(Condvar::new());
        let render_mixer = Arc::clone(&mixer);
        let render_finished = Arc::clone(&finished);
        let (ready_tx, ready_rx) = mpsc::channel();

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let opened = AudioOutput::open(move |buffer, channels| {
                    if let Ok(mut mixer) = render_mixer.lock() {
                        if mixer.render(buffer, channels) > 0 {
                            render_finished.notify_all();
                        }
                    }
                });

                match opened {
                    Ok(output) => {
                        let _ = ready_tx.send(Ok(output.config().clone()));
                        // Keep the stream alive for the rest of the process
                        let _output = output;
                        loop {
                            thread::park();
                        }
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .map_err(|e| AudioError::InitFailed(format!("Failed to spawn audio thread: {}", e)))?;

        let config = ready_rx
            .recv()
            .map_err(|_| AudioError::InitFailed("audio thread exited".to_string()))??;

        Ok(Self {
            mixer,
            finished,
            config,
        })
    }

    /// Stop all sounds: drop every queued voice
    pub fn reset(&self) {
        if let Ok(mut mixer) = self.mixer.lock() {
            debug!(voices = mixer.len(), "audio device reset");
            mixer.clear();
            self.finished.notify_all();
        }
    }

    /// Queue `samples` together and return a guard owning their voices
    pub fn play(&self, samples: &[DecodedSample]) -> Result<VoiceGuard<'_>, AudioError> {
        let mut mixer = self.mixer.lock().map_err(|_| AudioError::LockFailed)?;
        let voices = samples
            .iter()
            .map(|s| mixer.add(s, self.config.sample_rate))
            .collect();
        Ok(VoiceGuard {
            device: self,
            voices,
        })
    }

    /// Render one buffer by hand (detached devices and tests)
    pub fn render(&self, buffer: &mut [f32]) {
        if let Ok(mut mixer) = self.mixer.lock() {
            if mixer.render(buffer, self.config.channels as usize) > 0 {
                self.finished.notify_all();
            }
        }
    }

    /// Number of queued voices
    pub fn active_voices(&self) -> usize {
        self.mixer.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn release(&self, ids: &[VoiceId]) {
        if let Ok(mut mixer) = self.mixer.lock() {
            mixer.remove(ids);
        }
    }
}

/// Voices queued by one dispatch; released when dropped
#[derive(Debug)]
pub struct VoiceGuard<'a> {
    device: &'a AudioDevice,
    voices: Vec<VoiceId>,
}

impl VoiceGuard<'_> {
    /// Block until every voice has finished or `timeout` elapses.
    ///
    /// Returns `true` if the voices finished.
    ///
    /// Sleeps on the device's condition variable, which renders signal when
    /// voices finish, so the mixer lock is only taken to re-check.
    pub fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let Ok(mut mixer) = self.device.mixer.lock() else {
            return true;
        };

        loop {
            if !self.voices.iter().any(|&id| mixer.is_playing(id)) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            mixer = match self.device.finished.wait_timeout(mixer, deadline - now) {
                Ok((mixer, _)) => mixer,
                Err(_) => return true,
            };
        }
    }

    /// Voices owned by this guard
    pub fn voices(&self) -> &[VoiceId] {
        &self.voices
    }
}

impl Drop for VoiceGuard<'_> {
    fn drop(&mut self) {
        self.device.release(&self.voices);
    }
}

/// Audio error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    /// Failed to initialize audio
    #[error("Audio initialization failed: {0}")]
    InitFailed(String),
    /// Failed to start audio stream
    #[error("Audio stream failed: {0}")]
    StreamFailed(String),
    /// Failed to decode a sample file
    #[error("Sample decode failed: {0}")]
    Decode(String),
    /// Failed to acquire lock
    #[error("Failed to acquire audio lock")]
    LockFailed,
    /// No audio device available
    #[error("No audio device available")]
    NoDevice,
    /// Invalid configuration
    #[error("Invalid audio configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(frames: usize) -> DecodedSample {
        DecodedSample {
            name: "click".to_string(),
            data: vec![0.5; frames].into(),
            sample_rate: 100,
            channels: 1,
        }
    }

    fn detached() -> AudioDevice {
        AudioDevice::detached(AudioConfig {
            sample_rate: 100,
            channels: 1,
        })
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let device = detached();
        {
            let guard = device.play(&[click(1000), click(1000)]).unwrap();
            assert_eq!(guard.voices().len(), 2);
            assert_eq!(device.active_voices(), 2);
        }
        assert_eq!(device.active_voices(), 0);
    }

    #[test]
    fn test_wait_returns_when_rendered() {
        let device = detached();
        let guard = device.play(&[click(4)]).unwrap();

        let mut buffer = vec![0.0; 8];
        device.render(&mut buffer);

        assert!(guard.wait(Duration::from_millis(100)));
    }

    #[test]
    fn test_wait_times_out_without_output() {
        let device = detached();
        let guard = device.play(&[click(4)]).unwrap();

        let start = Instant::now();
        assert!(!guard.wait(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_wakes_when_another_thread_renders() {
        let device = Arc::new(detached());
        let guard = device.play(&[click(4)]).unwrap();

        let render_device = Arc::clone(&device);
        let renderer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut buffer = vec![0.0; 8];
            render_device.render(&mut buffer);
        });

        let start = Instant::now();
        assert!(guard.wait(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
        renderer.join().unwrap();
    }

    #[test]
    fn test_wait_wakes_on_reset() {
        let device = Arc::new(detached());
        let guard = device.play(&[click(1000)]).unwrap();

        let reset_device = Arc::clone(&device);
        let resetter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            reset_device.reset();
        });

        let start = Instant::now();
        assert!(guard.wait(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
        resetter.join().unwrap();
    }

    #[test]
    fn test_reset_stops_all_sounds() {
        let device = detached();
        let guard = device.play(&[click(1000)]).unwrap();
        assert_eq!(device.active_voices(), 1);

        device.reset();
        assert_eq!(device.active_voices(), 0);
        assert!(guard.wait(Duration::from_millis(10)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(AudioError::NoDevice.to_string(), "No audio device available");
        assert_eq!(
            AudioError::Decode("x.WAV".to_string()).to_string(),
            "Sample decode failed: x.WAV"
        );
    }
}
