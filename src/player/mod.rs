// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback sinks.
//!
//! This module provides a trait-based abstraction for rendering triggered
//! notes, allowing the text and audio outputs to be used interchangeably by
//! the tick scheduler.

pub mod sampler;
pub mod text;

pub use sampler::AudioSink;
pub use text::TextSink;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::audio::AudioError;
use crate::sequencer::NoteSet;

/// Trait for note renderers.
///
/// Implementations are called concurrently from several in-flight
/// dispatches and may block for as long as playback takes.
pub trait PlaybackSink: Send + Sync {
    /// Render one step's notes.
    ///
    /// # Arguments
    /// * `notes` - Track names triggered on this step
    ///
    /// # Returns
    /// * `Ok(())` once the notes have been rendered
    /// * `Err` if nothing could be rendered
    fn play(&self, notes: &NoteSet) -> Result<(), SinkError>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Errors raised while rendering notes
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing output failed
    #[error("output write failed: {0}")]
    Io(#[from] std::io::Error),
    /// No sample could be decoded for the step
    #[error("no playable sample: {0}")]
    Decode(String),
    /// The audio device is unusable
    #[error("audio device error: {0}")]
    Device(String),
}

impl From<AudioError> for SinkError {
    fn from(e: AudioError) -> Self {
        match e {
            AudioError::Decode(msg) => SinkError::Decode(msg),
            other => SinkError::Device(other.to_string()),
        }
    }
}

/// Selectable output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Print note names
    #[default]
    Text,
    /// Play 808 samples
    Audio,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "Text"),
            OutputFormat::Audio => write!(f, "Audio"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "audio" => Ok(OutputFormat::Audio),
            _ => anyhow::bail!("Unknown output format: {} (expected text or audio)", s),
        }
    }
}

/// Settings shared by the sink constructors
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    /// Directory holding the 808 WAV files
    pub sound_dir: PathBuf,
    /// Longest time an audio dispatch waits for its samples to finish
    pub hold: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            sound_dir: PathBuf::from(sampler::DEFAULT_SOUND_DIR),
            hold: sampler::DEFAULT_HOLD,
        }
    }
}

/// Create the sink for `format`
pub fn create_sink(
    format: OutputFormat,
    settings: &PlayerSettings,
) -> anyhow::Result<Arc<dyn PlaybackSink>> {
    let sink: Arc<dyn PlaybackSink> = match format {
        OutputFormat::Text => Arc::new(TextSink::stdout()),
        OutputFormat::Audio => Arc::new(AudioSink::new(settings)?),
    };
    Ok(sink)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("Audio".parse::<OutputFormat>().unwrap(), OutputFormat::Audio);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("midi".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Text.to_string(), "Text");
        assert_eq!(OutputFormat::Audio.to_string(), "Audio");
    }

    #[test]
    fn test_factory_text_sink() {
        let sink = create_sink(OutputFormat::Text, &PlayerSettings::default()).unwrap();
        assert_eq!(sink.name(), "text");
    }

    #[test]
    fn test_audio_error_conversion() {
        let err: SinkError = AudioError::Decode("bd".to_string()).into();
        assert!(matches!(err, SinkError::Decode(_)));

        let err: SinkError = AudioError::NoDevice.into();
        assert!(matches!(err, SinkError::Device(_)));
    }
}
