// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for drum808.
//!
//! This module provides data structures for loading and validating song
//! beat definitions. TOML is the primary format; files ending in `.yaml` or
//! `.yml` are read as YAML with the same shape.
//!
//! ```toml
//! [[song_beat]]
//! name = "Four on the Floor"
//! beats_per_sequence = 4
//! notes_per_beat = 1
//! beats_per_minute = 128
//!
//! [song_beat.pattern]
//! bd = [1, 0, 1, 0]
//! sn = [0, 0, 1, 0]
//! hh = [0, 1, 0, 1]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sequencer::{BeatSpec, SequencerError};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "configs/conf.toml";

/// Root configuration: every song beat in the file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DrumConfig {
    /// Song beat definitions, in file order
    #[serde(default)]
    pub song_beat: Vec<SongBeatConfig>,
}

impl DrumConfig {
    /// Load a configuration file, choosing the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let parsed = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents),
        };
        parsed.with_context(|| format!("Failed to load config file: {:?}", path))
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse TOML configuration")
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Failed to parse YAML configuration")
    }

    /// Check every song against the playback constraints.
    ///
    /// Stops at the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for song in &self.song_beat {
            song.validate()?;
            if !seen.insert(song.name.as_str()) {
                return Err(ConfigError::DuplicateSong(song.name.clone()));
            }
        }

        Ok(())
    }

    /// Song names in file order
    pub fn song_names(&self) -> Vec<&str> {
        self.song_beat.iter().map(|s| s.name.as_str()).collect()
    }

    /// Look up a song by name
    pub fn song(&self, name: &str) -> Result<&SongBeatConfig, ConfigError> {
        self.song_beat
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownSong {
                name: name.to_string(),
                available: self.song_names().join(", "),
            })
    }

    /// The first song in the file
    pub fn first_song(&self) -> Result<&SongBeatConfig, ConfigError> {
        self.song_beat.first().ok_or(ConfigError::NoSongs)
    }
}

/// One song beat definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SongBeatConfig {
    /// Song name
    #[serde(default)]
    pub name: String,
    /// Beats in one loop of the pattern
    #[serde(default)]
    pub beats_per_sequence: u32,
    /// Steps per beat
    #[serde(default)]
    pub notes_per_beat: u32,
    /// Tempo in BPM
    #[serde(default)]
    pub beats_per_minute: u32,
    /// Track name to step values
    #[serde(default)]
    pub pattern: BTreeMap<String, Vec<StepValue>>,
}

impl SongBeatConfig {
    /// Steps each track must define
    pub fn num_steps(&self) -> u64 {
        self.beats_per_sequence as u64 * self.notes_per_beat as u64
    }

    /// Check this song against the playback constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::MissingName);
        }

        let required = [
            ("beats_per_minute", self.beats_per_minute),
            ("beats_per_sequence", self.beats_per_sequence),
            ("notes_per_beat", self.notes_per_beat),
        ];
        for (field, value) in required {
            if value == 0 {
                return Err(ConfigError::MissingField {
                    song: self.name.clone(),
                    field,
                });
            }
        }

        let expected = self.num_steps();
        for (track, steps) in &self.pattern {
            if steps.len() as u64 != expected {
                return Err(ConfigError::PatternLength {
                    song: self.name.clone(),
                    track: track.clone(),
                    expected,
                    actual: steps.len(),
                });
            }
        }

        Ok(())
    }

    /// Convert into the sequencer's beat spec
    pub fn to_beat_spec(&self) -> Result<BeatSpec, SequencerError> {
        let pattern = self
            .pattern
            .iter()
            .map(|(track, steps)| (track.clone(), steps.iter().map(StepValue::is_hit).collect()))
            .collect();

        BeatSpec::new(
            self.beats_per_sequence,
            self.notes_per_beat,
            self.beats_per_minute,
            pattern,
        )
    }
}

/// One step of a track: `1`/`0` or `true`/`false`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StepValue {
    /// Boolean step
    Bool(bool),
    /// Integer step, non-zero is a hit
    Int(i64),
}

impl StepValue {
    /// Whether this step triggers the track
    pub fn is_hit(&self) -> bool {
        match self {
            StepValue::Bool(b) => *b,
            StepValue::Int(v) => *v != 0,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A song has an empty name
    #[error("each song must have a name")]
    MissingName,
    /// A required numeric field is zero or absent
    #[error("song '{song}' must have {field} defined and greater than zero")]
    MissingField { song: String, field: &'static str },
    /// A track's step count differs from notes_per_beat * beats_per_sequence
    #[error(
        "song '{song}': beat pattern '{track}' must match notes_per_beat times \
         beats_per_sequence and have {expected} notes, found {actual}"
    )]
    PatternLength {
        song: String,
        track: String,
        expected: u64,
        actual: usize,
    },
    /// Two songs share a name
    #[error("song '{0}' is defined more than once")]
    DuplicateSong(String),
    /// The requested song is not in the file
    #[error("no song named '{name}' (available: {available})")]
    UnknownSong { name: String, available: String },
    /// The file defines no songs
    #[error("configuration defines no songs")]
    NoSongs,
}

/// Load and validate a configuration file
pub fn validate_config<P: AsRef<Path>>(path: P) -> Result<DrumConfig> {
    let config = DrumConfig::load(path)?;
    config.validate()?;
    Ok(config)
}
