// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio sink: plays TR-808 WAV samples on the shared output device.
//!
//! Every dispatch decodes its own files, queues them together and blocks its
//! worker thread until they have finished (bounded by the hold time). The
//! voices are released when the dispatch returns, on success or failure.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{PlaybackSink, PlayerSettings, SinkError};
use crate::audio::{decode_wav, AudioDevice, AudioError};
use crate::sequencer::NoteSet;

/// Default location of the sample kit
pub const DEFAULT_SOUND_DIR: &str = "assets/sounds/tr808wav";

/// Extension of every sample file in the kit
pub const SAMPLE_EXTENSION: &str = "WAV";

/// Default upper bound on how long one dispatch keeps its samples playing
pub const DEFAULT_HOLD: Duration = Duration::from_secs(2);

/// Abbreviation to sample file (relative to the kit, without extension).
///
/// Sounds, volumes and decays follow the TR-808 sample set.
pub const SAMPLE_FILES: [(&str, &str); 5] = [
    ("bd", "BD/BD7550"),
    ("sn", "SD/SD5050"),
    ("hh", "CH/CH"),
    ("oh", "OH/OH25"),
    ("rd", "CY/CY2550"),
];

/// Plays each step's samples mixed together
pub struct AudioSink {
    files: HashMap<String, String>,
    sound_dir: PathBuf,
    hold: Duration,
    device: Arc<AudioDevice>,
}

impl AudioSink {
    /// Create a sink on the process-wide output device.
    ///
    /// Opens the device on first use and resets it, stopping every sound
    /// still playing from earlier sinks.
    pub fn new(settings: &PlayerSettings) -> Result<Self, AudioError> {
        let device = AudioDevice::global()?;
        Ok(Self::with_device(device, settings))
    }

    /// Create a sink on `device`, resetting it
    pub fn with_device(device: Arc<AudioDevice>, settings: &PlayerSettings) -> Self {
        device.reset();

        Self {
            files: SAMPLE_FILES
                .iter()
                .map(|(abbr, file)| (abbr.to_string(), file.to_string()))
                .collect(),
            sound_dir: settings.sound_dir.clone(),
            hold: settings.hold,
            device,
        }
    }

    /// Path of the sample for `note`, if the kit has one
    pub fn sample_path(&self, note: &str) -> Option<PathBuf> {
        self.files
            .get(note)
            .map(|file| self.sound_dir.join(format!("{}.{}", file, SAMPLE_EXTENSION)))
    }
}

impl PlaybackSink for AudioSink {
    fn play(&self, notes: &NoteSet) -> Result<(), SinkError> {
        let mut samples = Vec::with_capacity(notes.len());
        let mut failures = Vec::new();

        for note in notes.iter() {
            let Some(path) = self.sample_path(note) else {
                debug!(note = %note, "no sample for note");
                continue;
            };

            match decode_wav(&path) {
                Ok(sample) => samples.push(sample),
                Err(e) => {
                    warn!(note = %note, error = %e, "skipping sample");
                    failures.push(e.to_string());
                }
            }
        }

        if samples.is_empty() {
            if failures.is_empty() {
                return Ok(());
            }
            return Err(SinkError::Decode(failures.join("; ")));
        }

        let voices = self.device.play(&samples)?;
        if !voices.wait(self.hold) {
            debug!(hold = ?self.hold, "hold elapsed before samples finished");
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "audio"
    }
}
