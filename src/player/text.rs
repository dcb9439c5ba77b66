// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Text sink: prints the full names of triggered notes.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Mutex;

use super::{PlaybackSink, SinkError};
use crate::sequencer::NoteSet;

/// Beamed eighth notes framing each printed step
const NOTE_MARK: char = '\u{266B}';

/// Abbreviation to display name for the 808 kit
pub const NOTE_NAMES: [(&str, &str); 5] = [
    ("bd", "Bass Drum"),
    ("sn", "Snare Drum"),
    ("hh", "Closed Hi-Hat"),
    ("oh", "Open Hi-Hat"),
    ("rd", "Ride Cymbal"),
];

/// Prints one line per step
pub struct TextSink {
    names: HashMap<String, String>,
    out: Mutex<Box<dyn Write + Send>>,
}

impl TextSink {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Sink writing to `out`
    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self {
            names: NOTE_NAMES
                .iter()
                .map(|(abbr, name)| (abbr.to_string(), name.to_string()))
                .collect(),
            out: Mutex::new(out),
        }
    }

    /// Format a step, e.g. `♫ Bass Drum, Snare Drum ♫`.
    ///
    /// Names without a mapping are printed as given.
    pub fn render(&self, notes: &NoteSet) -> String {
        let names: Vec<&str> = notes
            .iter()
            .map(|note| self.names.get(note).map(String::as_str).unwrap_or(note.as_str()))
            .collect();

        format!("{} {} {}", NOTE_MARK, names.join(", "), NOTE_MARK)
    }
}

impl PlaybackSink for TextSink {
    fn play(&self, notes: &NoteSet) -> Result<(), SinkError> {
        let line = self.render(notes);
        let mut out = self
            .out
            .lock()
            .map_err(|_| SinkError::Device("text output lock poisoned".to_string()))?;
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "text"
    }
}
