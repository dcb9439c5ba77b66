// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Beat pattern model.
//!
//! A `BeatSpec` holds the meter, the tempo and one boolean step grid per
//! track. It is immutable once built.

use std::collections::BTreeMap;

use super::SequencerError;

/// Tempo, meter and per-track step grid for one song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatSpec {
    beats_per_sequence: u32,
    notes_per_beat: u32,
    beats_per_minute: u32,
    pattern: BTreeMap<String, Vec<bool>>,
}

impl BeatSpec {
    /// Create a validated beat spec.
    ///
    /// Fails if any numeric field is zero, a track name is empty, or a track's
    /// step count differs from `beats_per_sequence * notes_per_beat`.
    pub fn new(
        beats_per_sequence: u32,
        notes_per_beat: u32,
        beats_per_minute: u32,
        pattern: BTreeMap<String, Vec<bool>>,
    ) -> Result<Self, SequencerError> {
        let spec = Self::from_parts_unchecked(
            beats_per_sequence,
            notes_per_beat,
            beats_per_minute,
            pattern,
        );
        spec.check()?;
        Ok(spec)
    }

    /// Create a beat spec without checking its invariants.
    ///
    /// Consumers such as the schedule builder still reject malformed specs.
    pub fn from_parts_unchecked(
        beats_per_sequence: u32,
        notes_per_beat: u32,
        beats_per_minute: u32,
        pattern: BTreeMap<String, Vec<bool>>,
    ) -> Self {
        Self {
            beats_per_sequence,
            notes_per_beat,
            beats_per_minute,
            pattern,
        }
    }

    /// Beats in one loop of the pattern
    pub fn beats_per_sequence(&self) -> u32 {
        self.beats_per_sequence
    }

    /// Steps per beat
    pub fn notes_per_beat(&self) -> u32 {
        self.notes_per_beat
    }

    /// Tempo in BPM
    pub fn beats_per_minute(&self) -> u32 {
        self.beats_per_minute
    }

    /// Track name to step grid
    pub fn pattern(&self) -> &BTreeMap<String, Vec<bool>> {
        &self.pattern
    }

    /// Total step count, `None` if zero or if the product overflows
    pub fn num_steps(&self) -> Option<usize> {
        let steps = (self.beats_per_sequence as usize).checked_mul(self.notes_per_beat as usize)?;
        (steps > 0).then_some(steps)
    }

    /// Check that every field is usable and every track has the right length
    pub fn check(&self) -> Result<(), SequencerError> {
        if self.beats_per_minute == 0 {
            return Err(SequencerError::InvalidSpec(
                "beats per minute must be greater than zero".to_string(),
            ));
        }
        if self.beats_per_sequence == 0 {
            return Err(SequencerError::InvalidSpec(
                "beats per sequence must be greater than zero".to_string(),
            ));
        }
        if self.notes_per_beat == 0 {
            return Err(SequencerError::InvalidSpec(
                "notes per beat must be greater than zero".to_string(),
            ));
        }

        let expected = self.num_steps().ok_or_else(|| {
            SequencerError::InvalidSpec("step count overflows".to_string())
        })?;

        for (track, steps) in &self.pattern {
            if track.is_empty() {
                return Err(SequencerError::InvalidSpec(
                    "track names must not be empty".to_string(),
                ));
            }
            if steps.len() != expected {
                return Err(SequencerError::IndexOutOfRange {
                    track: track.clone(),
                    expected,
                    actual: steps.len(),
                });
            }
        }

        Ok(())
    }
}

/// Build a step grid from a compact string such as `"x.x."`.
///
/// `x`, `X` and `1` are hits; every other character is a rest.
pub fn grid(steps: &str) -> Vec<bool> {
    steps.chars().map(|c| matches!(c, 'x' | 'X' | '1')).collect()
}
