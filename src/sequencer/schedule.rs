// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Schedule builder.
//!
//! Expands a `BeatSpec` into the ordered list of steps the tick scheduler
//! walks through. Building is pure: the same spec always yields an equal
//! schedule, and a malformed spec yields an error instead of a partial
//! schedule.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{BeatSpec, SequencerError};
use crate::timing::TickInterval;

/// Immutable set of track names triggered together
pub type NoteSet = Arc<BTreeSet<String>>;

/// One step of the expanded pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStep {
    /// Position in the sequence
    pub index: usize,
    /// Tracks with a hit at this position
    pub active_tracks: NoteSet,
}

impl ScheduledStep {
    /// Whether any track triggers on this step
    pub fn is_empty(&self) -> bool {
        self.active_tracks.is_empty()
    }
}

/// Ordered steps plus the fixed interval between them
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    steps: Vec<ScheduledStep>,
    interval: TickInterval,
}

impl Schedule {
    /// Assemble a schedule from already expanded steps
    pub fn from_steps(steps: Vec<ScheduledStep>, interval: TickInterval) -> Self {
        Self { steps, interval }
    }

    /// Expanded steps in playback order
    pub fn steps(&self) -> &[ScheduledStep] {
        &self.steps
    }

    /// Step at `index`
    pub fn get(&self, index: usize) -> Option<&ScheduledStep> {
        self.steps.get(index)
    }

    /// Number of steps in one loop
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the schedule has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Interval between two steps
    pub fn interval(&self) -> TickInterval {
        self.interval
    }
}

/// Expand a beat spec into its step schedule.
pub fn build(spec: &BeatSpec) -> Result<Schedule, SequencerError> {
    if spec.beats_per_sequence() == 0 || spec.notes_per_beat() == 0 {
        return Err(SequencerError::InvalidSpec(format!(
            "sequence must contain steps (beats per sequence {}, notes per beat {})",
            spec.beats_per_sequence(),
            spec.notes_per_beat()
        )));
    }

    let num_steps = spec.num_steps().ok_or_else(|| {
        SequencerError::InvalidSpec(format!(
            "step count {} x {} overflows",
            spec.beats_per_sequence(),
            spec.notes_per_beat()
        ))
    })?;

    let interval = TickInterval::from_tempo(spec.beats_per_minute(), spec.notes_per_beat())?;

    // Reject mismatched tracks up front so no partial schedule is produced
    for (track, steps) in spec.pattern() {
        if steps.len() != num_steps {
            return Err(SequencerError::IndexOutOfRange {
                track: track.clone(),
                expected: num_steps,
                actual: steps.len(),
            });
        }
    }

    let steps = (0..num_steps)
        .map(|index| {
            let active: BTreeSet<String> = spec
                .pattern()
                .iter()
                .filter(|(_, steps)| steps[index])
                .map(|(track, _)| track.clone())
                .collect();

            ScheduledStep {
                index,
                active_tracks: Arc::new(active),
            }
        })
        .collect();

    Ok(Schedule { steps, interval })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::pattern::grid;
    use std::collections::BTreeMap;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn four_on_the_floor() -> BeatSpec {
        let mut pattern = BTreeMap::new();
        pattern.insert("bd".to_string(), grid("x.x."));
        pattern.insert("sn".to_string(), grid("..x."));
        pattern.insert("hh".to_string(), grid(".x.x"));
        BeatSpec::new(4, 1, 128, pattern).unwrap()
    }

    #[test]
    fn test_four_on_the_floor() {
        let schedule = build(&four_on_the_floor()).unwrap();

        let active: Vec<BTreeSet<String>> = schedule
            .steps()
            .iter()
            .map(|s| (*s.active_tracks).clone())
            .collect();

        assert_eq!(
            active,
            vec![set(&["bd"]), set(&["hh"]), set(&["bd", "sn"]), set(&["hh"])]
        );
        assert!((schedule.interval().as_secs_f64() - 0.46875).abs() < 1e-9);
    }

    #[test]
    fn test_length_is_beats_times_notes() {
        for (beats, notes) in [(1, 1), (4, 1), (4, 4), (3, 2), (7, 3)] {
            let steps = (beats * notes) as usize;
            let mut pattern = BTreeMap::new();
            pattern.insert("bd".to_string(), (0..steps).map(|i| i % 2 == 0).collect());
            let spec = BeatSpec::new(beats, notes, 100, pattern).unwrap();

            let schedule = build(&spec).unwrap();
            assert_eq!(schedule.len(), steps);
            for (i, step) in schedule.steps().iter().enumerate() {
                assert_eq!(step.index, i);
            }
        }
    }

    #[test]
    fn test_active_tracks_match_pattern() {
        let mut pattern = BTreeMap::new();
        pattern.insert("bd".to_string(), grid("x...x...x...x..."));
        pattern.insert("sn".to_string(), grid("....x.......x..."));
        pattern.insert("hh".to_string(), grid("x.x.x.x.x.x.x.x."));
        pattern.insert("oh".to_string(), grid("..............x."));
        let spec = BeatSpec::new(4, 4, 120, pattern.clone()).unwrap();

        let schedule = build(&spec).unwrap();

        for step in schedule.steps() {
            let expected: BTreeSet<String> = pattern
                .iter()
                .filter(|(_, steps)| steps[step.index])
                .map(|(name, _)| name.clone())
                .collect();
            assert_eq!(*step.active_tracks, expected, "step {}", step.index);
        }
    }

    #[test]
    fn test_silent_track_is_absent() {
        let mut pattern = BTreeMap::new();
        pattern.insert("bd".to_string(), grid("x..."));
        pattern.insert("rd".to_string(), grid("...."));
        let spec = BeatSpec::new(4, 1, 120, pattern).unwrap();

        let schedule = build(&spec).unwrap();
        assert!(schedule
            .steps()
            .iter()
            .all(|s| !s.active_tracks.contains("rd")));
        assert!(schedule.get(1).unwrap().is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let spec = four_on_the_floor();
        assert_eq!(build(&spec).unwrap(), build(&spec).unwrap());
    }

    #[test]
    fn test_empty_pattern_builds_silent_schedule() {
        let spec = BeatSpec::new(2, 2, 120, BTreeMap::new()).unwrap();
        let schedule = build(&spec).unwrap();
        assert_eq!(schedule.len(), 4);
        assert!(schedule.steps().iter().all(ScheduledStep::is_empty));
    }

    #[test]
    fn test_zero_steps_is_invalid_spec() {
        let spec = BeatSpec::from_parts_unchecked(0, 4, 120, BTreeMap::new());
        assert!(matches!(build(&spec), Err(SequencerError::InvalidSpec(_))));

        let spec = BeatSpec::from_parts_unchecked(4, 0, 120, BTreeMap::new());
        assert!(matches!(build(&spec), Err(SequencerError::InvalidSpec(_))));
    }

    #[test]
    fn test_zero_tempo_is_invalid_spec() {
        let spec = BeatSpec::from_parts_unchecked(4, 1, 0, BTreeMap::new());
        assert!(matches!(build(&spec), Err(SequencerError::InvalidSpec(_))));
    }

    #[test]
    fn test_mismatched_track_is_index_out_of_range() {
        let mut pattern = BTreeMap::new();
        pattern.insert("bd".to_string(), grid("x.x."));
        pattern.insert("sn".to_string(), grid("x."));
        let spec = BeatSpec::from_parts_unchecked(4, 1, 120, pattern);

        assert_eq!(
            build(&spec).unwrap_err(),
            SequencerError::IndexOutOfRange {
                track: "sn".to_string(),
                expected: 4,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_longer_track_is_not_truncated() {
        let mut pattern = BTreeMap::new();
        pattern.insert("bd".to_string(), grid("x.x.x"));
        let spec = BeatSpec::from_parts_unchecked(4, 1, 120, pattern);
        assert!(matches!(
            build(&spec),
            Err(SequencerError::IndexOutOfRange { actual: 5, .. })
        ));
    }
}
