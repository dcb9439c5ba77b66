// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Step clock derived from tempo.
//!
//! A step sequence advances one step per tick. The tick length is fixed for
//! the whole run and derived once from beats per minute and the number of
//! notes (steps) per beat.

use std::fmt;
use std::time::Duration;

use crate::sequencer::SequencerError;

/// Seconds in one minute
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Fixed interval between two consecutive steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInterval {
    /// Interval in seconds, full precision
    seconds: f64,
    /// Interval as a timer duration (nanosecond granularity)
    duration: Duration,
}

impl TickInterval {
    /// Derive the tick interval: `60 / bpm / notes_per_beat` seconds.
    ///
    /// Both arguments must be non-zero.
    pub fn from_tempo(beats_per_minute: u32, notes_per_beat: u32) -> Result<Self, SequencerError> {
        if beats_per_minute == 0 {
            return Err(SequencerError::InvalidSpec(
                "beats per minute must be greater than zero".to_string(),
            ));
        }
        if notes_per_beat == 0 {
            return Err(SequencerError::InvalidSpec(
                "notes per beat must be greater than zero".to_string(),
            ));
        }

        let seconds_per_beat = SECONDS_PER_MINUTE / beats_per_minute as f64;
        let seconds = seconds_per_beat / notes_per_beat as f64;

        Ok(Self {
            seconds,
            duration: Duration::from_secs_f64(seconds),
        })
    }

    /// Build an interval from an explicit duration
    pub fn from_duration(duration: Duration) -> Result<Self, SequencerError> {
        if duration.is_zero() {
            return Err(SequencerError::InvalidSpec(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            seconds: duration.as_secs_f64(),
            duration,
        })
    }

    /// Interval in seconds
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds
    }

    /// Interval as a timer duration
    pub fn as_duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for TickInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_interval_four_on_the_floor() {
        let interval = TickInterval::from_tempo(128, 1).unwrap();
        assert!((interval.as_secs_f64() - 0.46875).abs() < TOLERANCE);
        assert_eq!(interval.as_duration(), Duration::from_micros(468_750));
    }

    #[test]
    fn test_interval_representative_tempos() {
        let cases = [(120, 1, 0.5), (120, 4, 0.125), (90, 2, 1.0 / 3.0), (60, 3, 1.0 / 3.0)];

        for (bpm, notes, expected) in cases {
            let interval = TickInterval::from_tempo(bpm, notes).unwrap();
            assert!(
                (interval.as_secs_f64() - expected).abs() < TOLERANCE,
                "bpm {} notes {} gave {}",
                bpm,
                notes,
                interval.as_secs_f64()
            );
        }
    }

    #[test]
    fn test_interval_keeps_sub_millisecond_precision() {
        // 60 / 90 / 2 = 0.333333...s, must not be truncated to whole milliseconds
        let interval = TickInterval::from_tempo(90, 2).unwrap();
        let nanos = interval.as_duration().as_nanos();
        assert!(nanos > 333_333_000 && nanos < 333_334_000);
    }

    #[test]
    fn test_zero_tempo_rejected() {
        assert!(matches!(
            TickInterval::from_tempo(0, 4),
            Err(SequencerError::InvalidSpec(_))
        ));
        assert!(matches!(
            TickInterval::from_tempo(120, 0),
            Err(SequencerError::InvalidSpec(_))
        ));
        assert!(TickInterval::from_duration(Duration::ZERO).is_err());
    }

    #[test]
    fn test_display() {
        let interval = TickInterval::from_tempo(128, 1).unwrap();
        assert_eq!(interval.to_string(), "0.468750s");
    }
}
