// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core for building and playing step patterns.
//!
//! This module provides the core sequencing infrastructure:
//! - Beat pattern model with per-track step grids
//! - Schedule builder expanding a pattern into ordered steps
//! - Tick scheduler firing steps on a fixed interval
//! - Stop signal for cancellation and run deadlines

pub mod cancel;
pub mod pattern;
pub mod schedule;
pub mod scheduler;

pub use cancel::StopSignal;
pub use pattern::{grid, BeatSpec};
pub use schedule::{build, NoteSet, Schedule, ScheduledStep};
pub use scheduler::{RunReport, SchedulerState, TickScheduler};

use thiserror::Error;

/// Errors raised before playback starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// Tempo or meter fields are unusable
    #[error("invalid beat spec: {0}")]
    InvalidSpec(String),
    /// A track's step grid does not match the step count
    #[error("track '{track}' has {actual} steps, expected {expected}")]
    IndexOutOfRange {
        track: String,
        expected: usize,
        actual: usize,
    },
    /// The scheduler was given no steps
    #[error("schedule has no steps")]
    InvalidSchedule,
}
