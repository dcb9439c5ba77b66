// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! drum808 - configuration-driven drum step sequencer.
//!
//! A song beat is read from configuration, expanded into a fixed-interval
//! step schedule and played through a text or audio sink in real time.

pub mod audio;
pub mod config;
pub mod player;
pub mod sequencer;
pub mod timing;

use std::sync::Arc;
use std::time::Duration;

use player::PlaybackSink;
use sequencer::{build, BeatSpec, RunReport, SequencerError, StopSignal, TickScheduler};

/// Build the schedule for `spec` and play it until `stop` fires or `total`
/// elapses.
///
/// Construction errors are returned before any note is dispatched.
pub async fn play_song(
    spec: &BeatSpec,
    sink: Arc<dyn PlaybackSink>,
    total: Option<Duration>,
    stop: StopSignal,
) -> Result<RunReport, SequencerError> {
    let schedule = build(spec)?;
    let mut scheduler = TickScheduler::new(schedule)?;
    Ok(scheduler.run(sink, total, stop).await)
}
