// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tick scheduler.
//!
//! Walks a `Schedule` one step per tick on a fixed-period Tokio interval.
//! Each non-empty step is handed to the playback sink on the blocking pool
//! and never awaited, so slow playback cannot delay the next tick. The step
//! index wraps, so the pattern loops until the stop signal fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{NoteSet, Schedule, SequencerError, StopSignal};
use crate::player::PlaybackSink;

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, timer not started
    Idle,
    /// Timer running, steps being dispatched
    Running,
    /// Timer halted, no further dispatches
    Stopped,
}

/// Summary of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Timer fires handled
    pub ticks: u64,
    /// Steps handed to the sink
    pub dispatches: u64,
    /// Step index the next tick would have read
    pub final_index: usize,
}

/// Fixed-interval step scheduler
#[derive(Debug)]
pub struct TickScheduler {
    /// Steps to loop over
    schedule: Schedule,
    /// Next step to read
    current: usize,
    /// Lifecycle state
    state: SchedulerState,
    /// Ticks handled so far
    ticks: u64,
    /// Dispatches issued so far
    dispatches: u64,
}

impl TickScheduler {
    /// Create a scheduler for `schedule`.
    ///
    /// An empty schedule is rejected before any timer is started.
    pub fn new(schedule: Schedule) -> Result<Self, SequencerError> {
        if schedule.is_empty() {
            return Err(SequencerError::InvalidSchedule);
        }

        Ok(Self {
            schedule,
            current: 0,
            state: SchedulerState::Idle,
            ticks: 0,
            dispatches: 0,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Index of the step the next tick will read
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Ticks handled so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Interval between ticks
    pub fn tick_interval(&self) -> Duration {
        self.schedule.interval().as_duration()
    }

    /// Handle one timer fire: read the current step and advance, wrapping at
    /// the end of the schedule.
    ///
    /// Returns the notes to dispatch, or `None` for a silent step.
    pub fn on_tick(&mut self) -> Option<NoteSet> {
        let step = &self.schedule.steps()[self.current];
        let notes = (!step.is_empty()).then(|| Arc::clone(&step.active_tracks));

        self.current = (self.current + 1) % self.schedule.len();
        self.ticks += 1;

        notes
    }

    /// Run until `stop` is cancelled or `total` has elapsed.
    ///
    /// The first tick fires immediately. Stop is checked before the deadline
    /// and the deadline before the timer, so a tick due at the same instant as
    /// either is never dispatched. Dispatches still playing when the run ends
    /// are left to finish on their own. The scheduler is `Stopped` afterwards.
    pub async fn run(
        &mut self,
        sink: Arc<dyn PlaybackSink>,
        total: Option<Duration>,
        stop: StopSignal,
    ) -> RunReport {
        if stop.is_cancelled() {
            self.state = SchedulerState::Stopped;
            return self.report();
        }

        // Armed before the interval so it never expires later than a tick due
        // at the same offset
        let deadline = time::sleep(total.unwrap_or_default());
        tokio::pin!(deadline);

        let mut ticker = time::interval(self.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        self.state = SchedulerState::Running;
        info!(
            steps = self.schedule.len(),
            interval = %self.schedule.interval(),
            total = ?total,
            sink = sink.name(),
            "scheduler running"
        );

        loop {
            tokio::select! {
                biased;

                _ = stop.cancelled() => {
                    debug!("stop requested");
                    break;
                }

                _ = &mut deadline, if total.is_some() => {
                    debug!(?total, "run duration elapsed");
                    break;
                }

                _ = ticker.tick() => {
                    let index = self.current;
                    if let Some(notes) = self.on_tick() {
                        self.dispatch(&sink, index, notes);
                    }
                }
            }
        }

        self.state = SchedulerState::Stopped;
        let report = self.report();
        info!(
            ticks = report.ticks,
            dispatches = report.dispatches,
            "scheduler stopped"
        );
        report
    }

    /// Hand `notes` to the sink without waiting for playback
    fn dispatch(&mut self, sink: &Arc<dyn PlaybackSink>, index: usize, notes: NoteSet) {
        self.dispatches += 1;
        debug!(step = index, notes = ?notes, "dispatch");

        let sink = Arc::clone(sink);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = sink.play(&notes) {
                warn!(sink = sink.name(), step = index, error = %e, "playback failed");
            }
        });
    }

    fn report(&self) -> RunReport {
        RunReport {
            ticks: self.ticks,
            dispatches: self.dispatches,
            final_index: self.current,
        }
    }
}
