// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing module.
//!
//! This module derives the fixed step interval used by the tick scheduler.

pub mod clock;

pub use clock::{TickInterval, SECONDS_PER_MINUTE};
