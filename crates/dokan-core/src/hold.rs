//! Press-and-hold gesture that completes a task

use dokan_util::MonotonicInstant;
use std::time::Duration;

/// What the gesture looks like at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldState {
    Idle,
    /// Held but not long enough yet; `progress` runs from 0.0 to 1.0
    Holding { progress: f64 },
    Completed,
}

/// Tracks one hold gesture.
///
/// Progress builds while pressed and reaches 1.0 after `required`.
/// Releasing early drops it back to zero; nothing partial is kept.
#[derive(Debug, Clone)]
pub struct HoldProgress {
    required: Duration,
    started: Option<MonotonicInstant>,
}

impl HoldProgress {
    pub fn new(required: Duration) -> Self {
        Self {
            required,
            started: None,
        }
    }

    pub fn required(&self) -> Duration {
        self.required
    }

    pub fn is_pressed(&self) -> bool {
        self.started.is_some()
    }

    /// Start holding. A press while already pressed keeps the original start.
    pub fn press(&mut self, now_mono: MonotonicInstant) {
        if self.started.is_none() {
            self.started = Some(now_mono);
        }
    }

    /// Fraction of the hold done at `now_mono`
    pub fn progress(&self, now_mono: MonotonicInstant) -> f64 {
        let Some(started) = self.started else {
            return 0.0;
        };
        if self.required.is_zero() {
            return 1.0;
        }
        let held = now_mono.saturating_duration_since(started);
        (held.as_secs_f64() / self.required.as_secs_f64()).min(1.0)
    }

    pub fn poll(&self, now_mono: MonotonicInstant) -> HoldState {
        if self.started.is_none() {
            return HoldState::Idle;
        }
        match self.progress(now_mono) {
            p if p >= 1.0 => HoldState::Completed,
            progress => HoldState::Holding { progress },
        }
    }

    /// Let go. Returns true when the hold had completed.
    pub fn release(&mut self, now_mono: MonotonicInstant) -> bool {
        let completed = self.poll(now_mono) == HoldState::Completed;
        self.started = None;
        completed
    }
}
