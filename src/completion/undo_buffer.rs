// Single-slot undo buffer with a monotonic deadline
//
// The countdown is not a ticking timer: the deadline is stored once and the
// remaining time is recomputed from it on every query.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::Instant;

use crate::records::{Task, TaskStatus};

/// A just-completed task waiting out its undo window
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedCompletion {
    /// The task as it now stands, status `Completed`
    pub task: Task,
    pub previous_status: TaskStatus,
    /// Index in the visible list before removal
    pub position: usize,
    /// Wall-clock completion time, for display
    pub completed_at: DateTime<Utc>,
    deadline: Instant,
}

impl BufferedCompletion {
    pub fn new(
        task: Task,
        previous_status: TaskStatus,
        position: usize,
        window: Duration,
        now: Instant,
    ) -> Self {
        Self {
            task,
            previous_status,
            position,
            completed_at: Utc::now(),
            deadline: now + window,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

#[derive(Debug, Clone)]
pub struct UndoBuffer {
    slot: Option<BufferedCompletion>,
    window: Duration,
}

impl UndoBuffer {
    pub fn new(window: Duration) -> Self {
        Self { slot: None, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Put a completion in the slot, returning whatever it displaced
    pub fn hold(&mut self, completion: BufferedCompletion) -> Option<BufferedCompletion> {
        self.slot.replace(completion)
    }

    /// Live occupant, if its window has not elapsed
    pub fn peek(&self, now: Instant) -> Option<&BufferedCompletion> {
        self.slot.as_ref().filter(|entry| !entry.is_expired(now))
    }

    /// Clear an expired occupant, returning it
    pub fn expire(&mut self, now: Instant) -> Option<BufferedCompletion> {
        if self.slot.as_ref().is_some_and(|entry| entry.is_expired(now)) {
            self.slot.take()
        } else {
            None
        }
    }

    /// Remove the occupant for an undo, only while its window is open
    pub fn take_live(&mut self, now: Instant) -> Option<BufferedCompletion> {
        self.expire(now);
        self.slot.take()
    }

    /// Whole seconds left, rounded up; `None` when nothing is held
    pub fn seconds_remaining(&self, now: Instant) -> Option<u64> {
        self.peek(now).map(|entry| {
            let remaining = entry.remaining(now);
            remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
        })
    }
}
