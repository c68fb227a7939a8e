//! Periodic task scheduler driven by simulated time
//!
//! One table of fixed-period tasks, advanced from a single loop. Callers pull
//! due ticks one at a time so they can stop mid-batch (e.g. when a game ends)
//! without any later tick leaking through.

use serde::{Deserialize, Serialize};

/// What a scheduled tick drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickKind {
    /// Create new targets/items
    Spawn,
    /// Advance positions, ages and per-frame checks
    Move,
    /// One second off the round clock
    Countdown,
    /// Particle physics (owned by the session, not the engine)
    Particles,
}

/// When a task fires for the first time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstFire {
    /// At the moment of registration
    Immediately,
    /// One full period after registration
    AfterPeriod,
}

/// A periodic subscription requested by a game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    pub kind: TickKind,
    pub period_ms: u64,
    pub first: FirstFire,
}

impl Periodic {
    pub const fn every(kind: TickKind, period_ms: u64) -> Self {
        Self {
            kind,
            period_ms,
            first: FirstFire::AfterPeriod,
        }
    }

    pub const fn starting_now(mut self) -> Self {
        self.first = FirstFire::Immediately;
        self
    }
}

/// Scheduler-assigned task handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u32);

/// A tick that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub task: TaskId,
    pub kind: TickKind,
    /// Simulated time the tick was due at
    pub at_ms: u64,
}

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    kind: TickKind,
    period_ms: u64,
    next_due_ms: u64,
}

/// Fixed-period task table
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    now_ms: u64,
    next_id: u32,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a periodic task
    pub fn add(&mut self, periodic: Periodic) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let period_ms = periodic.period_ms.max(1);
        let next_due_ms = match periodic.first {
            FirstFire::Immediately => self.now_ms,
            FirstFire::AfterPeriod => self.now_ms + period_ms,
        };
        self.tasks.push(Task {
            id,
            kind: periodic.kind,
            period_ms,
            next_due_ms,
        });
        id
    }

    pub fn cancel(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Current simulated time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Pop the earliest tick due at or before `until_ms`
    ///
    /// Ticks due at the same instant come out in registration order. The
    /// clock moves to the tick's due time.
    pub fn next_due(&mut self, until_ms: u64) -> Option<Due> {
        let task = self
            .tasks
            .iter_mut()
            .filter(|t| t.next_due_ms <= until_ms)
            .min_by_key(|t| (t.next_due_ms, t.id))?;

        let due = Due {
            task: task.id,
            kind: task.kind,
            at_ms: task.next_due_ms,
        };
        task.next_due_ms += task.period_ms;
        self.now_ms = self.now_ms.max(due.at_ms);
        Some(due)
    }

    /// Move the clock to `until_ms` once all due ticks have been pulled
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
