//! Deferred work keyed to the simulation clock

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A payload that becomes due at a fixed simulation time
#[derive(Debug)]
pub struct ScheduledTask<T> {
    pub payload: T,
    deadline: Duration,
    token: CancelToken,
}

impl<T> ScheduledTask<T> {
    pub fn new(payload: T, deadline: Duration) -> Self {
        Self {
            payload,
            deadline,
            token: CancelToken::new(),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_due(&self, now: Duration) -> bool {
        !self.is_cancelled() && now >= self.deadline
    }
}

/// Pending tasks in insertion order
#[derive(Debug)]
pub struct TaskQueue<T> {
    tasks: Vec<ScheduledTask<T>>,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, payload: T, deadline: Duration) -> CancelToken {
        let task = ScheduledTask::new(payload, deadline);
        let token = task.token();
        self.tasks.push(task);
        token
    }

    /// Remove and return every due payload. Cancelled tasks are dropped.
    pub fn take_due(&mut self, now: Duration) -> Vec<T> {
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .filter(|t| !t.is_cancelled())
            .partition(|t| t.is_due(now));
        self.tasks = rest;
        due.into_iter().map(|t| t.payload).collect()
    }

    /// Cancel everything still pending; returns how many were live
    pub fn cancel_all(&mut self) -> usize {
        let live = self.len();
        for task in self.tasks.drain(..) {
            task.token.cancel();
        }
        live
    }

    /// Payloads of live tasks in insertion order
    pub fn payloads(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.tasks
            .iter()
            .filter(|t| !t.is_cancelled())
            .map(|t| t.payload.clone())
            .collect()
    }

    /// Live (uncancelled) tasks
    pub fn len(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_cancelled()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
