//! A single in-flight client command and its completion handoff.
//!
//! Mirrors the reference design's `Task`: a small, per-command record owned
//! by the connection handler that submits it, carrying its own mutex and
//! condition variable so a worker can hand back a response without the
//! handler polling.

use std::sync::{Condvar, Mutex};

use crate::protocol::Command;

struct Completion {
    response: Option<String>,
    done: bool,
}

/// An enqueued command, waiting for a worker to execute it.
pub struct Task {
    pub command: Command,
    completion: Mutex<Completion>,
    cv: Condvar,
}

impl Task {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            completion: Mutex::new(Completion { response: None, done: false }),
            cv: Condvar::new(),
        }
    }

    /// Attach the response and wake the waiting connection handler. Called
    /// by exactly one worker, exactly once, per task.
    pub fn complete(&self, response: String) {
        let mut state = self.completion.lock().unwrap();
        state.response = Some(response);
        state.done = true;
        self.cv.notify_one();
    }

    /// Block until [`complete`](Self::complete) has been called, then return
    /// the response (or `ERR INTERNAL` if, impossibly, none was attached).
    pub fn wait(&self) -> String {
        let mut state = self.completion.lock().unwrap();
        while !state.done {
            state = self.cv.wait(state).unwrap();
        }
        state.response.take().unwrap_or_else(|| crate::protocol::format_err(crate::protocol::Reason::Internal))
    }
}
