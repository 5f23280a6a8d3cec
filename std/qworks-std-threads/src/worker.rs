//!
//! Worker Lifecycle
//!
//! Each worker is one OS thread moving through
//! `Created -> Running -> Stopping -> Stopped`.
//!
//! The thread and its `WorkerHandle` share a `WorkerControl`. `stop()` only
//! raises a flag; the worker notices it at its next loop check, so a thread
//! parked in a queue call stays parked until that call returns. Dropping a
//! handle stops and joins the thread.
//!

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Created = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkerState::Created,
            1 => WorkerState::Running,
            2 => WorkerState::Stopping,
            _ => WorkerState::Stopped,
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to spawn worker {id}: {source}")]
    Spawn {
        id: u64,
        #[source]
        source: io::Error,
    },

    #[error("Worker {id} panicked")]
    Panicked { id: u64 },
}

/// Stop flag and lifecycle state shared by a worker thread and its handle
#[derive(Debug)]
pub struct WorkerControl {
    id: u64,
    stop: AtomicBool,
    state: AtomicU8,
}

impl WorkerControl {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            stop: AtomicBool::new(false),
            state: AtomicU8::new(WorkerState::Created as u8),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Raise the stop flag. Non-blocking and idempotent.
    pub fn stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            self.transition(WorkerState::Created, WorkerState::Stopping);
            self.transition(WorkerState::Running, WorkerState::Stopping);
        }
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move a running worker to `Stopping` without an external stop request
    pub fn begin_stopping(&self) {
        self.transition(WorkerState::Running, WorkerState::Stopping);
    }

    fn transition(&self, from: WorkerState, to: WorkerState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn mark_stopped(&self) {
        self.state.store(WorkerState::Stopped as u8, Ordering::SeqCst);
    }
}

pub struct WorkerHandle {
    control: Arc<WorkerControl>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Launch `body` on a named OS thread. The worker is `Running` while
    /// `body` executes and `Stopped` once it returns.
    pub fn spawn<F>(name: String, control: Arc<WorkerControl>, body: F) -> Result<Self, WorkerError>
    where
        F: FnOnce(&WorkerControl) + Send + 'static,
    {
        let id = control.id();
        let shared = Arc::clone(&control);
        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || {
                shared.transition(WorkerState::Created, WorkerState::Running);
                body(&*shared);
                shared.mark_stopped();
            })
            .map_err(|source| WorkerError::Spawn { id, source })?;

        Ok(Self { control, thread: Some(thread) })
    }

    pub fn id(&self) -> u64 {
        self.control.id()
    }

    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn state(&self) -> WorkerState {
        self.control.state()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Wait for the thread to exit. Joining twice is a no-op.
    pub fn join(&mut self) -> Result<(), WorkerError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        let result = thread.join();
        self.control.mark_stopped();
        result.map_err(|_| WorkerError::Panicked { id: self.control.id() })
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.control.stop();
        if let Err(e) = self.join() {
            tracing::error!(worker = self.control.id(), "{}", e);
        }
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.control.id())
            .field("state", &self.control.state())
            .finish()
    }
}
