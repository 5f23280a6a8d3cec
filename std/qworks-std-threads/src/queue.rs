//!
//! Bounded Blocking Queue
//!
//! A fixed-capacity FIFO shared between threads. All state lives behind one
//! `Mutex`; producers park on `not_full`, consumers park on `not_empty`.
//! Each successful push wakes one consumer and each successful pop wakes one
//! producer.
//!
//! ## Teardown
//!
//! `close()` marks the queue closed and wakes everyone. After that, `push`
//! fails with `QueueError::Closed`, while buffered items stay poppable until
//! drained; `pop` only returns `None` once the queue is closed and empty.
//!
//! ## Ids
//!
//! Every queue takes a unique id from a `QueueIdAllocator` at construction.
//! Ids are never reused for the lifetime of the allocator.
//!

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QueueError {
    #[error("Queue {id} is closed")]
    Closed { id: u64 },
}

/// Monotonic source of queue ids
#[derive(Debug)]
pub struct QueueIdAllocator {
    next: AtomicU64,
}

static GLOBAL_QUEUE_IDS: QueueIdAllocator = QueueIdAllocator::new();

impl QueueIdAllocator {
    pub const fn new() -> Self {
        Self { next: AtomicU64::new(0) }
    }

    /// The allocator shared by every queue built with `BoundedQueue::new`
    pub fn global() -> &'static QueueIdAllocator {
        &GLOBAL_QUEUE_IDS
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for QueueIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct BoundedQueue<T> {
    id: u64,
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue with an id from the global allocator
    pub fn new(capacity: usize) -> Self {
        Self::with_allocator(capacity, QueueIdAllocator::global())
    }

    /// Create a queue with an id from `ids`. A capacity of 0 is clamped to 1.
    pub fn with_allocator(capacity: usize, ids: &QueueIdAllocator) -> Self {
        let id = ids.next_id();
        let capacity = if capacity == 0 {
            tracing::warn!(queue = id, "Queue capacity 0 clamped to 1");
            1
        } else {
            capacity
        };
        tracing::debug!(queue = id, capacity, "Created queue");

        Self {
            id,
            capacity,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // A poisoned lock still guards a consistent queue.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `item`, blocking while the queue is full.
    pub fn push(&self, item: T) -> Result<(), QueueError> {
        let guard = self.lock();
        let mut state = self
            .not_full
            .wait_while(guard, |s| !s.closed && s.items.len() >= self.capacity)
            .unwrap_or_else(PoisonError::into_inner);

        if state.closed {
            return Err(QueueError::Closed { id: self.id });
        }

        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the head item, blocking while the queue is empty.
    /// Returns `None` only when the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let guard = self.lock();
        let mut state = self
            .not_empty
            .wait_while(guard, |s| !s.closed && s.items.is_empty())
            .unwrap_or_else(PoisonError::into_inner);

        let item = state.items.pop_front();
        drop(state);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Remove the head item if there is one
    pub fn try_pop(&self) -> Option<T> {
        let item = self.lock().items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Remove exactly `n` head items in one step, or nothing at all when
    /// fewer than `n` are buffered.
    pub fn try_pop_exact(&self, n: usize) -> Option<Vec<T>> {
        let mut state = self.lock();
        if state.items.len() < n {
            return None;
        }

        let taken: Vec<T> = state.items.drain(..n).collect();
        drop(state);
        match n {
            0 => {}
            1 => self.not_full.notify_one(),
            _ => self.not_full.notify_all(),
        }
        Some(taken)
    }

    pub fn size(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lock().items.len() >= self.capacity
    }

    /// Tear the queue down and wake every parked caller. Idempotent.
    pub fn close(&self) {
        self.lock().closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl<T> std::fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("size", &self.size())
            .finish()
    }
}
