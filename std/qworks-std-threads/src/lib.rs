//!
//! qworks-std-threads - Concurrency Primitives
//!
//! ## Bounded Queues
//!
//! `BoundedQueue<T>` is a fixed-capacity FIFO guarded by its own mutex, with
//! separate "not full" and "not empty" condition variables:
//! - `push(item)` - Append (blocks while full)
//! - `pop() -> Option<T>` - Remove head (blocks while empty)
//! - `try_pop()` / `try_pop_exact(n)` - Non-blocking removal
//! - `close()` - Tear down, waking every parked caller
//!
//! Queue ids come from a `QueueIdAllocator`, either the process-global one
//! or one passed in explicitly.
//!
//! ## Workers
//!
//! One OS thread per worker. A `WorkerHandle` owns the thread and shares a
//! `WorkerControl` (stop flag + lifecycle state) with it. Stopping is
//! cooperative: the flag is only observed between loop iterations.
//!
//! ## Counters
//!
//! `CompletionCounter` is a monotonic atomic tally shared between workers.
//!

pub mod counter;
pub mod queue;
pub mod worker;

pub use counter::*;
pub use queue::*;
pub use worker::*;
