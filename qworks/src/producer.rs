//!
//! Producer Workers
//!
//! A producer owns one `BoundedQueue` and keeps filling it until stopped.
//! Data producers and function producers share the same loop; they differ
//! only in their `Produce` implementation.
//!
//! Each iteration generates one item, pushes it (blocking while the queue is
//! full), logs it, then sleeps for the worker's delay. A push that fails
//! because the queue was torn down ends the worker. Stopping never clears
//! the queue; processors can keep draining it.
//!

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

use qworks_std_random::{FunctionGenerator, ValueGenerator, WorkerRng};
use qworks_std_threads::{BoundedQueue, QueueError, WorkerControl, WorkerError, WorkerHandle, WorkerState};
use qworks_std_values::{FunctionDescriptor, TypedValue};

/// What a producer generates and how it reports it
pub trait Produce: Send + 'static {
    type Item: Copy + fmt::Display + Send + 'static;

    /// Short role name used in thread names and logs
    const ROLE: &'static str;

    fn generate_next(&mut self, rng: &mut WorkerRng) -> Self::Item;

    fn on_produced(&self, worker: u64, item: &Self::Item, queue_size: usize) {
        debug!(worker, queue_size, "Generated: {}", item);
    }
}

#[derive(Debug, Clone, Default)]
pub struct DataSource {
    generator: ValueGenerator,
}

impl DataSource {
    pub fn new(generator: ValueGenerator) -> Self {
        Self { generator }
    }
}

impl Produce for DataSource {
    type Item = TypedValue;
    const ROLE: &'static str = "data";

    fn generate_next(&mut self, rng: &mut WorkerRng) -> TypedValue {
        self.generator.generate_value(rng)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionSource {
    generator: FunctionGenerator,
}

impl FunctionSource {
    pub fn new(generator: FunctionGenerator) -> Self {
        Self { generator }
    }
}

impl Produce for FunctionSource {
    type Item = FunctionDescriptor;
    const ROLE: &'static str = "function";

    fn generate_next(&mut self, rng: &mut WorkerRng) -> FunctionDescriptor {
        self.generator.generate_function(rng)
    }

    fn on_produced(&self, worker: u64, item: &FunctionDescriptor, queue_size: usize) {
        debug!(
            worker,
            queue_size,
            needs = item.required_args(),
            "Generated function: {}",
            item
        );
    }
}

/// A running producer and the queue it fills
pub struct Producer<T> {
    handle: WorkerHandle,
    queue: Arc<BoundedQueue<T>>,
}

pub type DataProducer = Producer<TypedValue>;
pub type FunctionProducer = Producer<FunctionDescriptor>;

impl<T: Copy + fmt::Display + Send + 'static> Producer<T> {
    pub fn spawn<P>(
        source: P,
        id: u64,
        queue: Arc<BoundedQueue<T>>,
        delay: Duration,
        rng: WorkerRng,
    ) -> Result<Self, WorkerError>
    where
        P: Produce<Item = T>,
    {
        info!(
            worker = id,
            queue = queue.id(),
            capacity = queue.capacity(),
            "{} producer created",
            P::ROLE
        );

        let control = Arc::new(WorkerControl::new(id));
        let loop_queue = Arc::clone(&queue);
        let handle = WorkerHandle::spawn(format!("{}-{}", P::ROLE, id), control, move |control| {
            produce_loop(control, source, &loop_queue, delay, rng)
        })?;

        Ok(Self { handle, queue })
    }

    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<T>> {
        &self.queue
    }

    pub fn queue_id(&self) -> u64 {
        self.queue.id()
    }

    pub fn queue_size(&self) -> usize {
        self.queue.size()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn push(&self, item: T) -> Result<(), QueueError> {
        self.queue.push(item)
    }

    pub fn pop(&self) -> Option<T> {
        self.queue.pop()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn state(&self) -> WorkerState {
        self.handle.state()
    }

    pub fn join(&mut self) -> Result<(), WorkerError> {
        self.handle.join()
    }
}

impl<T> Drop for Producer<T> {
    fn drop(&mut self) {
        // The handle joins after this; a worker parked on a full queue
        // must be released first.
        self.handle.stop();
        self.queue.close();
    }
}

fn produce_loop<P: Produce>(
    control: &WorkerControl,
    mut source: P,
    queue: &BoundedQueue<P::Item>,
    delay: Duration,
    mut rng: WorkerRng,
) {
    let worker = control.id();
    info!(worker, queue = queue.id(), "Started working");

    while !control.should_stop() {
        let item = source.generate_next(&mut rng);
        match queue.push(item) {
            Ok(()) => {}
            Err(e @ QueueError::Closed { .. }) => {
                info!(worker, "Queue closed, stopping: {}", e);
                break;
            }
            Err(e) => {
                error!(worker, "Push failed, stopping: {}", e);
                break;
            }
        }
        source.on_produced(worker, &item, queue.size());
        thread::sleep(delay);
    }

    info!(worker, queue_size = queue.size(), "Finished working");
}
