//!
//! Processing Workers
//!
//! Processors are the only workers that touch more than one queue. Each
//! iteration picks two distinct queues at random from the combined index
//! space (data queues first, then function queues) and acts on the pair:
//!
//! - data + data: move one value from the first queue to the second
//! - function + function: nothing to do
//! - data + function (either order): pop one function, take exactly the
//!   number of values it needs from the data queue, evaluate it
//!
//! ## Locking
//!
//! No step ever holds two queue locks. A transfer's pop has returned before
//! its push begins, and every pop here is non-blocking, so the only place a
//! processor can park is pushing into a full destination. That push returns
//! once another worker frees a slot or the queue is closed.
//!
//! ## Lost Items
//!
//! A function whose data queue cannot supply its arguments is discarded.
//! Arguments consumed by an application that then fails (division by zero,
//! overflow) are not returned to their queue.
//!

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, warn};

use qworks_std_random::{pick_two_distinct, WorkerRng};
use qworks_std_threads::{
    BoundedQueue, CompletionCounter, WorkerControl, WorkerError, WorkerHandle, WorkerState,
};
use qworks_std_values::{ArithmeticError, FunctionDescriptor, TypedValue};

pub type DataQueue = BoundedQueue<TypedValue>;
pub type FunctionQueue = BoundedQueue<FunctionDescriptor>;

/// The fixed set of producer queues shared by every processor
#[derive(Debug, Clone, Default)]
pub struct QueueSet {
    data: Arc<[Arc<DataQueue>]>,
    functions: Arc<[Arc<FunctionQueue>]>,
}

/// One queue of a `QueueSet`, classified by role
#[derive(Debug, Clone, Copy)]
pub enum QueueSlot<'a> {
    Data(&'a DataQueue),
    Function(&'a FunctionQueue),
}

impl QueueSet {
    pub fn new(data: Vec<Arc<DataQueue>>, functions: Vec<Arc<FunctionQueue>>) -> Self {
        Self {
            data: data.into(),
            functions: functions.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data(&self) -> &[Arc<DataQueue>] {
        &self.data
    }

    pub fn functions(&self) -> &[Arc<FunctionQueue>] {
        &self.functions
    }

    /// Indices below the data count are data queues, the rest function queues
    pub fn slot(&self, index: usize) -> Option<QueueSlot<'_>> {
        match index.checked_sub(self.data.len()) {
            None => self.data.get(index).map(|q| QueueSlot::Data(q)),
            Some(offset) => self.functions.get(offset).map(|q| QueueSlot::Function(q)),
        }
    }

    /// Tear down every queue, releasing any thread parked on one
    pub fn close_all(&self) {
        for q in self.data.iter() {
            q.close();
        }
        for q in self.functions.iter() {
            q.close();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Moved { value: TypedValue },
    SourceEmpty,
    /// The destination was torn down after the value left the source
    DestinationClosed { value: TypedValue },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied {
        function: FunctionDescriptor,
        args: Vec<TypedValue>,
        result: TypedValue,
        completed: u64,
    },
    NoFunction,
    InsufficientArgs {
        function: FunctionDescriptor,
        needed: usize,
        available: usize,
    },
    Failed {
        function: FunctionDescriptor,
        args: Vec<TypedValue>,
        error: ArithmeticError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// No queues at all
    Idle,
    /// Fewer than two queues
    Skipped,
    FunctionPair,
    Transfer {
        from: u64,
        to: u64,
        outcome: TransferOutcome,
    },
    Apply {
        functions: u64,
        data: u64,
        outcome: ApplyOutcome,
    },
}

/// Move one value from `source` to `destination`, blocking while the
/// destination is full
pub fn transfer(source: &DataQueue, destination: &DataQueue) -> TransferOutcome {
    let Some(value) = source.try_pop() else {
        return TransferOutcome::SourceEmpty;
    };
    match destination.push(value) {
        Ok(()) => TransferOutcome::Moved { value },
        Err(_) => TransferOutcome::DestinationClosed { value },
    }
}

/// Pop one function and apply it to values from `data`.
///
/// The data queue gives up either exactly `required_args()` values or none.
/// `counter` moves only when evaluation succeeds.
pub fn apply(
    functions: &FunctionQueue,
    data: &DataQueue,
    counter: &CompletionCounter,
) -> ApplyOutcome {
    let Some(function) = functions.try_pop() else {
        return ApplyOutcome::NoFunction;
    };

    let needed = function.required_args();
    let Some(args) = data.try_pop_exact(needed) else {
        return ApplyOutcome::InsufficientArgs {
            function,
            needed,
            available: data.size(),
        };
    };

    match function.apply(&args) {
        Ok(result) => ApplyOutcome::Applied {
            function,
            args,
            result,
            completed: counter.increment(),
        },
        Err(error) => ApplyOutcome::Failed { function, args, error },
    }
}

/// One processor iteration over a random queue pair
pub fn step<R: Rng + ?Sized>(
    worker: u64,
    queues: &QueueSet,
    counter: &CompletionCounter,
    rng: &mut R,
) -> StepOutcome {
    if queues.is_empty() {
        return StepOutcome::Idle;
    }
    let Some((first, second)) = pick_two_distinct(rng, queues.len()) else {
        return StepOutcome::Skipped;
    };

    let outcome = match (queues.slot(first), queues.slot(second)) {
        (Some(QueueSlot::Data(from)), Some(QueueSlot::Data(to))) => StepOutcome::Transfer {
            from: from.id(),
            to: to.id(),
            outcome: transfer(from, to),
        },
        (Some(QueueSlot::Function(_)), Some(QueueSlot::Function(_))) => StepOutcome::FunctionPair,
        (Some(QueueSlot::Data(data)), Some(QueueSlot::Function(functions)))
        | (Some(QueueSlot::Function(functions)), Some(QueueSlot::Data(data))) => {
            StepOutcome::Apply {
                functions: functions.id(),
                data: data.id(),
                outcome: apply(functions, data, counter),
            }
        }
        _ => StepOutcome::Skipped,
    };

    log_outcome(worker, &outcome);
    outcome
}

fn log_outcome(worker: u64, outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Idle | StepOutcome::Skipped => {}
        StepOutcome::FunctionPair => debug!(worker, "Both queues are function queues, ignoring"),
        StepOutcome::Transfer { from, to, outcome } => match outcome {
            TransferOutcome::Moved { value } => {
                debug!(worker, from, to, "Transferred {} from queue {} to queue {}", value, from, to)
            }
            TransferOutcome::SourceEmpty => debug!(worker, queue = from, "Source queue empty"),
            TransferOutcome::DestinationClosed { value } => {
                warn!(worker, queue = to, "Destination closed, dropped {}", value)
            }
        },
        StepOutcome::Apply { functions, data, outcome } => match outcome {
            ApplyOutcome::Applied { function, args, result, completed } => info!(
                worker,
                functions,
                data,
                completed,
                "Function: {{{}}}; parameters: {}; result: {}",
                function,
                join_values(args),
                result
            ),
            ApplyOutcome::NoFunction => debug!(worker, queue = functions, "Function queue empty"),
            ApplyOutcome::InsufficientArgs { function, needed, available } => debug!(
                worker,
                queue = data,
                "Not enough data values for {{{}}} (need {}, have {})",
                function,
                needed,
                available
            ),
            ApplyOutcome::Failed { function, args, error } => warn!(
                worker,
                functions,
                data,
                "Function application error: {{{}}}; parameters: {}; {}",
                function,
                join_values(args),
                error
            ),
        },
    }
}

fn join_values(values: &[TypedValue]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Running totals for one processor
#[derive(Debug, Default)]
pub struct ProcessorStats {
    transfers: AtomicU64,
    applied: AtomicU64,
    insufficient: AtomicU64,
    failed: AtomicU64,
    no_ops: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub transfers: u64,
    pub applied: u64,
    pub insufficient: u64,
    pub failed: u64,
    pub no_ops: u64,
}

impl ProcessorStats {
    pub fn record(&self, outcome: &StepOutcome) {
        let counter = match outcome {
            StepOutcome::Transfer { outcome: TransferOutcome::Moved { .. }, .. } => &self.transfers,
            StepOutcome::Apply { outcome: ApplyOutcome::Applied { .. }, .. } => &self.applied,
            StepOutcome::Apply { outcome: ApplyOutcome::InsufficientArgs { .. }, .. } => {
                &self.insufficient
            }
            StepOutcome::Apply { outcome: ApplyOutcome::Failed { .. }, .. } => &self.failed,
            _ => &self.no_ops,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            transfers: self.transfers.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            insufficient: self.insufficient.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            no_ops: self.no_ops.load(Ordering::Relaxed),
        }
    }
}

/// Pauses between processor iterations
#[derive(Debug, Clone, Copy)]
pub struct ProcessorTiming {
    pub delay: Duration,
    pub idle: Duration,
    pub skip: Duration,
}

pub struct Processor {
    handle: WorkerHandle,
    stats: Arc<ProcessorStats>,
}

impl Processor {
    pub fn spawn(
        id: u64,
        queues: QueueSet,
        counter: Arc<CompletionCounter>,
        target: u64,
        timing: ProcessorTiming,
        rng: WorkerRng,
    ) -> Result<Self, WorkerError> {
        info!(worker = id, queues = queues.len(), target, "Processing worker created");

        let stats = Arc::new(ProcessorStats::default());
        let loop_stats = Arc::clone(&stats);
        let control = Arc::new(WorkerControl::new(id));
        let handle = WorkerHandle::spawn(format!("processor-{}", id), control, move |control| {
            process_loop(control, &queues, &counter, target, timing, rng, &loop_stats)
        })?;

        Ok(Self { handle, stats })
    }

    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    pub fn stop(&self) {
        self.handle.stop();
    }

    pub fn state(&self) -> WorkerState {
        self.handle.state()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(&mut self) -> Result<(), WorkerError> {
        self.handle.join()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

fn process_loop(
    control: &WorkerControl,
    queues: &QueueSet,
    counter: &CompletionCounter,
    target: u64,
    timing: ProcessorTiming,
    mut rng: WorkerRng,
    stats: &ProcessorStats,
) {
    let worker = control.id();
    info!(worker, "Started processing");

    while !control.should_stop() {
        if counter.reached(target) {
            control.begin_stopping();
            info!(worker, completed = counter.get(), "Target reached");
            break;
        }

        let outcome = step(worker, queues, counter, &mut rng);
        stats.record(&outcome);

        let pause = match outcome {
            StepOutcome::Idle => timing.idle,
            StepOutcome::Skipped => timing.skip,
            _ => timing.delay,
        };
        thread::sleep(pause);
    }

    info!(worker, "Finished processing");
}
