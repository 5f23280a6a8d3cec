//!
//! Run Orchestration
//!
//! Wires producers, queues and processors together for one run:
//!
//! 1. Validate the config and fix the root seed
//! 2. Create one queue per producer and start data producers (ids from 1)
//!    and function producers (ids from 100)
//! 3. Let the producers warm up
//! 4. Start processors (ids from 200) over the complete queue set
//! 5. Poll the completion counter until the target or the timeout
//! 6. Stop processors, stop producers, close every queue, join everything
//!
//! Step 6 closes queues after signalling stop so no worker stays parked on
//! a full queue and every join returns.
//!

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use qworks_std_random::SeedSource;
use qworks_std_threads::{BoundedQueue, CompletionCounter, WorkerError};

use crate::config::RunConfig;
use crate::errors::RunError;
use crate::processor::{Processor, ProcessorTiming, QueueSet, StatsSnapshot};
use crate::producer::{DataProducer, DataSource, FunctionProducer, FunctionSource};

pub const DATA_WORKER_BASE_ID: u64 = 1;
pub const FUNCTION_WORKER_BASE_ID: u64 = 100;
pub const PROCESSING_WORKER_BASE_ID: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Data,
    Function,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Data => write!(f, "Data"),
            Role::Function => write!(f, "Function"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueReport {
    pub role: Role,
    pub worker: u64,
    pub queue: u64,
    pub size: usize,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorReport {
    pub worker: u64,
    pub stats: StatsSnapshot,
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub applied: u64,
    pub target: u64,
    pub timed_out: bool,
    pub seed: u64,
    pub elapsed: Duration,
    pub queues: Vec<QueueReport>,
    pub processors: Vec<ProcessorReport>,
}

impl RunReport {
    pub fn reached_target(&self) -> bool {
        self.applied >= self.target
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Final Statistics ===")?;
        writeln!(f, "Applied functions: {} / {}", self.applied, self.target)?;
        if self.timed_out {
            writeln!(f, "Timed out before reaching the target")?;
        }
        writeln!(f, "Elapsed: {:.2}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "Seed: {}", self.seed)?;

        for q in &self.queues {
            writeln!(
                f,
                "{} worker {} (queue {}): {}/{} items",
                q.role, q.worker, q.queue, q.size, q.capacity
            )?;
        }
        for p in &self.processors {
            let s = &p.stats;
            writeln!(
                f,
                "Processing worker {}: applied {}, transfers {}, insufficient {}, failed {}, no-ops {}",
                p.worker, s.applied, s.transfers, s.insufficient, s.failed, s.no_ops
            )?;
        }
        Ok(())
    }
}

pub struct Orchestrator {
    config: RunConfig,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run to completion or timeout. Returns once every worker has joined.
    pub fn run(&self) -> Result<RunReport, RunError> {
        let config = &self.config;
        config.validate()?;
        let tuning = &config.tuning;

        let seeds = config
            .seed
            .map(SeedSource::new)
            .unwrap_or_else(SeedSource::from_entropy);
        info!(
            function_workers = config.function_workers,
            data_workers = config.data_workers,
            processing_workers = config.processing_workers,
            target = config.target,
            seed = seeds.root(),
            "Starting run"
        );

        let started = Instant::now();
        let mut crew = Crew::default();

        let data_capacity = config.data_queue_capacity();
        for id in (0..config.data_workers as u64).map(|i| DATA_WORKER_BASE_ID + i) {
            let queue = Arc::new(BoundedQueue::new(data_capacity));
            crew.data.push(DataProducer::spawn(
                DataSource::default(),
                id,
                queue,
                tuning.data_delay(id),
                seeds.worker_rng(id),
            )?);
        }

        let function_capacity = config.function_queue_capacity();
        for id in (0..config.function_workers as u64).map(|i| FUNCTION_WORKER_BASE_ID + i) {
            let queue = Arc::new(BoundedQueue::new(function_capacity));
            crew.functions.push(FunctionProducer::spawn(
                FunctionSource::default(),
                id,
                queue,
                tuning.function_delay(id),
                seeds.worker_rng(id),
            )?);
        }

        info!(warmup_ms = tuning.warmup_ms, "Waiting for producers to fill queues");
        thread::sleep(tuning.warmup());

        crew.queues = QueueSet::new(
            crew.data.iter().map(|p| Arc::clone(p.queue())).collect(),
            crew.functions.iter().map(|p| Arc::clone(p.queue())).collect(),
        );

        let counter = Arc::new(CompletionCounter::new());
        for id in (0..config.processing_workers as u64).map(|i| PROCESSING_WORKER_BASE_ID + i) {
            let timing = ProcessorTiming {
                delay: tuning.processor_delay(id),
                idle: tuning.idle(),
                skip: tuning.skip(),
            };
            crew.processors.push(Processor::spawn(
                id,
                crew.queues.clone(),
                Arc::clone(&counter),
                config.target,
                timing,
                seeds.worker_rng(id),
            )?);
        }

        let timed_out = monitor(&counter, config.target, tuning.poll_interval(), tuning.timeout());

        crew.shutdown();

        let report = RunReport {
            applied: counter.get(),
            target: config.target,
            timed_out,
            seed: seeds.root(),
            elapsed: started.elapsed(),
            queues: crew.queue_reports(),
            processors: crew.processor_reports(),
        };
        info!(
            applied = report.applied,
            timed_out = report.timed_out,
            "Run finished"
        );
        Ok(report)
    }
}

/// Poll until `target` is reached. Returns `true` on timeout.
fn monitor(counter: &CompletionCounter, target: u64, poll: Duration, timeout: Duration) -> bool {
    let started = Instant::now();
    let deadline = started + timeout;
    info!(target, "Waiting for completion");

    loop {
        let completed = counter.get();
        if completed >= target {
            info!(completed, target, "Target reached");
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            warn!(completed, target, "Timeout reached");
            return true;
        }
        let elapsed = started.elapsed();
        info!(
            completed,
            target,
            elapsed_ms = elapsed.as_millis() as u64,
            "Progress: {}/{} functions processed ({:.1}s elapsed)",
            completed,
            target,
            elapsed.as_secs_f64()
        );
        thread::sleep(poll.min(deadline - now));
    }
}

/// Every worker started by a run.
///
/// Dropping a `Crew` mid-setup (a spawn failed) still releases and joins
/// whatever was already running.
#[derive(Default)]
struct Crew {
    data: Vec<DataProducer>,
    functions: Vec<FunctionProducer>,
    processors: Vec<Processor>,
    queues: QueueSet,
}

impl Crew {
    fn shutdown(&mut self) {
        info!("Stopping all workers");

        for p in &self.processors {
            p.stop();
        }
        for p in &self.data {
            p.stop();
        }
        for p in &self.functions {
            p.stop();
        }

        self.close_queues();

        for p in &mut self.processors {
            log_join(p.id(), p.join());
        }
        for p in &mut self.data {
            log_join(p.id(), p.join());
        }
        for p in &mut self.functions {
            log_join(p.id(), p.join());
        }
    }

    fn close_queues(&self) {
        self.queues.close_all();
        for p in &self.data {
            p.queue().close();
        }
        for p in &self.functions {
            p.queue().close();
        }
    }

    fn queue_reports(&self) -> Vec<QueueReport> {
        let data = self.data.iter().map(|p| QueueReport {
            role: Role::Data,
            worker: p.id(),
            queue: p.queue_id(),
            size: p.queue_size(),
            capacity: p.queue().capacity(),
        });
        let functions = self.functions.iter().map(|p| QueueReport {
            role: Role::Function,
            worker: p.id(),
            queue: p.queue_id(),
            size: p.queue_size(),
            capacity: p.queue().capacity(),
        });
        data.chain(functions).collect()
    }

    fn processor_reports(&self) -> Vec<ProcessorReport> {
        self.processors
            .iter()
            .map(|p| ProcessorReport {
                worker: p.id(),
                stats: p.stats(),
            })
            .collect()
    }
}

impl Drop for Crew {
    fn drop(&mut self) {
        // Processors hold clones of the queues, so they go first.
        for p in &self.processors {
            p.stop();
        }
        self.close_queues();
        self.processors.clear();
    }
}

fn log_join(worker: u64, result: Result<(), WorkerError>) {
    if let Err(e) = result {
        error!(worker, "Join failed: {}", e);
    }
}
