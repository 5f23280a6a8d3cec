///
/// qworks - Bounded-queue worker orchestration
///
/// Producer threads fill bounded queues with random typed values and
/// arithmetic functions. Processing threads pick queue pairs at random,
/// shuffle values between data queues and apply functions to data until a
/// shared target number of applications is reached.
///
/// - config: run parameters and TOML tuning overrides
/// - errors: configuration and setup failures
/// - logging: `tracing` subscriber setup
/// - producer: data and function producer workers
/// - processor: processing workers and their per-step operations
/// - orchestrator: run lifecycle and final report
///
/// Entry point:
/// - `Orchestrator::run`: execute one run and return its `RunReport`
///

pub mod config;
pub mod errors;
pub mod logging;
pub mod orchestrator;
pub mod processor;
pub mod producer;

pub use config::{load_config_file, parse_config_str, ConfigFile, RunConfig, Tuning};
pub use errors::{ConfigError, RunError};
pub use orchestrator::{Orchestrator, ProcessorReport, QueueReport, Role, RunReport};
pub use processor::{Processor, ProcessorStats, QueueSet, StatsSnapshot, StepOutcome};
pub use producer::{DataProducer, DataSource, FunctionProducer, FunctionSource, Produce, Producer};
