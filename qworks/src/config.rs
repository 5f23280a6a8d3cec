///
/// # Run Configuration
///
/// A run is described by four counts taken from the command line plus a set
/// of timing knobs that normally keep their defaults. The knobs can be
/// overridden from a TOML file:
///
/// ```toml
/// seed = 42
///
/// [tuning]
/// capacity_per_producer = 10
/// warmup_ms = 1000
/// poll_interval_ms = 500
/// timeout_secs = 60
/// data_delay_ms = 200
/// data_delay_step_ms = 50
/// function_delay_ms = 300
/// function_delay_step_ms = 75
/// processor_delay_ms = 100
/// processor_delay_step_ms = 50
/// idle_ms = 100
/// skip_ms = 50
/// ```
///
/// Every field is optional; missing ones fall back to the values above.
///
/// ## Worker Delays
///
/// Producer pauses grow with the worker id (`base + (id % 5) * step`) and
/// processor pauses with `id % 3`, so workers started together drift apart
/// instead of waking in lockstep.
///

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    pub capacity_per_producer: usize,
    pub warmup_ms: u64,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
    pub data_delay_ms: u64,
    pub data_delay_step_ms: u64,
    pub function_delay_ms: u64,
    pub function_delay_step_ms: u64,
    pub processor_delay_ms: u64,
    pub processor_delay_step_ms: u64,
    pub idle_ms: u64,
    pub skip_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            capacity_per_producer: 10,
            warmup_ms: 1000,
            poll_interval_ms: 500,
            timeout_secs: 60,
            data_delay_ms: 200,
            data_delay_step_ms: 50,
            function_delay_ms: 300,
            function_delay_step_ms: 75,
            processor_delay_ms: 100,
            processor_delay_step_ms: 50,
            idle_ms: 100,
            skip_ms: 50,
        }
    }
}

impl Tuning {
    pub fn data_delay(&self, worker_id: u64) -> Duration {
        stepped(self.data_delay_ms, self.data_delay_step_ms, worker_id % 5)
    }

    pub fn function_delay(&self, worker_id: u64) -> Duration {
        stepped(self.function_delay_ms, self.function_delay_step_ms, worker_id % 5)
    }

    pub fn processor_delay(&self, worker_id: u64) -> Duration {
        stepped(self.processor_delay_ms, self.processor_delay_step_ms, worker_id % 3)
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn idle(&self) -> Duration {
        Duration::from_millis(self.idle_ms)
    }

    pub fn skip(&self) -> Duration {
        Duration::from_millis(self.skip_ms)
    }
}

fn stepped(base_ms: u64, step_ms: u64, steps: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_add(step_ms.saturating_mul(steps)))
}

/// Contents of a `--config` file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub seed: Option<u64>,
    pub tuning: Tuning,
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<ConfigFile, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub function_workers: usize,
    pub data_workers: usize,
    pub processing_workers: usize,
    pub target: u64,
    pub seed: Option<u64>,
    pub tuning: Tuning,
}

impl RunConfig {
    pub fn new(
        function_workers: usize,
        data_workers: usize,
        processing_workers: usize,
        target: u64,
    ) -> Self {
        Self {
            function_workers,
            data_workers,
            processing_workers,
            target,
            seed: None,
            tuning: Tuning::default(),
        }
    }

    /// Take seed and tuning from a config file
    pub fn with_file(mut self, file: ConfigFile) -> Self {
        self.seed = file.seed.or(self.seed);
        self.tuning = file.tuning;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tuning.capacity_per_producer == 0 {
            return Err(ConfigError::Invalid(
                "capacity_per_producer must be at least 1".to_string(),
            ));
        }
        if self.tuning.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn data_queue_capacity(&self) -> usize {
        queue_capacity(self.data_workers, self.tuning.capacity_per_producer)
    }

    pub fn function_queue_capacity(&self) -> usize {
        queue_capacity(self.function_workers, self.tuning.capacity_per_producer)
    }
}

/// Queue size for one role, proportional to the producers in that role
pub fn queue_capacity(producers: usize, per_producer: usize) -> usize {
    producers.saturating_mul(per_producer).max(1)
}
