///
/// qworks error types.
///
/// Configuration problems are reported before any worker starts. Runtime
/// failures inside a worker stay inside that worker and are only logged;
/// the variants here cover what can stop a run from being set up at all.
///

use std::path::PathBuf;
use thiserror::Error;

use qworks_std_threads::WorkerError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Worker(#[from] WorkerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/qworks.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("Failed to read config"));
        assert!(err.to_string().contains("/tmp/qworks.toml"));

        let err = ConfigError::Invalid("poll_interval_ms must be positive".to_string());
        assert!(err.to_string().contains("Invalid config"));
        assert!(err.to_string().contains("poll_interval_ms"));

        let err = RunError::from(WorkerError::Panicked { id: 7 });
        assert_eq!(err.to_string(), "Worker 7 panicked");
    }
}
