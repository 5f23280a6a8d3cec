///
/// Logging setup.
///
/// Workers log through `tracing`; the binary installs one `fmt` subscriber
/// on stderr so stdout only carries the final report.
///

use tracing::Level;

/// Install the global subscriber. Later calls are ignored.
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_max_level(level)
        .with_thread_names(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init(Level::WARN);
        init(Level::DEBUG);
        tracing::warn!("still logging");
    }
}
