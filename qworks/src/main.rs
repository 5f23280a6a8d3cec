///
/// qworks CLI
///
/// qworks <function-workers> <data-workers> <processing-workers> <target>
///
/// Runs until <target> functions have been applied or the timeout expires,
/// then prints the final statistics on stdout. Logs go to stderr.
///

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing::Level;

use qworks::{load_config_file, logging, Orchestrator, RunConfig};

#[derive(Parser)]
#[command(name = "qworks")]
#[command(author, version, about = "Producer/processor workers over bounded queues", long_about = None)]
#[command(allow_negative_numbers = true)]
struct Cli {
    /// Number of function producer workers
    function_workers: usize,

    /// Number of data producer workers
    data_workers: usize,

    /// Number of processing workers
    processing_workers: usize,

    /// Function applications to wait for
    target: u64,

    /// TOML file with seed and [tuning] overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root seed for every worker RNG
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds to wait for the target before giving up
    #[arg(long)]
    timeout: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            std::process::exit(1);
        }
    };

    println!(
        "Starting with {} function workers, {} data workers, {} processing workers, target {}",
        config.function_workers, config.data_workers, config.processing_workers, config.target
    );

    match Orchestrator::new(config).run() {
        Ok(report) => {
            print!("{}", report);
            println!("Finished!");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_config(cli: &Cli) -> Result<RunConfig, qworks::ConfigError> {
    let mut config = RunConfig::new(
        cli.function_workers,
        cli.data_workers,
        cli.processing_workers,
        cli.target,
    );
    if let Some(path) = &cli.config {
        config = config.with_file(load_config_file(path)?);
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(timeout) = cli.timeout {
        config.tuning.timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}
