///
/// End-to-end orchestration tests
///
/// Each test runs a full `Orchestrator::run` with millisecond delays loaded
/// from `tests/fixtures/fast.toml`, then checks the returned report.
///
/// Run all:  `cargo test -p qworks --test orchestration`
///

use std::path::PathBuf;
use std::time::Duration;

use qworks::{load_config_file, Orchestrator, Role, RunConfig};

fn fast_config(nf: usize, nd: usize, np: usize, target: u64) -> RunConfig {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("tests");
    p.push("fixtures");
    p.push("fast.toml");
    let file = load_config_file(&p).expect("fixture config must load");
    RunConfig::new(nf, nd, np, target).with_file(file)
}

#[test]
fn test_run_reaches_target() {
    let report = Orchestrator::new(fast_config(2, 3, 2, 5)).run().unwrap();

    assert!(!report.timed_out, "run timed out:\n{}", report);
    assert!(report.applied >= 5);
    assert!(report.reached_target());
    assert_eq!(report.seed, 1234);
    assert_eq!(report.queues.len(), 5);
    assert_eq!(report.processors.len(), 2);

    let applied_by_workers: u64 = report.processors.iter().map(|p| p.stats.applied).sum();
    assert_eq!(applied_by_workers, report.applied);
}

#[test]
fn test_queues_never_exceed_capacity() {
    let report = Orchestrator::new(fast_config(1, 2, 3, 3)).run().unwrap();

    for q in &report.queues {
        assert!(q.size <= q.capacity, "queue {} over capacity", q.queue);
    }
    let data: Vec<_> = report.queues.iter().filter(|q| q.role == Role::Data).collect();
    assert_eq!(data.len(), 2);
    assert!(data.iter().all(|q| q.capacity == 20));
}

#[test]
fn test_distinct_queue_ids() {
    let report = Orchestrator::new(fast_config(2, 2, 1, 1)).run().unwrap();

    let mut ids: Vec<u64> = report.queues.iter().map(|q| q.queue).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_no_processors_times_out() {
    let mut config = fast_config(1, 1, 0, 1);
    config.tuning.timeout_secs = 1;

    let report = Orchestrator::new(config).run().unwrap();

    assert!(report.timed_out);
    assert_eq!(report.applied, 0);
    assert!(report.processors.is_empty());
    assert!(report.elapsed >= Duration::from_secs(1));
}

#[test]
fn test_no_producers_times_out_cleanly() {
    let mut config = fast_config(0, 0, 2, 1);
    config.tuning.timeout_secs = 1;

    let report = Orchestrator::new(config).run().unwrap();

    assert!(report.timed_out);
    assert!(report.queues.is_empty());
    assert!(report.processors.iter().all(|p| p.stats.applied == 0));
}
