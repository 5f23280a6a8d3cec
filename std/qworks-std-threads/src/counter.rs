///
/// Completion counter shared by processing workers and the orchestrator.
///
/// Only ever incremented, one step per successfully applied function.
///

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CompletionCounter {
    count: AtomicU64,
}

impl CompletionCounter {
    pub const fn new() -> Self {
        Self { count: AtomicU64::new(0) }
    }

    /// Record one completion and return the new total
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn reached(&self, target: u64) -> bool {
        self.get() >= target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counter_basic() {
        let counter = CompletionCounter::new();
        assert_eq!(counter.get(), 0);
        assert!(counter.reached(0));
        assert!(!counter.reached(1));

        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert!(counter.reached(2));
    }

    #[test]
    fn test_counter_concurrent() {
        let counter = Arc::new(CompletionCounter::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..100 {
                        let now = counter.increment();
                        assert!(now > last);
                        last = now;
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(counter.get(), 1000);
    }
}
