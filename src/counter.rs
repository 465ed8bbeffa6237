//! Process-wide click counter shared by all sessions.

use std::sync::atomic::{AtomicU64, Ordering};

/// Total-clicks counter. Lives as long as the server process; every
/// connected session increments the same instance through `AppState`.
#[derive(Debug, Default)]
pub struct ClickCounter {
    total: AtomicU64,
}

impl ClickCounter {
    pub fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
        }
    }

    /// Add one click and return the new total.
    /// `fetch_add` guarantees no lost updates under concurrent callers;
    /// each call observes a distinct new value.
    pub fn increment(&self) -> u64 {
        self.total.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current total without mutating it.
    pub fn current(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_increment_returns_new_total() {
        let counter = ClickCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_concurrent_increments_lose_no_updates() {
        let counter = Arc::new(ClickCounter::new());
        let threads: u64 = 8;
        let per_thread: u64 = 1000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..per_thread {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.current(), threads * per_thread);
    }
}
