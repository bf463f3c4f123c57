//! Operational counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of directory counters
///
/// Relaxed atomics: each counter is exact, cross-counter reads are not
/// a consistent cut.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    students_created: AtomicU64,
    students_updated: AtomicU64,
    students_deleted: AtomicU64,
    clears: AtomicU64,
    duplicate_rejections: AtomicU64,
    invalid_input_rejections: AtomicU64,
    store_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_students_created(&self) {
        self.students_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_students_updated(&self) {
        self.students_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_students_deleted(&self) {
        self.students_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_clears(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_duplicate_rejections(&self) {
        self.duplicate_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_invalid_input(&self) {
        self.invalid_input_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            students_created: self.students_created.load(Ordering::Relaxed),
            students_updated: self.students_updated.load(Ordering::Relaxed),
            students_deleted: self.students_deleted.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            duplicate_rejections: self.duplicate_rejections.load(Ordering::Relaxed),
            invalid_input_rejections: self.invalid_input_rejections.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub students_created: u64,
    pub students_updated: u64,
    pub students_deleted: u64,
    pub clears: u64,
    pub duplicate_rejections: u64,
    pub invalid_input_rejections: u64,
    pub store_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zeroed() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.students_created, 0);
        assert_eq!(snapshot.store_failures, 0);
    }

    #[test]
    fn test_increments() {
        let registry = MetricsRegistry::new();
        registry.increment_students_created();
        registry.increment_students_created();
        registry.increment_students_updated();
        registry.increment_students_deleted();
        registry.increment_clears();
        registry.increment_duplicate_rejections();
        registry.increment_invalid_input();
        registry.increment_store_failures();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.students_created, 2);
        assert_eq!(snapshot.students_updated, 1);
        assert_eq!(snapshot.students_deleted, 1);
        assert_eq!(snapshot.clears, 1);
        assert_eq!(snapshot.duplicate_rejections, 1);
        assert_eq!(snapshot.invalid_input_rejections, 1);
        assert_eq!(snapshot.store_failures, 1);
    }

    #[test]
    fn test_snapshot_serializes_flat() {
        let registry = MetricsRegistry::new();
        registry.increment_clears();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["clears"], 1);
        assert_eq!(json["students_created"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_students_created();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().students_created, 800);
    }
}
