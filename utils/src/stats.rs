//! Named event counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A fixed set of thread-safe counters, declared up front.
///
/// Incrementing a name that was not declared is a no-op, so counters can be
/// bumped from hot paths without error handling.
pub struct StatsCounter {
    counters: BTreeMap<&'static str, AtomicU64>,
}

impl StatsCounter {
    pub fn new(names: &[&'static str]) -> Self {
        let counters = names.iter().map(|&name| (name, AtomicU64::new(0))).collect();
        Self { counters }
    }

    pub fn increment(&self, name: &str) {
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// All counters, in name order.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        self.counters
            .iter()
            .map(|(&k, v)| (k, v.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_declared_names_only() {
        let stats = StatsCounter::new(&["opened", "resolved"]);
        stats.increment("opened");
        stats.increment("opened");
        stats.increment("bogus");
        assert_eq!(stats.get("opened"), 2);
        assert_eq!(stats.get("resolved"), 0);
        assert_eq!(stats.get("bogus"), 0);
        assert_eq!(
            stats.snapshot().into_iter().collect::<Vec<_>>(),
            vec![("opened", 2), ("resolved", 0)]
        );
    }
}
