use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of searches allowed per run.
pub const DEFAULT_CEILING: usize = 4;

/// Per-run search budget.
///
/// Starts at the ceiling and only ever counts down. Every unit is taken with
/// a compare-and-decrement, so concurrent callers can never overspend.
#[derive(Debug)]
pub struct SearchBudget {
    ceiling: usize,
    remaining: AtomicUsize,
}

impl SearchBudget {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling,
            remaining: AtomicUsize::new(ceiling),
        }
    }

    /// Take one unit. Returns `false` once the budget is spent.
    pub fn try_consume(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn consumed(&self) -> usize {
        self.ceiling - self.remaining()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        let remaining = self.remaining();
        BudgetSnapshot {
            ceiling: self.ceiling,
            remaining,
            consumed: self.ceiling - remaining,
        }
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}

/// Serializable view of a budget at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetSnapshot {
    pub ceiling: usize,
    pub remaining: usize,
    pub consumed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_budget_counts_down_and_stops_at_zero() {
        let budget = SearchBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(!budget.try_consume());
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.consumed(), 2);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_zero_ceiling_refuses_immediately() {
        let budget = SearchBudget::new(0);
        assert!(!budget.try_consume());
        assert_eq!(budget.snapshot(), BudgetSnapshot { ceiling: 0, remaining: 0, consumed: 0 });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consumers_never_overspend() {
        let budget = Arc::new(SearchBudget::new(5));
        let mut handles = Vec::new();
        for _ in 0..32 {
            let budget = Arc::clone(&budget);
            handles.push(tokio::spawn(async move { budget.try_consume() }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        assert_eq!(granted, 5);
        assert_eq!(budget.remaining(), 0);
        assert_eq!(budget.consumed(), 5);
    }
}
