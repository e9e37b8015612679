//! At-most-once admission of transaction signatures

use std::collections::{HashSet, VecDeque};

/// Signatures already admitted for the current watch.
///
/// Without a capacity every signature is kept for the lifetime of the watch.
/// With one, the oldest admissions are evicted first once the index is full.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
    order: VecDeque<String>,
    capacity: Option<usize>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Admit `signature`, returning `true` only the first time it is seen.
    pub fn admit(&mut self, signature: &str) -> bool {
        if self.seen.contains(signature) {
            return false;
        }

        self.seen.insert(signature.to_string());
        if let Some(capacity) = self.capacity {
            self.order.push_back(signature.to_string());
            while self.order.len() > capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.seen.remove(&evicted);
                }
            }
        }
        true
    }

    /// Release a signature so that it can be admitted again.
    ///
    /// Only for signatures whose processing never produced a side effect.
    pub fn forget(&mut self, signature: &str) -> bool {
        let removed = self.seen.remove(signature);
        if removed && self.capacity.is_some() {
            self.order.retain(|s| s != signature);
        }
        removed
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.seen.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admit_once() {
        let mut index = DedupIndex::new();
        assert!(index.admit("a"));
        assert!(!index.admit("a"));
        assert!(index.admit("b"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_forget_allows_readmission() {
        let mut index = DedupIndex::new();
        assert!(index.admit("a"));
        assert!(index.forget("a"));
        assert!(!index.forget("a"));
        assert!(index.admit("a"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut index = DedupIndex::with_capacity_limit(Some(2));
        assert!(index.admit("a"));
        assert!(index.admit("b"));
        assert!(index.admit("c"));
        assert_eq!(index.len(), 2);
        assert!(!index.contains("a"));
        assert!(index.contains("b") && index.contains("c"));

        // a forgotten entry does not count against the bound
        assert!(index.forget("b"));
        assert!(index.admit("d"));
        assert!(index.contains("c") && index.contains("d"));
    }
}
