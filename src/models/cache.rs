//! Cache plumbing for the course aggregate.
//!
//! The process list of a course is derived state: it must be dropped whenever
//! a block or issue mutation could change process boundaries. Blocks and
//! issues hold a clone of [`ProcessCache`] so they can signal that without a
//! back reference to the course itself. The model is single-threaded by
//! contract, hence `Rc` rather than `Arc`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use super::IndividualIssue;

#[derive(Debug)]
struct ProcessCacheState {
    /// List of lists of individual issues, each representing a process.
    processes: Vec<Vec<IndividualIssue>>,

    /// While false, [`ProcessCache::clear`] is a no-op. Turned off during
    /// XML loading so the replayed mutations don't wipe the process lists
    /// being reconstructed.
    volatile: bool,
}

/// Shared handle to the derived process list of a course.
#[derive(Debug, Clone)]
pub(crate) struct ProcessCache(Rc<RefCell<ProcessCacheState>>);

impl ProcessCache {
    pub fn new() -> Self {
        ProcessCache(Rc::new(RefCell::new(ProcessCacheState {
            processes: Vec::new(),
            volatile: true,
        })))
    }

    /// Drop the derived process list, unless volatility is latched off.
    pub fn clear(&self) {
        let mut state = self.0.borrow_mut();
        if state.volatile {
            state.processes.clear();
        }
    }

    pub fn set_volatile(&self, volatile: bool) {
        self.0.borrow_mut().volatile = volatile;
    }

    pub fn replace(&self, processes: Vec<Vec<IndividualIssue>>) {
        self.0.borrow_mut().processes = processes;
    }

    pub fn push(&self, process: Vec<IndividualIssue>) {
        self.0.borrow_mut().processes.push(process);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().processes.len()
    }

    /// Clone out the current process list.
    pub fn snapshot(&self) -> Vec<Vec<IndividualIssue>> {
        self.0.borrow().processes.clone()
    }
}

impl Default for ProcessCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Content-checked lookup cache.
///
/// Entries carry no expiry; instead every read re-checks a validity
/// predicate and evicts the entry on mismatch, falling back to a caller
/// supplied scan that refills the cache.
#[derive(Debug, Default)]
pub(crate) struct CheckedCache<K, V> {
    entries: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V: Copy> CheckedCache<K, V> {
    pub fn new() -> Self {
        CheckedCache {
            entries: HashMap::new(),
        }
    }

    /// Look up `key`, validating a cached entry before trusting it.
    pub fn resolve(
        &mut self,
        key: &K,
        valid: impl Fn(&V) -> bool,
        refill: impl FnOnce() -> Option<V>,
    ) -> Option<V> {
        if let Some(value) = self.entries.get(key) {
            if valid(value) {
                return Some(*value);
            }
            self.entries.remove(key);
        }
        let value = refill()?;
        self.entries.insert(key.clone(), value);
        Some(value)
    }
}

impl<K: Eq + Hash + Clone> CheckedCache<K, usize> {
    /// Account for the removal of a position in the indexed collection:
    /// entries pointing at it are dropped, later positions shift down.
    pub fn remove_index(&mut self, index: usize) {
        self.entries.retain(|_, value| *value != index);
        for value in self.entries.values_mut() {
            if *value > index {
                *value -= 1;
            }
        }
    }
}
