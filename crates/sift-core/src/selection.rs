//! Multi-selection over item identities
//!
//! Selection is defined over stable identities, never list positions, so it
//! survives filtering, sorting, and regrouping untouched. Visibility rules
//! (`select_all` over visible items only) are enforced by the controller,
//! which decides what "visible" means; this type just keeps the set.

use std::collections::HashSet;
use std::hash::Hash;

/// Set of selected item identities.
#[derive(Debug, Clone)]
pub struct Selection<K> {
    selected: HashSet<K>,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Selection<K> {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: K) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    /// Add every identity in `ids`. Returns the number actually added.
    pub fn extend<I: IntoIterator<Item = K>>(&mut self, ids: I) -> usize {
        let before = self.selected.len();
        self.selected.extend(ids);
        self.selected.len() - before
    }

    /// Clear the selection. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let was_empty = self.selected.is_empty();
        self.selected.clear();
        !was_empty
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Snapshot of the full selection.
    #[must_use]
    pub fn snapshot(&self) -> HashSet<K> {
        self.selected.clone()
    }
}
