//! Row selection keyed by record id.
//!
//! Selection is independent of filter, sort and page: a row stays selected
//! while it is filtered out or on another page. Ids are only dropped when
//! the record leaves the source collection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A change to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionUpdate<K> {
    /// Flip one id.
    Toggle(K),
    /// Flip the visible page: select all of it, or deselect all of it when
    /// every id is already selected.
    TogglePage(Vec<K>),
    /// Deselect everything.
    Clear,
}

/// Tracks selected rows by their ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection<K: Ord> {
    selected: BTreeSet<K>,
}

impl<K: Ord> Default for Selection<K> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> Selection<K> {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an id is selected.
    pub fn is_selected(&self, id: &K) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Iterate selected ids in order.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.selected.iter()
    }

    /// Copy of the selected ids.
    pub fn ids(&self) -> BTreeSet<K> {
        self.selected.clone()
    }

    /// Apply an update. Returns true if the selection changed.
    pub fn apply(&mut self, update: SelectionUpdate<K>) -> bool {
        match update {
            SelectionUpdate::Toggle(id) => {
                if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
                true
            }
            SelectionUpdate::TogglePage(ids) => self.toggle_page(ids),
            SelectionUpdate::Clear => {
                let changed = !self.selected.is_empty();
                self.selected.clear();
                changed
            }
        }
    }

    /// Whether every id in `ids` is selected. False for an empty page.
    pub fn all_selected<'a>(&self, ids: impl IntoIterator<Item = &'a K>) -> bool
    where
        K: 'a,
    {
        let mut any = false;
        for id in ids {
            if !self.selected.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    fn toggle_page(&mut self, ids: Vec<K>) -> bool {
        if ids.is_empty() {
            return false;
        }
        if self.all_selected(ids.iter()) {
            for id in &ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(ids);
        }
        true
    }

    /// Remove the given ids. Returns the number removed.
    pub fn remove_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a K>) -> usize
    where
        K: 'a,
    {
        ids.into_iter().filter(|id| self.selected.remove(*id)).count()
    }

    /// Keep only ids for which `live` returns true. Returns the number pruned.
    pub fn retain(&mut self, mut live: impl FnMut(&K) -> bool) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| live(id));
        before - self.selected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut sel = Selection::new();
        sel.apply(SelectionUpdate::Toggle(3));
        assert!(sel.is_selected(&3));
        sel.apply(SelectionUpdate::Toggle(3));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_toggle_page_selects_then_deselects() {
        let mut sel = Selection::new();
        sel.apply(SelectionUpdate::Toggle(9));
        sel.apply(SelectionUpdate::Toggle(1));

        // Partially selected page: selects the rest
        sel.apply(SelectionUpdate::TogglePage(vec![1, 2, 3]));
        assert_eq!(sel.ids(), BTreeSet::from([1, 2, 3, 9]));

        // Fully selected page: deselects only that page
        sel.apply(SelectionUpdate::TogglePage(vec![1, 2, 3]));
        assert_eq!(sel.ids(), BTreeSet::from([9]));
    }

    #[test]
    fn test_toggle_empty_page_is_noop() {
        let mut sel: Selection<u32> = Selection::new();
        assert!(!sel.apply(SelectionUpdate::TogglePage(vec![])));
        assert!(!sel.all_selected([].iter()));
    }

    #[test]
    fn test_retain_and_remove() {
        let mut sel = Selection::new();
        sel.apply(SelectionUpdate::TogglePage(vec![1, 2, 3, 4]));
        assert_eq!(sel.retain(|id| *id != 2), 1);
        assert_eq!(sel.remove_all([1, 7].iter()), 1);
        assert_eq!(sel.ids(), BTreeSet::from([3, 4]));
        assert!(sel.apply(SelectionUpdate::Clear));
        assert!(!sel.apply(SelectionUpdate::Clear));
    }
}
