//! List/selection state for the displayed sequence.
//!
//! Holds the rows currently on screen plus the set of selected row indices
//! and the multi-select mode flag. Every mutation reports the structural
//! changes it made as [`ListChange`]s so the view can redraw incrementally.
//!
//! Indices handed in by the view may be stale (an asynchronous reload can
//! shrink the list between the gesture and the mutation), so out-of-bounds
//! indices are ignored everywhere instead of panicking.

use std::collections::BTreeSet;

use crate::events::ListChange;

/// Multi-select mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Taps open items. Initial and resting state.
    #[default]
    Idle,
    /// Taps toggle item selection.
    Selecting,
}

/// Result of a tap gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Not selecting: the caller should open the item at this index.
    Open(usize),
    /// Selecting: the row was toggled.
    Toggled(ListChange),
    /// Stale index; nothing happened.
    Ignored,
}

/// Ordered rows plus selection state.
#[derive(Debug, Clone)]
pub struct SelectionList<T> {
    items: Vec<T>,
    selected: BTreeSet<usize>,
    mode: SelectionMode,
}

impl<T> Default for SelectionList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: BTreeSet::new(),
            mode: SelectionMode::Idle,
        }
    }
}

impl<T> SelectionList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Read-only view of the rows.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected indices, ascending.
    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    /// Selected rows, in display order.
    pub fn selected_items(&self) -> Vec<&T> {
        self.selected
            .iter()
            .filter_map(|&i| self.items.get(i))
            .collect()
    }

    /// Replace all rows. Selection and mode are reset since old indices
    /// no longer mean anything.
    pub fn replace(&mut self, items: Vec<T>) -> Vec<ListChange> {
        self.items = items;
        self.selected.clear();
        self.mode = SelectionMode::Idle;
        vec![ListChange::Reset]
    }

    /// Insert a row at the top, shifting selected indices down by one.
    pub fn insert_front(&mut self, item: T) -> Vec<ListChange> {
        self.items.insert(0, item);
        self.selected = self.selected.iter().map(|i| i + 1).collect();
        vec![ListChange::Inserted(0)]
    }

    /// Edit the row at `index` in place.
    pub fn update_at<F>(&mut self, index: usize, f: F) -> Option<ListChange>
    where
        F: FnOnce(&mut T),
    {
        let item = self.items.get_mut(index)?;
        f(item);
        Some(ListChange::Changed(index))
    }

    /// Flip selection of `index`.
    ///
    /// No-op outside multi-select mode or when `index` is out of bounds.
    pub fn toggle_selection(&mut self, index: usize) -> Option<ListChange> {
        if !self.is_selecting() || index >= self.items.len() {
            return None;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
        Some(ListChange::Changed(index))
    }

    /// Empty the selected set. Mode is left as is.
    pub fn clear_selection(&mut self) -> Vec<ListChange> {
        std::mem::take(&mut self.selected)
            .into_iter()
            .map(ListChange::Changed)
            .collect()
    }

    /// Remove rows at the given positions, highest first, then clear the
    /// selection unconditionally.
    ///
    /// Duplicates and out-of-range positions are ignored. The returned
    /// `Removed` changes are in the order they were applied.
    pub fn remove_at_positions<I>(&mut self, positions: I) -> Vec<ListChange>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.items.len();
        let positions: BTreeSet<usize> = positions.into_iter().filter(|&i| i < len).collect();

        let mut changes = Vec::with_capacity(positions.len());
        for &index in positions.iter().rev() {
            self.items.remove(index);
            changes.push(ListChange::Removed(index));
        }

        self.selected.clear();
        changes
    }

    /// Long-press: enter multi-select mode and toggle the pressed row.
    ///
    /// Ignored while already selecting or for a stale index.
    pub fn long_press(&mut self, index: usize) -> Vec<ListChange> {
        if self.is_selecting() || index >= self.items.len() {
            return Vec::new();
        }
        self.mode = SelectionMode::Selecting;
        self.toggle_selection(index).into_iter().collect()
    }

    /// Tap: open when idle, toggle when selecting.
    ///
    /// Deselecting the last selected row leaves multi-select mode.
    pub fn tap(&mut self, index: usize) -> TapOutcome {
        if index >= self.items.len() {
            return TapOutcome::Ignored;
        }
        match self.mode {
            SelectionMode::Idle => TapOutcome::Open(index),
            SelectionMode::Selecting => match self.toggle_selection(index) {
                Some(change) => {
                    if self.selected.is_empty() {
                        self.mode = SelectionMode::Idle;
                    }
                    TapOutcome::Toggled(change)
                }
                None => TapOutcome::Ignored,
            },
        }
    }

    /// Explicit cancel: clear selection and return to idle.
    pub fn cancel(&mut self) -> Vec<ListChange> {
        self.mode = SelectionMode::Idle;
        self.clear_selection()
    }

    /// Apply a confirmed deletion of the given positions and return to idle.
    pub fn finish_delete<I>(&mut self, positions: I) -> Vec<ListChange>
    where
        I: IntoIterator<Item = usize>,
    {
        let changes = self.remove_at_positions(positions);
        self.mode = SelectionMode::Idle;
        changes
    }
}

impl<T: Clone> SelectionList<T> {
    /// Owned copy of the rows for handing to the view.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }
}
