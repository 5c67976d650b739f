use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Cell, CellKey, Selection};
use crate::persist::{PersistenceAdapter, SlotStorage};

/// Normalized `(student, subject, week) -> grades` mapping.
///
/// Every stored cell holds at least one grade; a missing key means no grades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStore {
    cells: BTreeMap<CellKey, Cell>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cell at the key with `grades` verbatim. An empty list
    /// removes the cell.
    pub fn upsert(&mut self, student_id: &str, subject_id: &str, week_id: &str, grades: Vec<i64>) {
        let key = CellKey::new(student_id, subject_id, week_id);
        if grades.is_empty() {
            self.cells.remove(&key);
            return;
        }
        self.cells.insert(
            key,
            Cell {
                student_id: student_id.to_string(),
                subject_id: subject_id.to_string(),
                week_id: week_id.to_string(),
                grades,
            },
        );
    }

    /// Returns false (and changes nothing) when the cell or index is absent.
    pub fn remove_grade_at(
        &mut self,
        student_id: &str,
        subject_id: &str,
        week_id: &str,
        index: usize,
    ) -> bool {
        let key = CellKey::new(student_id, subject_id, week_id);
        let Some(cell) = self.cells.get_mut(&key) else {
            return false;
        };
        if index >= cell.grades.len() {
            return false;
        }
        cell.grades.remove(index);
        if cell.grades.is_empty() {
            self.cells.remove(&key);
        }
        true
    }

    /// Drops every cell in `week_id`; returns how many were removed.
    pub fn clear_week(&mut self, week_id: &str) -> usize {
        let before = self.cells.len();
        self.cells.retain(|k, _| k.week_id != week_id);
        before - self.cells.len()
    }

    pub fn get(&self, student_id: &str, subject_id: &str, week_id: &str) -> Option<&Cell> {
        self.cells
            .get(&CellKey::new(student_id, subject_id, week_id))
    }

    /// Inserts a decoded cell as-is, skipping empty ones. Used on load.
    pub(crate) fn insert_cell(&mut self, cell: Cell) {
        if cell.grades.is_empty() {
            return;
        }
        self.cells.insert(cell.key(), cell);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CellKey, &Cell)> {
        self.cells.iter()
    }

    pub fn cells_in_week<'a>(&'a self, week_id: &'a str) -> impl Iterator<Item = &'a Cell> + 'a {
        self.cells
            .iter()
            .filter(move |(k, _)| k.week_id == week_id)
            .map(|(_, c)| c)
    }

    pub fn weeks_with_data(&self) -> BTreeSet<&str> {
        self.cells.keys().map(|k| k.week_id.as_str()).collect()
    }
}

/// The process-wide gradebook state: cells plus selection, mirrored to
/// durable storage after every mutation.
pub struct Gradebook<S: SlotStorage> {
    cells: CellStore,
    selection: Selection,
    persistence: PersistenceAdapter<S>,
}

impl<S: SlotStorage> Gradebook<S> {
    /// Restores state from the adapter; never fails.
    pub fn open(persistence: PersistenceAdapter<S>, default_selection: Selection) -> Self {
        let (cells, selection) = persistence.load(&default_selection);
        Self {
            cells,
            selection,
            persistence,
        }
    }

    pub fn cells(&self) -> &CellStore {
        &self.cells
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn upsert_cell(&mut self, student_id: &str, subject_id: &str, week_id: &str, grades: Vec<i64>) {
        self.cells.upsert(student_id, subject_id, week_id, grades);
        self.persist();
    }

    pub fn remove_grade(
        &mut self,
        student_id: &str,
        subject_id: &str,
        week_id: &str,
        index: usize,
    ) -> bool {
        let removed = self
            .cells
            .remove_grade_at(student_id, subject_id, week_id, index);
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear_week(&mut self, week_id: &str) -> usize {
        let removed = self.cells.clear_week(week_id);
        self.persist();
        removed
    }

    pub fn set_current_week(&mut self, week_id: &str) {
        self.selection.current_week = week_id.to_string();
        self.persist();
    }

    pub fn set_current_term(&mut self, term_id: &str) {
        self.selection.current_term = term_id.to_string();
        self.persist();
    }

    /// Swaps in a whole state (bundle import) and saves it.
    pub fn replace(&mut self, cells: CellStore, selection: Selection) {
        self.cells = cells;
        self.selection = selection;
        self.persist();
    }

    /// Current persisted form of the state.
    pub fn snapshot_blob(&self) -> anyhow::Result<String> {
        crate::legacy::encode_blob(&self.cells, &self.selection)
    }

    fn persist(&mut self) {
        self.persistence.save(&self.cells, &self.selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemorySlots;

    fn selection() -> Selection {
        Selection {
            current_week: "W1".to_string(),
            current_term: "Q1".to_string(),
        }
    }

    #[test]
    fn upsert_overwrites_instead_of_appending() {
        let mut store = CellStore::new();
        store.upsert("s1", "math", "W1", vec![5, 4]);
        store.upsert("s1", "math", "W1", vec![2]);
        assert_eq!(store.get("s1", "math", "W1").map(|c| c.grades.clone()), Some(vec![2]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upsert_empty_removes_cell() {
        let mut store = CellStore::new();
        store.upsert("s1", "math", "W1", vec![5]);
        store.upsert("s1", "math", "W1", vec![]);
        assert!(store.get("s1", "math", "W1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn removing_last_grade_deletes_cell() {
        let mut store = CellStore::new();
        store.upsert("s1", "math", "W1", vec![4, 5]);
        assert!(store.remove_grade_at("s1", "math", "W1", 0));
        assert_eq!(store.get("s1", "math", "W1").map(|c| c.grades.clone()), Some(vec![5]));
        assert!(store.remove_grade_at("s1", "math", "W1", 0));
        assert!(store.get("s1", "math", "W1").is_none());
    }

    #[test]
    fn remove_on_missing_cell_or_index_is_noop() {
        let mut store = CellStore::new();
        assert!(!store.remove_grade_at("s1", "math", "W1", 0));
        store.upsert("s1", "math", "W1", vec![4]);
        assert!(!store.remove_grade_at("s1", "math", "W1", 1));
        assert_eq!(store.get("s1", "math", "W1").map(|c| c.grades.clone()), Some(vec![4]));
    }

    #[test]
    fn clear_week_matches_week_component_exactly() {
        let mut store = CellStore::new();
        store.upsert("s1", "math", "W1", vec![5]);
        store.upsert("s2", "rus", "W1", vec![4]);
        store.upsert("s1", "math", "W11", vec![3]);
        store.upsert("s1", "math", "W2", vec![2]);

        assert_eq!(store.clear_week("W1"), 2);
        assert!(store.get("s1", "math", "W1").is_none());
        assert!(store.get("s2", "rus", "W1").is_none());
        assert!(store.get("s1", "math", "W11").is_some());
        assert!(store.get("s1", "math", "W2").is_some());
    }

    #[test]
    fn gradebook_persists_every_mutation() {
        let slots = MemorySlots::default();
        let mut book = Gradebook::open(PersistenceAdapter::new(slots.clone()), selection());
        book.upsert_cell("s1", "math", "W1", vec![5, 5]);
        book.set_current_week("W2");

        let reopened = Gradebook::open(PersistenceAdapter::new(slots.clone()), selection());
        assert_eq!(reopened.cells(), book.cells());
        assert_eq!(reopened.selection().current_week, "W2");

        book.clear_week("W1");
        let reopened = Gradebook::open(PersistenceAdapter::new(slots), selection());
        assert!(reopened.cells().is_empty());
    }

    #[test]
    fn failed_remove_does_not_write() {
        let slots = MemorySlots::default();
        let mut book = Gradebook::open(PersistenceAdapter::new(slots.clone()), selection());
        assert!(!book.remove_grade("s1", "math", "W1", 0));
        assert_eq!(slots.write_count(), 0);
    }
}
