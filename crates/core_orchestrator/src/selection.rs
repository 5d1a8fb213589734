use core_types::DocumentId;
use indexmap::IndexSet;

// Tracks whatever ids it is told to track; gating toggles on the selectable
// set is the caller's responsibility, reconcile is the safety net.
#[derive(Debug, Default)]
pub struct SelectionModel {
    selected: IndexSet<DocumentId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.selected.shift_remove(id) {
            self.selected.insert(id.to_owned());
        }
    }

    pub fn reconcile(&mut self, valid_ids: &IndexSet<DocumentId>) {
        self.selected.retain(|id| valid_ids.contains(id));
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn ids(&self) -> Vec<DocumentId> {
        self.selected.iter().cloned().collect()
    }

    pub fn current(&self) -> &IndexSet<DocumentId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_set(ids: &[&str]) -> IndexSet<DocumentId> {
        ids.iter().map(|id| (*id).to_owned()).collect()
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = SelectionModel::new();
        selection.toggle("a");
        assert!(selection.is_selected("a"));
        selection.toggle("a");
        assert!(!selection.is_selected("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn toggle_does_not_validate_ids() {
        let mut selection = SelectionModel::new();
        selection.toggle("never-listed");
        assert!(selection.is_selected("never-listed"));
    }

    #[test]
    fn reconcile_keeps_exactly_the_intersection() {
        let mut selection = SelectionModel::new();
        selection.toggle("a");
        selection.toggle("b");
        selection.toggle("c");

        selection.reconcile(&id_set(&["b", "c", "d"]));
        assert_eq!(selection.ids(), vec!["b".to_owned(), "c".to_owned()]);

        selection.reconcile(&id_set(&[]));
        assert!(selection.is_empty());
    }

    #[test]
    fn reconcile_preserves_insertion_order() {
        let mut selection = SelectionModel::new();
        selection.toggle("x");
        selection.toggle("y");
        selection.toggle("z");
        selection.reconcile(&id_set(&["z", "x"]));
        assert_eq!(selection.ids(), vec!["x".to_owned(), "z".to_owned()]);
    }
}
