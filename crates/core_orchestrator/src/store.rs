use core_types::{Document, DocumentId};
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: IndexMap<DocumentId, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Wholesale replacement keyed by id; a re-listed id never produces a
    // second entry, the later occurrence wins.
    pub fn replace_all(&mut self, documents: Vec<Document>) {
        self.documents = documents
            .into_iter()
            .map(|document| (document.id.clone(), document))
            .collect();
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn selectable(&self) -> impl Iterator<Item = &Document> {
        self.documents
            .values()
            .filter(|document| document.is_indexed())
    }

    pub fn selectable_ids(&self) -> IndexSet<DocumentId> {
        self.selectable()
            .map(|document| document.id.clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn is_selectable(&self, id: &str) -> bool {
        self.get(id).is_some_and(Document::is_indexed)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(id: &str, status: &str) -> Document {
        Document {
            id: id.to_owned(),
            filename: format!("{id}.pdf"),
            file_type: "pdf".to_owned(),
            language: "tr".to_owned(),
            status: status.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn replace_all_swaps_the_snapshot_wholesale() {
        let mut store = DocumentStore::new();
        store.replace_all(vec![document("a", "indexed"), document("b", "processing")]);
        assert_eq!(store.len(), 2);

        store.replace_all(vec![document("c", "indexed")]);
        assert_eq!(store.len(), 1);
        assert!(store.get("a").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn duplicate_ids_collapse_to_the_last_occurrence() {
        let mut store = DocumentStore::new();
        store.replace_all(vec![document("a", "processing"), document("a", "indexed")]);
        assert_eq!(store.len(), 1);
        assert!(store.is_selectable("a"));
    }

    #[test]
    fn indexed_status_is_necessary_and_sufficient_for_selectability() {
        let mut store = DocumentStore::new();
        store.replace_all(vec![
            document("a", "indexed"),
            document("b", "processing"),
            document("c", "failed"),
            document("d", "uploaded"),
            // Server-defined statuses the client has never seen stay opaque.
            document("e", "reprocessing"),
            document("f", "indexed"),
        ]);

        let selectable: Vec<&str> = store.selectable().map(|doc| doc.id.as_str()).collect();
        assert_eq!(selectable, vec!["a", "f"]);
        assert!(store.is_selectable("a"));
        assert!(!store.is_selectable("e"));
        assert!(!store.is_selectable("missing"));
    }

    #[test]
    fn selectable_ids_preserve_listing_order() {
        let mut store = DocumentStore::new();
        store.replace_all(vec![
            document("z", "indexed"),
            document("m", "processing"),
            document("a", "indexed"),
        ]);
        let selectable_ids = store.selectable_ids();
        let ids: Vec<&str> = selectable_ids.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }
}
