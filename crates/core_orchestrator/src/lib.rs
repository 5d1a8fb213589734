pub mod qa;
pub mod selection;
pub mod store;
pub mod upload;

pub use qa::{ConfidenceBand, HIGH_CONFIDENCE_THRESHOLD, QaPhase, QaSession, RenderedAnswer};
pub use selection::SelectionModel;
pub use store::DocumentStore;
pub use upload::{
    SUPPORTED_EXTENSIONS, UNSUPPORTED_EXTENSION_REASON, UploadPhase, UploadSession, is_supported,
};

use std::sync::Arc;

use core_types::{
    ApiClient, ClientError, Document, DocumentId, HealthReport, LocalFile, TransportError,
    UploadOutcome,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct UploadReport {
    pub outcome: UploadOutcome,
    // A failed post-upload refresh is reported next to the outcome instead
    // of voiding it; the listing is stale until the next refresh.
    pub refresh_error: Option<TransportError>,
}

// Single writer for all client state. Locks guard synchronous phase
// transitions only and are never held across an await.
#[derive(Clone)]
pub struct Orchestrator {
    api: Arc<dyn ApiClient>,
    store: Arc<Mutex<DocumentStore>>,
    selection: Arc<Mutex<SelectionModel>>,
    upload: Arc<Mutex<UploadSession>>,
    qa: Arc<Mutex<QaSession>>,
    default_top_k: Option<u16>,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            store: Arc::new(Mutex::new(DocumentStore::new())),
            selection: Arc::new(Mutex::new(SelectionModel::new())),
            upload: Arc::new(Mutex::new(UploadSession::new())),
            qa: Arc::new(Mutex::new(QaSession::new())),
            default_top_k: None,
        }
    }

    pub fn with_default_top_k(mut self, top_k: Option<u16>) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub async fn refresh_documents(&self) -> Result<(), TransportError> {
        let fetched = self.api.list_documents().await?;
        let listed = fetched.len();
        let selectable = {
            let mut store = self.store.lock();
            store.replace_all(fetched);
            store.selectable_ids()
        };
        self.selection.lock().reconcile(&selectable);
        info!(
            documents = listed,
            selectable = selectable.len(),
            "document listing refreshed"
        );
        Ok(())
    }

    // Affordance gate: only currently indexed documents may enter or leave
    // the selection. Returns whether the toggle was applied.
    pub fn toggle_selection(&self, id: &str) -> bool {
        if !self.store.lock().is_selectable(id) {
            return false;
        }
        self.selection.lock().toggle(id);
        true
    }

    pub fn select_files(&self, files: Vec<LocalFile>) -> Result<usize, ClientError> {
        self.upload.lock().select(files)
    }

    pub async fn submit_upload(&self) -> Result<UploadReport, ClientError> {
        let batch = self.upload.lock().begin()?;
        info!(files = batch.len(), "submitting upload batch");
        match self.api.upload_documents(&batch).await {
            Ok(outcome) => {
                let outcome = self.upload.lock().complete(outcome);
                let refresh_error = self.refresh_documents().await.err();
                if let Some(error) = &refresh_error {
                    warn!(%error, "post-upload refresh failed");
                }
                info!(
                    accepted = outcome.accepted.len(),
                    rejected = outcome.rejected.len(),
                    "upload settled"
                );
                Ok(UploadReport {
                    outcome,
                    refresh_error,
                })
            }
            Err(error) => {
                self.upload.lock().fail(error.to_string());
                Err(error.into())
            }
        }
    }

    pub async fn ask(
        &self,
        question: &str,
        top_k: Option<u16>,
    ) -> Result<RenderedAnswer, ClientError> {
        let document_ids = self.selection.lock().ids();
        let request = self
            .qa
            .lock()
            .begin(question, &document_ids, top_k.or(self.default_top_k))?;
        match self.api.ask_question(&request).await {
            Ok(result) => {
                let answer = self.qa.lock().complete(result);
                info!(
                    mode = ?answer.mode,
                    confidence = answer.confidence,
                    used_chunks = answer.used_chunks,
                    "answer received"
                );
                Ok(answer)
            }
            Err(error) => {
                self.qa.lock().fail(error.to_string());
                Err(error.into())
            }
        }
    }

    // Health is advisory; an unreachable probe never blocks anything.
    pub async fn health_snapshot(&self) -> Option<HealthReport> {
        match self.api.health().await {
            Ok(report) => Some(report),
            Err(error) => {
                debug!(%error, "health probe failed");
                None
            }
        }
    }

    pub fn documents(&self) -> Vec<Document> {
        self.store.lock().documents().cloned().collect()
    }

    pub fn selectable_documents(&self) -> Vec<Document> {
        self.store.lock().selectable().cloned().collect()
    }

    pub fn document(&self, id: &str) -> Option<Document> {
        self.store.lock().get(id).cloned()
    }

    pub fn selected_ids(&self) -> Vec<DocumentId> {
        self.selection.lock().ids()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.lock().is_selected(id)
    }

    pub fn upload_phase(&self) -> UploadPhase {
        self.upload.lock().phase().clone()
    }

    pub fn qa_phase(&self) -> QaPhase {
        self.qa.lock().phase().clone()
    }
}
