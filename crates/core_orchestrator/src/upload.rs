use core_types::{ClientError, LocalFile, RejectedFile, UploadOutcome, ValidationError};
use tracing::warn;

pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

// Same wording the ingestion service uses for its own extension rejections,
// so locally filtered files read identically in the outcome.
pub const UNSUPPORTED_EXTENSION_REASON: &str = "Desteklenmeyen dosya uzantisi";

pub fn is_supported(file: &LocalFile) -> bool {
    file.extension()
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading,
    Completed(UploadOutcome),
    Failed(String),
}

// Idle -> Uploading -> Completed | Failed; a new submission restarts the
// cycle from either terminal phase.
#[derive(Debug, Default)]
pub struct UploadSession {
    queue: Vec<LocalFile>,
    dropped: Vec<RejectedFile>,
    phase: UploadPhase,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, incoming: Vec<LocalFile>) -> Result<usize, ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }
        if incoming.is_empty() {
            return Ok(0);
        }
        let (supported, unsupported): (Vec<LocalFile>, Vec<LocalFile>) =
            incoming.into_iter().partition(is_supported);
        if supported.is_empty() {
            // Nothing to send; the previous batch stays put.
            return Err(ValidationError::NoSupportedFiles.into());
        }
        // Each pick replaces the previous pending batch. Filtered files are
        // kept as rejections so the final outcome accounts for every file
        // the caller handed in, not just the ones that reached the wire.
        let count = supported.len();
        self.queue = supported;
        self.dropped = unsupported
            .into_iter()
            .map(|file| RejectedFile {
                filename: file.filename,
                reason: UNSUPPORTED_EXTENSION_REASON.to_owned(),
            })
            .collect();
        Ok(count)
    }

    pub fn queued(&self) -> &[LocalFile] {
        &self.queue
    }

    pub fn dropped(&self) -> &[RejectedFile] {
        &self.dropped
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, UploadPhase::Uploading)
    }

    pub fn last_outcome(&self) -> Option<&UploadOutcome> {
        match &self.phase {
            UploadPhase::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn begin(&mut self) -> Result<Vec<LocalFile>, ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }
        if self.queue.is_empty() {
            return Err(ValidationError::EmptyUploadQueue.into());
        }
        self.phase = UploadPhase::Uploading;
        Ok(self.queue.clone())
    }

    pub fn complete(&mut self, outcome: UploadOutcome) -> UploadOutcome {
        let submitted = self.queue.len();
        if outcome.total_reported() != submitted {
            warn!(
                submitted,
                reported = outcome.total_reported(),
                "upload outcome does not account for every submitted file"
            );
        }
        let mut merged = outcome;
        if !self.dropped.is_empty() {
            // Locally filtered files were rejected before the wire; list
            // them ahead of the server's own rejections.
            let mut rejected = std::mem::take(&mut self.dropped);
            rejected.extend(std::mem::take(&mut merged.rejected));
            merged.rejected = rejected;
        }
        self.queue.clear();
        self.phase = UploadPhase::Completed(merged.clone());
        merged
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        // The queue and its drop report survive so the same batch can be
        // retried.
        self.phase = UploadPhase::Failed(message.into());
    }
}
