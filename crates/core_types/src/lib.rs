use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type DocumentId = String;

// The only status value the client interprets; every other status string is
// server-defined and rendered as-is.
pub const STATUS_INDEXED: &str = "indexed";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UiLanguage {
    TrTr,
    EnUs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    pub file_type: String,
    pub language: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Document {
    pub fn is_indexed(&self) -> bool {
        self.status == STATUS_INDEXED
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl LocalFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("path has no usable file name: {}", path.display()))?;
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self { filename, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AcceptedFile {
    pub document_id: DocumentId,
    pub filename: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectedFile {
    pub filename: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UploadOutcome {
    #[serde(default)]
    pub document_ids: Vec<DocumentId>,
    #[serde(default, rename = "accepted_files")]
    pub accepted: Vec<AcceptedFile>,
    #[serde(default, rename = "rejected_files")]
    pub rejected: Vec<RejectedFile>,
}

impl UploadOutcome {
    pub fn total_reported(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskRequest {
    pub question: String,
    pub document_ids: Vec<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    GroundedAnswer,
    NoEvidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub document_id: DocumentId,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub chunk_id: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaResult {
    pub answer: String,
    pub mode: AnswerMode,
    #[serde(default)]
    pub citations: Vec<Citation>,
    pub confidence: f64,
    #[serde(default)]
    pub used_chunks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("question must not be blank")]
    BlankQuestion,
    #[error("select at least one indexed document")]
    NoDocumentsSelected,
    #[error("no files queued for upload")]
    EmptyUploadQueue,
    #[error("only PDF, JPG and PNG files are supported")]
    NoSupportedFiles,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("request failed: {message}")]
    Network { message: String },
    #[error("malformed response: {message}")]
    Decode { message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("another request is already in flight")]
    Busy,
}

#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>, TransportError>;

    async fn upload_documents(&self, files: &[LocalFile]) -> Result<UploadOutcome, TransportError>;

    async fn ask_question(&self, request: &AskRequest) -> Result<QaResult, TransportError>;

    async fn health(&self) -> Result<HealthReport, TransportError>;
}
