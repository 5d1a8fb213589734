use core_types::{
    AnswerMode, AskRequest, Citation, ClientError, DocumentId, QaResult, ValidationError,
};
use tracing::warn;

// Strictly greater than the threshold renders as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceBand::High
        } else {
            ConfidenceBand::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAnswer {
    pub answer: String,
    pub mode: AnswerMode,
    pub citations: Vec<Citation>,
    pub confidence: f64,
    pub used_chunks: u32,
}

impl RenderedAnswer {
    // `mode` is authoritative: a no-evidence response that still carries
    // citations violates the contract and loses them here.
    pub fn from_result(result: QaResult) -> Self {
        let QaResult {
            answer,
            mode,
            mut citations,
            confidence,
            used_chunks,
        } = result;
        if mode == AnswerMode::NoEvidence && !citations.is_empty() {
            warn!(
                dropped = citations.len(),
                "no_evidence answer carried citations"
            );
            citations.clear();
        }
        Self {
            answer,
            mode,
            citations,
            confidence,
            used_chunks,
        }
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }

    pub fn is_grounded(&self) -> bool {
        self.mode == AnswerMode::GroundedAnswer
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum QaPhase {
    #[default]
    Idle,
    Asking,
    Answered(RenderedAnswer),
    Failed(String),
}

// Idle -> Asking -> Answered | Failed; each new ask restarts the cycle.
#[derive(Debug, Default)]
pub struct QaSession {
    phase: QaPhase,
}

impl QaSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &QaPhase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, QaPhase::Asking)
    }

    pub fn last_answer(&self) -> Option<&RenderedAnswer> {
        match &self.phase {
            QaPhase::Answered(answer) => Some(answer),
            _ => None,
        }
    }

    pub fn begin(
        &mut self,
        question: &str,
        document_ids: &[DocumentId],
        top_k: Option<u16>,
    ) -> Result<AskRequest, ClientError> {
        if self.is_busy() {
            return Err(ClientError::Busy);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::BlankQuestion.into());
        }
        if document_ids.is_empty() {
            return Err(ValidationError::NoDocumentsSelected.into());
        }
        self.phase = QaPhase::Asking;
        Ok(AskRequest {
            question: question.to_owned(),
            document_ids: document_ids.to_vec(),
            top_k,
        })
    }

    pub fn complete(&mut self, result: QaResult) -> RenderedAnswer {
        let answer = RenderedAnswer::from_result(result);
        self.phase = QaPhase::Answered(answer.clone());
        answer
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = QaPhase::Failed(message.into());
    }
}
