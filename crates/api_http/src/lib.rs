use async_trait::async_trait;
use core_types::{
    ApiClient, AskRequest, Document, HealthReport, LocalFile, QaResult, TransportError,
    UploadOutcome,
};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let response = self
            .client
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(network_error)?;
        decode_response(response).await
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list_documents(&self) -> Result<Vec<Document>, TransportError> {
        self.get_json("documents").await
    }

    async fn upload_documents(&self, files: &[LocalFile]) -> Result<UploadOutcome, TransportError> {
        let mut form = Form::new();
        for file in files {
            // One repeatable `files` part per file, keeping the original name.
            let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
            form = form.part("files", part);
        }
        let response = self
            .client
            .post(self.endpoint("documents"))
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        decode_response(response).await
    }

    async fn ask_question(&self, request: &AskRequest) -> Result<QaResult, TransportError> {
        let response = self
            .client
            .post(self.endpoint("questions"))
            .json(request)
            .send()
            .await
            .map_err(network_error)?;
        decode_response(response).await
    }

    async fn health(&self) -> Result<HealthReport, TransportError> {
        self.get_json("health").await
    }
}

async fn decode_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "request rejected by server");
        return Err(status_error(status.as_u16(), &body));
    }
    response
        .json::<T>()
        .await
        .map_err(|err| TransportError::Decode {
            message: err.to_string(),
        })
}

// Error bodies carry {"detail": "..."} when the server produced them itself;
// anything else (proxies, validation arrays) falls back to the bare status.
fn status_error(status: u16, body: &str) -> TransportError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    TransportError::Status { status, detail }
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trims_trailing_slashes_from_base_url() {
        let client = HttpApiClient::new("http://localhost:8000/");
        assert_eq!(
            client.endpoint("documents"),
            "http://localhost:8000/api/documents"
        );
        assert_eq!(
            client.endpoint("questions"),
            "http://localhost:8000/api/questions"
        );
    }

    #[test]
    fn extracts_string_detail_from_error_body() {
        let err = status_error(400, r#"{"detail":"Soru en az 3 karakter olmali"}"#);
        assert_eq!(
            err,
            TransportError::Status {
                status: 400,
                detail: "Soru en az 3 karakter olmali".to_string()
            }
        );
    }

    #[test]
    fn falls_back_to_status_code_when_detail_is_missing_or_unusable() {
        assert_eq!(
            status_error(502, "<html>bad gateway</html>"),
            TransportError::Status {
                status: 502,
                detail: "HTTP 502".to_string()
            }
        );
        // FastAPI 422 bodies carry a detail *array*, which is not displayable.
        assert_eq!(
            status_error(422, r#"{"detail":[{"loc":["body","question"]}]}"#),
            TransportError::Status {
                status: 422,
                detail: "HTTP 422".to_string()
            }
        );
        assert_eq!(
            status_error(500, ""),
            TransportError::Status {
                status: 500,
                detail: "HTTP 500".to_string()
            }
        );
    }

    #[test]
    fn decodes_document_listing_payload() {
        let payload = json!([
            {
                "id": "3f2a9c11d4e64b0f8a58b7a2c9d01e55",
                "filename": "sozlesme.pdf",
                "file_type": "pdf",
                "language": "tr",
                "status": "indexed",
                "created_at": "2024-11-05T09:30:00Z"
            },
            {
                "id": "77b1e0c2aa934d2bb6f3f1d9e8a4c770",
                "filename": "fatura.jpg",
                "file_type": "jpg",
                "language": "unknown",
                "status": "reprocessing",
                "created_at": "2024-11-05T10:12:00Z"
            }
        ]);
        let documents: Vec<Document> = serde_json::from_value(payload).expect("documents");
        assert_eq!(documents.len(), 2);
        assert!(documents[0].is_indexed());
        // Unknown status strings flow through untouched.
        assert!(!documents[1].is_indexed());
        assert_eq!(documents[1].status, "reprocessing");
    }

    #[test]
    fn decodes_upload_outcome_wire_names() {
        let payload = json!({
            "document_ids": ["3f2a9c11d4e64b0f8a58b7a2c9d01e55"],
            "accepted_files": [
                {
                    "document_id": "3f2a9c11d4e64b0f8a58b7a2c9d01e55",
                    "filename": "a.pdf",
                    "status": "uploaded"
                }
            ],
            "rejected_files": [
                {"filename": "b.exe", "reason": "Desteklenmeyen dosya uzantisi"}
            ]
        });
        let outcome: UploadOutcome = serde_json::from_value(payload).expect("outcome");
        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.accepted[0].filename, "a.pdf");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].filename, "b.exe");
        assert_eq!(outcome.total_reported(), 2);
    }

    #[test]
    fn decodes_answer_payload() {
        let payload = json!({
            "answer": "Merkez ofis Ankara'dadir.",
            "mode": "grounded_answer",
            "citations": [
                {
                    "document_id": "3f2a9c11d4e64b0f8a58b7a2c9d01e55",
                    "filename": "sozlesme.pdf",
                    "page": 3,
                    "chunk_id": "3f2a9c11-7",
                    "snippet": "...merkez ofis..."
                },
                {
                    "document_id": "3f2a9c11d4e64b0f8a58b7a2c9d01e55",
                    "filename": "sozlesme.pdf",
                    "page": null,
                    "chunk_id": "3f2a9c11-9",
                    "snippet": "...adres..."
                }
            ],
            "confidence": 0.92,
            "used_chunks": 4
        });
        let result: QaResult = serde_json::from_value(payload).expect("answer");
        assert_eq!(result.mode, core_types::AnswerMode::GroundedAnswer);
        assert_eq!(result.citations[0].page, Some(3));
        assert_eq!(result.citations[1].page, None);
        assert_eq!(result.used_chunks, 4);
    }

    #[test]
    fn ask_request_omits_top_k_when_unset() {
        let request = AskRequest {
            question: "Merkez ofis nerede?".to_string(),
            document_ids: vec!["doc-1".to_string()],
            top_k: None,
        };
        let value = serde_json::to_value(&request).expect("request json");
        assert!(value.get("top_k").is_none());

        let request = AskRequest {
            top_k: Some(8),
            ..request
        };
        let value = serde_json::to_value(&request).expect("request json");
        assert_eq!(value["top_k"], 8);
    }

    #[test]
    fn decodes_health_payload() {
        let payload = json!({
            "status": "degraded",
            "services": {
                "database": "ok",
                "vector_store": "ok",
                "gemini": "error: quota exceeded"
            }
        });
        let report: HealthReport = serde_json::from_value(payload).expect("health");
        assert_eq!(report.status, "degraded");
        assert_eq!(report.services["gemini"], "error: quota exceeded");
    }
}
