//! Analysis Request Invoker — encode, ask the model once, normalize.
//!
//! The model sits behind [`ModelBackend`] so the pipeline runs offline in tests.
//! `ResumeAnalyzer` holds no mutable state and is shared across handlers as `Arc`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::analysis::encoder::{encode, EncodedFile, ResumeFile};
use crate::analysis::normalizer::normalize;
use crate::analysis::prompts::ANALYSIS_PROMPT;
use crate::analysis::schema::response_schema;
use crate::analysis::AnalysisError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{GenerateRequest, InlineData, LlmClient, LlmError};
use crate::models::analysis::AnalysisResult;

/// One multimodal request to the external model.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub attachment: &'a EncodedFile,
    pub system: &'a str,
    pub instruction: &'a str,
    pub response_schema: &'a Value,
}

/// The external generation capability: attachment + instruction + schema → raw text.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<String, LlmError>;
}

#[async_trait]
impl ModelBackend for LlmClient {
    async fn generate(&self, request: ModelRequest<'_>) -> Result<String, LlmError> {
        LlmClient::generate(
            self,
            &GenerateRequest {
                system: request.system,
                prompt: request.instruction,
                attachment: InlineData {
                    mime_type: &request.attachment.mime_type,
                    data: &request.attachment.data,
                },
                response_schema: request.response_schema,
            },
        )
        .await
    }
}

#[derive(Clone)]
pub struct ResumeAnalyzer {
    backend: Option<Arc<dyn ModelBackend>>,
    response_schema: Value,
}

impl ResumeAnalyzer {
    /// `None` leaves the analyzer unconfigured: every call fails before touching the file.
    pub fn new(backend: Option<Arc<dyn ModelBackend>>) -> Self {
        Self {
            backend,
            response_schema: response_schema(),
        }
    }

    /// Builds a Gemini-backed analyzer when a credential is available.
    pub fn from_credential(api_key: Option<String>, model: &str) -> Self {
        Self::new(api_key.map(|key| {
            Arc::new(LlmClient::new(key, model.to_string())) as Arc<dyn ModelBackend>
        }))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Single-shot analysis of one résumé file.
    pub async fn analyze(&self, file: &ResumeFile) -> Result<AnalysisResult, AnalysisError> {
        let backend = self.backend.as_ref().ok_or(AnalysisError::Configuration(
            "Gemini API key is missing",
        ))?;

        let encoded = encode(file).await.map_err(AnalysisError::Encode)?;
        info!(
            "Analyzing '{}' ({}, {} bytes)",
            file.filename(),
            encoded.mime_type,
            encoded.size_bytes
        );

        let raw = backend
            .generate(ModelRequest {
                attachment: &encoded,
                system: JSON_ONLY_SYSTEM,
                instruction: ANALYSIS_PROMPT,
                response_schema: &self.response_schema,
            })
            .await?;

        if raw.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        debug!("Model returned {} characters", raw.len());

        normalize(&raw)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::sync::Mutex;

    use super::*;

    /// What the stub saw for each call.
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub mime_type: String,
        pub data: String,
        pub instruction: String,
        pub response_schema: Value,
    }

    /// Deterministic backend replaying one canned reply.
    pub struct StubBackend {
        reply: Mutex<Option<Result<String, LlmError>>>,
        pub calls: Mutex<Vec<RecordedCall>>,
    }

    impl StubBackend {
        pub fn replying(text: &str) -> Arc<Self> {
            Self::with_result(Ok(text.to_string()))
        }

        pub fn with_result(result: Result<String, LlmError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(result)),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelBackend for StubBackend {
        async fn generate(&self, request: ModelRequest<'_>) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(RecordedCall {
                mime_type: request.attachment.mime_type.clone(),
                data: request.attachment.data.clone(),
                instruction: request.instruction.to_string(),
                response_schema: request.response_schema.clone(),
            });
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::stub::StubBackend;
    use super::*;
    use crate::analysis::schema::DEFAULT_SUMMARY;

    const JANE_DOE: &str = r#"{"candidateName":"Jane Doe","experiences":[{"title":"Engineer","inferredSkills":"Python"}],"feedback":{"overallMatchScore":87}}"#;

    fn analyzer_with(stub: &Arc<StubBackend>) -> ResumeAnalyzer {
        ResumeAnalyzer::new(Some(stub.clone() as Arc<dyn ModelBackend>))
    }

    fn cv_pdf() -> ResumeFile {
        ResumeFile::from_bytes("cv.pdf", None, Bytes::from_static(b"%PDF-1.7"))
    }

    #[tokio::test]
    async fn test_end_to_end_with_stubbed_model() {
        let stub = StubBackend::replying(JANE_DOE);
        let result = analyzer_with(&stub).analyze(&cv_pdf()).await.unwrap();

        assert_eq!(result.candidate_name, "Jane Doe");
        assert!(result.experiences[0].inferred_skills.is_empty());
        assert_eq!(result.professional_summary, DEFAULT_SUMMARY);
        assert_eq!(result.feedback.overall_match_score, 87.0);
        assert!(result.feedback.strengths.is_empty());
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_payload_prompt_and_schema() {
        let stub = StubBackend::replying("{}");
        analyzer_with(&stub).analyze(&cv_pdf()).await.unwrap();

        let calls = stub.calls.lock().unwrap();
        let call = &calls[0];
        assert_eq!(call.mime_type, "application/pdf");
        assert_eq!(call.data, "JVBERi0xLjc=");
        assert!(call.instruction.contains("Soft skills"));
        assert!(call.instruction.contains("third person"));
        assert_eq!(call.response_schema, response_schema());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_encoding() {
        let dir = tempfile::tempdir().unwrap();
        // Does not exist: an encode attempt would surface as an Encode error instead.
        let file = ResumeFile::from_path(dir.path().join("cv.pdf"), None);

        let analyzer = ResumeAnalyzer::from_credential(None, "gemini-3-flash-preview");
        assert!(!analyzer.is_configured());

        let err = analyzer.analyze(&file).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
        assert!(!dir.path().join("cv.pdf").exists());
    }

    #[tokio::test]
    async fn test_read_failure_is_reported_without_calling_model() {
        let stub = StubBackend::replying(JANE_DOE);
        let dir = tempfile::tempdir().unwrap();
        let file = ResumeFile::from_path(dir.path().join("gone.pdf"), None);

        let err = analyzer_with(&stub).analyze(&file).await.unwrap_err();

        assert!(matches!(err, AnalysisError::Encode(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_response() {
        let stub = StubBackend::replying("  \n ");
        let err = analyzer_with(&stub).analyze(&cv_pdf()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_model_without_text_is_empty_response() {
        let stub = StubBackend::with_result(Err(LlmError::EmptyContent));
        let err = analyzer_with(&stub).analyze(&cv_pdf()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced_once() {
        let stub = StubBackend::with_result(Err(LlmError::Api {
            status: 429,
            message: "quota exceeded".to_string(),
        }));

        let err = analyzer_with(&stub).analyze(&cv_pdf()).await.unwrap_err();

        match err {
            AnalysisError::Transport(LlmError::Api { status, .. }) => assert_eq!(status, 429),
            other => panic!("expected Transport, got {other:?}"),
        }
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_malformed_response() {
        let stub = StubBackend::replying("I could not read this document.");
        let err = analyzer_with(&stub).analyze(&cv_pdf()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }
}
