// Résumé analysis: encode the upload, ask Gemini once, normalize the answer.
// All model calls go through llm_client — no direct Gemini calls here.

pub mod analyzer;
pub mod encoder;
pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod schema;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Every way a single analysis can fail. Field-level malformations are not errors;
/// the normalizer heals those.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(&'static str),

    #[error("Failed to read uploaded file: {0}")]
    Encode(std::io::Error),

    #[error("Model invocation failed: {0}")]
    Transport(LlmError),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Invalid response format from model: {0}")]
    MalformedResponse(serde_json::Error),
}

impl From<LlmError> for AnalysisError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => AnalysisError::EmptyResponse,
            other => AnalysisError::Transport(other),
        }
    }
}
