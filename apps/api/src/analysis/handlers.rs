//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::encoder::{ResumeFile, ACCEPTED_MIME_TYPES};
use crate::errors::AppError;
use crate::models::analysis::AnalysisResult;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const DEFAULT_FILENAME: &str = "resume";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    pub result: AnalysisResult,
}

/// POST /api/v1/analyses
///
/// Accepts a multipart upload with a `file` field (PDF, PNG or JPEG) and returns
/// the normalized analysis. Nothing is stored; resetting is up to the client.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let (file, size_bytes) = read_upload(&mut multipart)
        .await
        .map_err(|e| upload_error(e, state.config.max_upload_bytes))?;

    let mime_type = file.mime_type();
    if !ACCEPTED_MIME_TYPES.contains(&mime_type.as_str()) {
        return Err(AppError::UnsupportedMediaType(mime_type));
    }

    let analysis_id = Uuid::new_v4();
    let result = state
        .analyzer
        .analyze(&file)
        .instrument(info_span!("analysis", %analysis_id))
        .await?;
    info!("Analysis {analysis_id} completed for '{}'", file.filename());

    Ok(Json(AnalysisResponse {
        analysis_id,
        analyzed_at: Utc::now(),
        file_name: file.filename().to_string(),
        mime_type,
        size_bytes,
        result,
    }))
}

/// Body-limit failures surface from multer as stream errors; give them a readable message.
fn upload_error(err: AppError, limit: usize) -> AppError {
    match err {
        AppError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge { limit }
        }
        other => other,
    }
}

/// Pulls the `file` field out of the form; other fields are ignored.
async fn read_upload(multipart: &mut Multipart) -> Result<(ResumeFile, usize), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_FILENAME)
            .to_string();
        let declared = field
            .content_type()
            .filter(|ct| !ct.eq_ignore_ascii_case("application/octet-stream"))
            .map(str::to_string);
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let size = bytes.len();
        return Ok((ResumeFile::from_bytes(filename, declared, bytes), size));
    }

    Err(AppError::Validation(format!(
        "Missing '{FILE_FIELD}' field in multipart form"
    )))
}
