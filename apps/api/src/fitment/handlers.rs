//! Axum route handlers for the Fitment API.

use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::Document;
use crate::fitment::pipeline::RankedReport;
use crate::state::AppState;

pub const RESUMES_FIELD: &str = "resumes";
pub const JOB_DESCRIPTION_FIELD: &str = "job_description";

const MISSING_INPUTS: &str = "Please upload resumes and a job description.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Documents read from the multipart body, before validation.
#[derive(Debug, Default)]
pub struct FitmentUpload {
    pub resumes: Vec<Document>,
    pub job_descriptions: Vec<Document>,
}

impl FitmentUpload {
    /// Splits the upload into résumés and the single job description.
    pub fn validate(self) -> Result<(Vec<Document>, Document), AppError> {
        let mut job_descriptions = self.job_descriptions;
        if self.resumes.is_empty() || job_descriptions.is_empty() {
            return Err(AppError::Validation(MISSING_INPUTS.to_string()));
        }
        if job_descriptions.len() > 1 {
            return Err(AppError::Validation(format!(
                "Exactly one job description must be uploaded, got {}.",
                job_descriptions.len()
            )));
        }
        let job_description = job_descriptions.remove(0);
        Ok((self.resumes, job_description))
    }
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the Candidate Fitment Report API. \
                  Use the /generate_fitment_reports/ endpoint to generate reports.",
    })
}

/// POST /generate_fitment_reports/
///
/// Multipart body: one or more `resumes` files and exactly one
/// `job_description` file. Returns the ranked candidates.
pub async fn handle_generate_reports(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<RankedReport>>, AppError> {
    let (resumes, job_description) = read_upload(multipart).await?.validate()?;
    let ranked = state.pipeline.run(resumes, job_description).await?;
    Ok(Json(ranked))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart reading
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload(mut multipart: Multipart) -> Result<FitmentUpload, AppError> {
    let mut upload = FitmentUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed multipart body", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let target = match name.as_str() {
            RESUMES_FIELD => &mut upload.resumes,
            JOB_DESCRIPTION_FIELD => &mut upload.job_descriptions,
            other => {
                debug!("Ignoring multipart field '{other}'");
                continue;
            }
        };
        if let Some(document) = read_document(field, &name).await? {
            target.push(document);
        }
    }

    Ok(upload)
}

/// Reads one file part. A part with no file name and no content is what
/// browsers send for an empty file input, and is skipped.
async fn read_document(field: Field<'_>, name: &str) -> Result<Option<Document>, AppError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .filter(|f| !f.trim().is_empty());
    let bytes = field
        .bytes()
        .await
        .map_err(|e| multipart_error(&format!("Failed to read field '{name}'"), e))?;

    match filename {
        Some(filename) => Ok(Some(Document::new(filename, bytes))),
        None if bytes.is_empty() => Ok(None),
        None => Ok(Some(Document::new(format!("{name}.pdf"), bytes))),
    }
}

/// Oversized bodies are 413; every other multipart failure is a bad request.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{context}: {}", e.body_text()))
    } else {
        AppError::Validation(format!("{context}: {}", e.body_text()))
    }
}
