// Report Renderer: model text → classified lines → page layout → PDF file.
// Parsing, layout and PDF serialisation are CPU-bound and run inside
// tokio::task::spawn_blocking.

pub mod classifier;
pub mod font_metrics;
pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::report::classifier::parse_report;
use crate::report::layout::layout_report;
use crate::report::pdf::render_pdf;

/// Timestamp format used in report file names, second precision.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("failed to write report '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("report rendering aborted: {0}")]
    Aborted(String),
}

/// A report written to disk. Created once and never overwritten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedReport {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
}

/// Renders candidate reports into `output_dir`.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    output_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders `content` for `candidate_name` and writes
    /// `{candidate}_report_{timestamp}.pdf`.
    pub async fn render(
        &self,
        candidate_name: &str,
        content: &str,
    ) -> Result<GeneratedReport, RenderError> {
        let name = candidate_name.to_string();
        let content = content.to_string();

        let bytes = tokio::task::spawn_blocking(move || {
            let lines = parse_report(&content);
            let layout = layout_report(&name, &lines);
            render_pdf(&format!("Candidate Report: {name}"), &layout)
        })
        .await
        .map_err(|e| RenderError::Aborted(e.to_string()))??;

        let stem = format!(
            "{}_report_{}",
            file_safe_name(candidate_name),
            chrono::Local::now().format(TIMESTAMP_FORMAT)
        );
        self.write_new(&stem, &bytes).await
    }

    /// Writes the report under `{stem}.pdf`, or `{stem}_{id}.pdf` when a
    /// report with the same name already exists.
    async fn write_new(&self, stem: &str, bytes: &[u8]) -> Result<GeneratedReport, RenderError> {
        let primary = format!("{stem}.pdf");
        match self.create_new(&primary, bytes).await {
            Err(RenderError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::AlreadyExists =>
            {
                let suffix = Uuid::new_v4().simple().to_string();
                let fallback = format!("{stem}_{}.pdf", &suffix[..8]);
                warn!("Report '{primary}' already exists, writing '{fallback}' instead");
                self.create_new(&fallback, bytes).await
            }
            other => other,
        }
    }

    async fn create_new(&self, file_name: &str, bytes: &[u8]) -> Result<GeneratedReport, RenderError> {
        let path = self.output_dir.join(file_name);
        let io_err = |source| RenderError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        file.write_all(bytes).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        debug!("Wrote report {} ({} bytes)", path.display(), bytes.len());
        Ok(GeneratedReport {
            file_name: file_name.to_string(),
            path,
        })
    }
}

/// Replaces characters that are unsafe in file names.
fn file_safe_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "candidate".to_string()
    } else {
        trimmed.to_string()
    }
}
