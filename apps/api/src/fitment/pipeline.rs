//! Fitment Orchestrator — runs the pipeline for a batch of résumés.
//!
//! Flow: extract job description → retrieve culture context (once) →
//!       for each résumé: extract → prompt → complete → score → render →
//!       rank all results.
//!
//! Shared inputs (job description, culture context) are fatal when they fail.
//! Anything that goes wrong for a single résumé becomes a failure record for
//! that candidate, so the response always has one entry per résumé.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extraction::{extract_text, Document, ExtractionError};
use crate::fitment::prompts::build_fitment_prompt;
use crate::fitment::score::score_report;
use crate::llm_client::{CompletionClient, LlmError};
use crate::report::{RenderError, ReportRenderer};
use crate::retrieval::{build_retrieval_context, ContextRetriever};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Score read from the model's report.
    Scored,
    /// Report rendered, but the score was unreadable and defaulted to 0.0.
    ScoreUnparsed,
    /// No report: a step for this candidate failed.
    Failed,
}

/// Per-résumé outcome, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub candidate_name: String,
    pub matching_score: f64,
    pub report_file: Option<String>,
    pub status: CandidateStatus,
    pub error: Option<String>,
}

/// One entry of the ranked response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReport {
    pub candidate_name: String,
    pub matching_score: f64,
    pub rank: usize,
    pub report_file: Option<String>,
    pub status: CandidateStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Why a single candidate could not be processed.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error("resume could not be read: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),

    #[error("completion backend returned no candidates")]
    EmptyCompletion,

    #[error("report could not be rendered: {0}")]
    Render(#[from] RenderError),
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Stable descending sort by score, failed candidates last, then 1-based ranks.
/// Equal scores keep submission order.
pub fn rank_results(mut results: Vec<CandidateResult>) -> Vec<RankedReport> {
    results.sort_by(|a, b| {
        let a_failed = a.status == CandidateStatus::Failed;
        let b_failed = b.status == CandidateStatus::Failed;
        a_failed
            .cmp(&b_failed)
            .then_with(|| b.matching_score.total_cmp(&a.matching_score))
    });

    results
        .into_iter()
        .enumerate()
        .map(|(i, r)| RankedReport {
            candidate_name: r.candidate_name,
            matching_score: r.matching_score,
            rank: i + 1,
            report_file: r.report_file,
            status: r.status,
            error: r.error,
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Holds the injected collaborators. Built once at startup and shared
/// read-only by every request.
pub struct FitmentPipeline {
    retriever: Arc<dyn ContextRetriever>,
    completion: Arc<dyn CompletionClient>,
    renderer: ReportRenderer,
}

impl FitmentPipeline {
    pub fn new(
        retriever: Arc<dyn ContextRetriever>,
        completion: Arc<dyn CompletionClient>,
        renderer: ReportRenderer,
    ) -> Self {
        Self {
            retriever,
            completion,
            renderer,
        }
    }

    /// Processes every résumé sequentially against one job description and
    /// returns the ranked results.
    pub async fn run(
        &self,
        resumes: Vec<Document>,
        job_description: Document,
    ) -> Result<Vec<RankedReport>, AppError> {
        if resumes.is_empty() {
            return Err(AppError::Validation(
                "Please upload resumes and a job description.".to_string(),
            ));
        }

        info!(
            "Fitment batch: {} resume(s) against '{}' (model {})",
            resumes.len(),
            job_description.filename,
            self.completion.model()
        );

        let jd_text = extract_text(&job_description).await?;
        drop(job_description);

        let context = build_retrieval_context(self.retriever.as_ref()).await?;

        let mut results = Vec::with_capacity(resumes.len());
        for resume in resumes {
            let candidate_name = resume.candidate_name();
            let result = match self.process_candidate(resume, &jd_text, &context).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Candidate '{candidate_name}' failed: {e}");
                    CandidateResult {
                        candidate_name,
                        matching_score: 0.0,
                        report_file: None,
                        status: CandidateStatus::Failed,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let ranked = rank_results(results);
        info!("Fitment batch complete: {} candidate(s) ranked", ranked.len());
        Ok(ranked)
    }

    async fn process_candidate(
        &self,
        resume: Document,
        jd_text: &str,
        context: &str,
    ) -> Result<CandidateResult, CandidateError> {
        let candidate_name = resume.candidate_name();
        let resume_text = extract_text(&resume).await?;
        drop(resume);

        let prompt = build_fitment_prompt(&resume_text, jd_text, context);
        let content = self
            .completion
            .complete(&prompt)
            .await?
            .ok_or(CandidateError::EmptyCompletion)?;

        let scored = score_report(content);
        if !scored.parsed {
            warn!("Matching score for '{candidate_name}' could not be parsed; defaulting to 0.0");
        }

        let report = self.renderer.render(&candidate_name, &scored.content).await?;
        info!(
            "Candidate '{candidate_name}' scored {:.1} → {}",
            scored.score, report.file_name
        );

        Ok(CandidateResult {
            candidate_name,
            matching_score: scored.score,
            report_file: Some(report.file_name),
            status: if scored.parsed {
                CandidateStatus::Scored
            } else {
                CandidateStatus::ScoreUnparsed
            },
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{Scripted, ScriptedCompletion};
    use crate::retrieval::testing::{FailingRetriever, StaticRetriever};
    use crate::retrieval::{RetrievalError, RetrievedPassage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn report_with_score(score: &str) -> Scripted {
        Scripted::Text(format!(
            "1. Candidate Name and Email\nSomeone\n5. Overall Matching Score: {score}\n8. Conclusion on Fitment\nDone."
        ))
    }

    fn resume(name: &str) -> Document {
        Document::new(format!("{name}.txt"), format!("RESUME-{}", name.to_uppercase()))
    }

    fn jd() -> Document {
        Document::new("jd.txt", "Senior Rust Engineer")
    }

    fn pipeline(
        dir: &tempfile::TempDir,
        completion: ScriptedCompletion,
        retriever: Arc<dyn ContextRetriever>,
    ) -> FitmentPipeline {
        FitmentPipeline::new(retriever, Arc::new(completion), ReportRenderer::new(dir.path()))
    }

    fn culture() -> Arc<dyn ContextRetriever> {
        Arc::new(StaticRetriever(vec!["We value ownership."]))
    }

    fn result(name: &str, score: f64, status: CandidateStatus) -> CandidateResult {
        CandidateResult {
            candidate_name: name.into(),
            matching_score: score,
            report_file: None,
            status,
            error: None,
        }
    }

    fn report_count(dir: &tempfile::TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_rank_descending_and_contiguous() {
        let ranked = rank_results(vec![
            result("alice", 70.0, CandidateStatus::Scored),
            result("bob", 90.0, CandidateStatus::Scored),
            result("carol", 80.0, CandidateStatus::Scored),
        ]);
        let order: Vec<_> = ranked.iter().map(|r| (r.candidate_name.as_str(), r.rank)).collect();
        assert_eq!(order, vec![("bob", 1), ("carol", 2), ("alice", 3)]);
    }

    #[test]
    fn test_rank_ties_keep_submission_order() {
        let ranked = rank_results(vec![
            result("a", 80.0, CandidateStatus::Scored),
            result("b", 80.0, CandidateStatus::Scored),
            result("c", 90.0, CandidateStatus::Scored),
            result("d", 80.0, CandidateStatus::Scored),
        ]);
        let names: Vec<_> = ranked.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_failed_rank_after_unparsed_zero() {
        let ranked = rank_results(vec![
            result("failed", 0.0, CandidateStatus::Failed),
            result("unparsed", 0.0, CandidateStatus::ScoreUnparsed),
            result("scored", 10.0, CandidateStatus::Scored),
        ]);
        let names: Vec<_> = ranked.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["scored", "unparsed", "failed"]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_alice_and_bob_ranked_by_score() {
        let dir = tempfile::tempdir().unwrap();
        let completion = ScriptedCompletion::new(Scripted::Fail)
            .on("RESUME-ALICE", report_with_score("70%"))
            .on("RESUME-BOB", report_with_score("90%"));
        let pipeline = pipeline(&dir, completion, culture());

        let ranked = pipeline
            .run(vec![resume("alice"), resume("bob")], jd())
            .await
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].candidate_name, "bob");
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].matching_score, 90.0);
        assert_eq!(ranked[1].candidate_name, "alice");
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].matching_score, 70.0);
        assert!(ranked.iter().all(|r| r.status == CandidateStatus::Scored));

        for r in &ranked {
            let file = r.report_file.as_ref().unwrap();
            assert!(file.starts_with(&format!("{}_report_", r.candidate_name)));
            assert!(dir.path().join(file).exists());
        }
    }

    #[tokio::test]
    async fn test_unparsable_score_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let completion = ScriptedCompletion::new(report_with_score("N/A"));
        let pipeline = pipeline(&dir, completion, culture());

        let ranked = pipeline.run(vec![resume("alice")], jd()).await.unwrap();

        assert_eq!(ranked[0].matching_score, 0.0);
        assert_eq!(ranked[0].status, CandidateStatus::ScoreUnparsed);
        assert!(ranked[0].report_file.is_some());
        assert_eq!(report_count(&dir), 1);
    }

    #[tokio::test]
    async fn test_negative_score_never_outranks_by_sign() {
        let dir = tempfile::tempdir().unwrap();
        let completion = ScriptedCompletion::new(report_with_score("40%"))
            .on("RESUME-NEG", report_with_score("-5%"));
        let pipeline = pipeline(&dir, completion, culture());

        let ranked = pipeline
            .run(vec![resume("neg"), resume("alice")], jd())
            .await
            .unwrap();

        assert_eq!(ranked[0].candidate_name, "alice");
        assert_eq!(ranked[1].candidate_name, "neg");
        assert_eq!(ranked[1].matching_score, 0.0);
        assert_eq!(ranked[1].status, CandidateStatus::ScoreUnparsed);
    }

    #[tokio::test]
    async fn test_one_candidate_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let completion = ScriptedCompletion::new(report_with_score("60%"))
            .on("RESUME-BOB", Scripted::Fail)
            .on("RESUME-CAROL", Scripted::NoCandidates);
        let pipeline = pipeline(&dir, completion, culture());

        let ranked = pipeline
            .run(
                vec![
                    resume("bob"),
                    resume("alice"),
                    resume("carol"),
                    Document::new("dave.txt", vec![0xffu8, 0xfe]),
                ],
                jd(),
            )
            .await
            .unwrap();

        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(ranked[0].candidate_name, "alice");
        assert_eq!(ranked[0].status, CandidateStatus::Scored);

        let failed: Vec<_> = ranked[1..].iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(failed, vec!["bob", "carol", "dave"]);
        for r in &ranked[1..] {
            assert_eq!(r.status, CandidateStatus::Failed);
            assert!(r.report_file.is_none());
            assert!(r.error.is_some());
        }
        assert!(ranked[2]
            .error
            .as_deref()
            .unwrap()
            .contains("no candidates"));
        assert_eq!(report_count(&dir), 1);
    }

    #[tokio::test]
    async fn test_context_reaches_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let completion = ScriptedCompletion::new(report_with_score("10%"))
            .on("We value ownership.", report_with_score("99%"));
        let pipeline = pipeline(&dir, completion, culture());

        let ranked = pipeline.run(vec![resume("alice")], jd()).await.unwrap();
        assert_eq!(ranked[0].matching_score, 99.0);
    }

    #[tokio::test]
    async fn test_job_description_text_reaches_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let completion = ScriptedCompletion::new(report_with_score("10%"))
            .on("Senior Rust Engineer", report_with_score("77%"));
        let pipeline = pipeline(&dir, completion, culture());

        let ranked = pipeline.run(vec![resume("alice")], jd()).await.unwrap();
        assert_eq!(ranked[0].matching_score, 77.0);
    }

    struct CountingRetriever(AtomicUsize);

    #[async_trait]
    impl ContextRetriever for CountingRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<RetrievedPassage>, RetrievalError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_context_retrieved_once_per_batch() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Arc::new(CountingRetriever(AtomicUsize::new(0)));
        let pipeline = pipeline(
            &dir,
            ScriptedCompletion::new(report_with_score("50%")),
            retriever.clone(),
        );

        pipeline
            .run(vec![resume("a"), resume("b"), resume("c")], jd())
            .await
            .unwrap();
        assert_eq!(retriever.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_resumes_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir, ScriptedCompletion::new(report_with_score("50%")), culture());

        let err = pipeline.run(vec![], jd()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(report_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_unreadable_job_description_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(&dir, ScriptedCompletion::new(report_with_score("50%")), culture());

        let err = pipeline
            .run(vec![resume("alice")], Document::new("jd.pdf", "not a pdf at all"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert_eq!(report_count(&dir), 0);
    }

    #[tokio::test]
    async fn test_retrieval_outage_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(
            &dir,
            ScriptedCompletion::new(report_with_score("50%")),
            Arc::new(FailingRetriever),
        );

        let err = pipeline.run(vec![resume("alice")], jd()).await.unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
        assert_eq!(report_count(&dir), 0);
    }
}
