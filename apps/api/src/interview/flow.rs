//! Interview flow: résumé, questions, answers, report.
//!
//! Flow: generate_questions → create_interview → record_answer (×N) →
//!       mark_complete → synthesize_report → insert_report.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::generator::{generate_questions, CandidateProfile};
use crate::interview::session::{
    claim_report, create_interview, mark_complete, record_answer, release_report_claim, Interview,
    SessionState,
};
use crate::llm_client::TextGenerator;
use crate::report::store::{find_report_id_for_interview, insert_report, NewReport};
use crate::report::synthesizer::synthesize_report;

/// Result of submitting one answer.
#[derive(Debug)]
pub enum AnswerOutcome {
    /// More questions remain.
    Next(Interview),
    /// That was the last answer; the report has been stored.
    Completed { interview: Interview, report_id: i64 },
}

/// Generates questions for the résumé and opens a session for them.
/// Nothing is stored when generation fails or yields no questions.
pub async fn start_interview(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    candidate: CandidateProfile,
    resume_text: &str,
) -> Result<Interview, AppError> {
    let questions = generate_questions(llm, resume_text, &candidate).await?;

    if questions.is_empty() {
        return Err(AppError::Validation(
            "No questions were generated. The resume might be empty or unsupported.".to_string(),
        ));
    }

    create_interview(pool, &candidate, resume_text, &questions).await
}

/// Records an answer; on the last one, runs report synthesis.
pub async fn submit_answer(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    interview_id: i64,
    answer: &str,
) -> Result<AnswerOutcome, AppError> {
    let interview = record_answer(pool, interview_id, answer).await?;

    if interview.state() != SessionState::Complete {
        return Ok(AnswerOutcome::Next(interview));
    }

    info!("Interview {interview_id} complete, synthesizing report");
    let report_id = finalize_interview(pool, llm, &interview).await?;
    Ok(AnswerOutcome::Completed {
        interview,
        report_id,
    })
}

/// Produces the report for a completed interview, at most once.
/// Later calls return the id of the report already stored. While another
/// request holds the synthesis claim, callers get a `Conflict` and may retry.
pub async fn finalize_interview(
    pool: &SqlitePool,
    llm: &dyn TextGenerator,
    interview: &Interview,
) -> Result<i64, AppError> {
    if let Some(report_id) = find_report_id_for_interview(pool, interview.id).await? {
        return Ok(report_id);
    }

    if interview.current_index() < interview.total() {
        return Err(AppError::Conflict(format!(
            "Interview {} is not complete ({})",
            interview.id,
            interview.progress_label()
        )));
    }

    mark_complete(pool, interview.id).await?;

    if !claim_report(pool, interview.id).await? {
        if let Some(report_id) = find_report_id_for_interview(pool, interview.id).await? {
            return Ok(report_id);
        }
        return Err(AppError::Conflict(format!(
            "The report for interview {} is still being generated; try again shortly",
            interview.id
        )));
    }

    let transcript = interview.transcript();
    let body = synthesize_report(llm, &interview.resume_text, &transcript).await;

    let inserted = insert_report(
        pool,
        NewReport {
            interview_id: Some(interview.id),
            candidate_name: &interview.candidate.name,
            email: &interview.candidate.email,
            resume_text: &interview.resume_text,
            transcript: &transcript,
            body: &body,
        },
    )
    .await;

    if inserted.is_err() {
        if let Err(e) = release_report_claim(pool, interview.id).await {
            warn!("Could not release report claim for interview {}: {e}", interview.id);
        }
    }
    inserted
}
