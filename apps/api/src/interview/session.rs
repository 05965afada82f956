//! Interview Session Manager.
//!
//! A session moves `Created → InProgress → Complete` one answer at a time.
//! Invariant: `current_index == answers.len()`, and the completion flag is
//! set in the same update that makes the index reach the question count.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::generator::CandidateProfile;
use crate::models::interview::{InterviewRow, Question, TranscriptEntry};
use crate::models::{decode_versioned, encode_versioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    InProgress,
    Complete,
}

impl SessionState {
    pub fn from_progress(answered: usize, total: usize) -> Self {
        if answered >= total {
            SessionState::Complete
        } else if answered == 0 {
            SessionState::Created
        } else {
            SessionState::InProgress
        }
    }
}

/// Decoded snapshot of one interview row.
#[derive(Debug, Clone)]
pub struct Interview {
    pub id: i64,
    pub token: String,
    pub candidate: CandidateProfile,
    pub resume_text: String,
    pub questions: Vec<Question>,
    pub answers: Vec<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// 0-based index of the next question; equals the number of answers.
    pub fn current_index(&self) -> usize {
        self.answers.len()
    }

    pub fn state(&self) -> SessionState {
        if self.is_completed {
            return SessionState::Complete;
        }
        SessionState::from_progress(self.current_index(), self.total())
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index())
    }

    /// "3 / 23" style label for the question currently shown.
    pub fn progress_label(&self) -> String {
        let shown = (self.current_index() + 1).min(self.total());
        format!("{shown} / {}", self.total())
    }

    /// Answered questions in interview order.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.questions
            .iter()
            .zip(&self.answers)
            .map(|(q, a)| TranscriptEntry {
                question: q.text.clone(),
                answer: a.clone(),
                category: q.category,
            })
            .collect()
    }
}

impl TryFrom<InterviewRow> for Interview {
    type Error = AppError;

    fn try_from(row: InterviewRow) -> Result<Self, Self::Error> {
        let questions: Vec<Question> = decode_versioned("questions_json", &row.questions_json)?;
        let answers: Vec<String> = decode_versioned("answers_json", &row.answers_json)?;

        if usize::try_from(row.current_question_index).ok() != Some(answers.len())
            || answers.len() > questions.len()
        {
            return Err(AppError::Internal(anyhow!(
                "Interview {} is inconsistent: index={}, answers={}, questions={}",
                row.id,
                row.current_question_index,
                answers.len(),
                questions.len()
            )));
        }

        Ok(Interview {
            id: row.id,
            token: row.token,
            candidate: CandidateProfile {
                name: row.candidate_name,
                email: row.email,
                college: row.college,
            },
            resume_text: row.resume_text,
            questions,
            answers,
            is_completed: row.is_completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Creates a session at index 0 with no answers and a fresh token.
pub async fn create_interview(
    pool: &SqlitePool,
    candidate: &CandidateProfile,
    resume_text: &str,
    questions: &[Question],
) -> Result<Interview, AppError> {
    if questions.is_empty() {
        return Err(AppError::Validation(
            "An interview needs at least one question".to_string(),
        ));
    }

    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    let questions_json = encode_versioned(&questions)?;
    let answers_json = encode_versioned(&Vec::<String>::new())?;

    let row = sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews
            (token, candidate_name, email, college, resume_text,
             questions_json, current_question_index, answers_json, is_completed,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, 0, $7, 0, $8, $8)
        RETURNING *
        "#,
    )
    .bind(&token)
    .bind(&candidate.name)
    .bind(&candidate.email)
    .bind(&candidate.college)
    .bind(resume_text)
    .bind(&questions_json)
    .bind(&answers_json)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!(
        "Created interview {} with {} questions for {}",
        row.id,
        questions.len(),
        candidate.email
    );

    Interview::try_from(row)
}

pub async fn get_interview(pool: &SqlitePool, id: i64) -> Result<Option<Interview>, AppError> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Interview::try_from)
        .transpose()
}

/// Session lookup used by the HTTP layer: the token is the only handle a
/// candidate holds.
pub async fn get_interview_by_token(
    pool: &SqlitePool,
    token: &str,
) -> Result<Option<Interview>, AppError> {
    sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE token = $1")
        .bind(token)
        .fetch_optional(pool)
        .await?
        .map(Interview::try_from)
        .transpose()
}

/// Appends an answer and advances the index by one.
///
/// The update is guarded by the index we read, so two racing submissions
/// cannot both land on the same question. A complete session is never
/// mutated.
pub async fn record_answer(
    pool: &SqlitePool,
    id: i64,
    answer: &str,
) -> Result<Interview, AppError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::Validation("Please provide an answer.".to_string()));
    }

    let mut interview = get_interview(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    if interview.state() == SessionState::Complete {
        return Err(AppError::Conflict(format!(
            "Interview {id} is already complete"
        )));
    }

    let expected_index = interview.current_index() as i64;
    interview.answers.push(answer.to_string());
    let new_index = interview.current_index();
    let completed = new_index >= interview.total();
    let answers_json = encode_versioned(&interview.answers)?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE interviews
        SET answers_json = $1, current_question_index = $2, is_completed = $3, updated_at = $4
        WHERE id = $5 AND current_question_index = $6 AND is_completed = 0
        "#,
    )
    .bind(&answers_json)
    .bind(new_index as i64)
    .bind(completed)
    .bind(now)
    .bind(id)
    .bind(expected_index)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Interview {id} changed while the answer was being saved; reload and retry"
        )));
    }

    interview.is_completed = completed;
    interview.updated_at = now;

    info!(
        "Interview {id}: recorded answer {new_index}/{}",
        interview.total()
    );

    Ok(interview)
}

/// Sets the completion flag. Idempotent; refuses sessions with unanswered
/// questions so the flag never runs ahead of the index.
pub async fn mark_complete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    let interview = get_interview(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;

    if interview.is_completed {
        return Ok(());
    }
    if interview.current_index() < interview.total() {
        return Err(AppError::Conflict(format!(
            "Interview {id} still has {} unanswered questions",
            interview.total() - interview.current_index()
        )));
    }

    sqlx::query("UPDATE interviews SET is_completed = 1, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// A claim older than this may be taken over by another request.
pub const REPORT_CLAIM_TTL_SECS: i64 = 600;

/// Claims report synthesis for a completed interview. Only one caller gets
/// `true` until the claim is released or goes stale.
pub async fn claim_report(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let now = Utc::now().timestamp();
    let result = sqlx::query(
        r#"
        UPDATE interviews
        SET report_claimed_at = $1
        WHERE id = $2
          AND is_completed = 1
          AND (report_claimed_at IS NULL OR report_claimed_at < $3)
        "#,
    )
    .bind(now)
    .bind(id)
    .bind(now - REPORT_CLAIM_TTL_SECS)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn release_report_claim(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query("UPDATE interviews SET report_claimed_at = NULL WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::interview::QuestionCategory;

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            college: "MIT".into(),
        }
    }

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                category: if i == 0 {
                    QuestionCategory::General
                } else {
                    QuestionCategory::Technical
                },
                text: format!("Question {i}?"),
            })
            .collect()
    }

    async fn stored_index(pool: &SqlitePool, id: i64) -> i64 {
        sqlx::query_scalar("SELECT current_question_index FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_state_from_progress() {
        assert_eq!(SessionState::from_progress(0, 3), SessionState::Created);
        assert_eq!(SessionState::from_progress(2, 3), SessionState::InProgress);
        assert_eq!(SessionState::from_progress(3, 3), SessionState::Complete);
    }

    #[tokio::test]
    async fn test_create_starts_at_zero() {
        let pool = test_pool().await;
        let interview = create_interview(&pool, &candidate(), "cv", &questions(3))
            .await
            .unwrap();
        assert_eq!(interview.current_index(), 0);
        assert!(interview.answers.is_empty());
        assert!(!interview.is_completed);
        assert_eq!(interview.state(), SessionState::Created);
        assert_eq!(interview.progress_label(), "1 / 3");
        assert_eq!(interview.current_question().unwrap().text, "Question 0?");
        assert!(!interview.token.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_question_list() {
        let pool = test_pool().await;
        let err = create_interview(&pool, &candidate(), "cv", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interviews")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_lookup_by_id_and_token() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(2))
            .await
            .unwrap();

        let by_id = get_interview(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(by_id.questions, created.questions);

        let by_token = get_interview_by_token(&pool, &created.token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_token.id, created.id);

        assert!(get_interview(&pool, 999).await.unwrap().is_none());
        assert!(get_interview_by_token(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_index_tracks_answer_count() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(3))
            .await
            .unwrap();

        for expected in 1..=3 {
            let updated = record_answer(&pool, created.id, "  an answer  ")
                .await
                .unwrap();
            assert_eq!(updated.current_index(), expected);
            assert_eq!(updated.answers.len(), expected);
            assert_eq!(stored_index(&pool, created.id).await, expected as i64);

            let reloaded = get_interview(&pool, created.id).await.unwrap().unwrap();
            assert_eq!(reloaded.answers.len(), reloaded.current_index());
        }

        let done = get_interview(&pool, created.id).await.unwrap().unwrap();
        assert!(done.is_completed);
        assert_eq!(done.state(), SessionState::Complete);
        assert_eq!(done.answers[0], "an answer");
        assert!(done.current_question().is_none());
    }

    #[tokio::test]
    async fn test_state_moves_through_in_progress() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(2))
            .await
            .unwrap();
        let after_one = record_answer(&pool, created.id, "a").await.unwrap();
        assert_eq!(after_one.state(), SessionState::InProgress);
        assert!(!after_one.is_completed);
        assert_eq!(after_one.progress_label(), "2 / 2");
    }

    #[tokio::test]
    async fn test_answer_on_complete_session_does_not_mutate() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(1))
            .await
            .unwrap();
        record_answer(&pool, created.id, "only").await.unwrap();
        let before = get_interview(&pool, created.id).await.unwrap().unwrap();

        let err = record_answer(&pool, created.id, "extra").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let after = get_interview(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(after.answers, before.answers);
        assert_eq!(after.current_index(), 1);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_empty_answer_is_rejected_without_mutation() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(2))
            .await
            .unwrap();
        let err = record_answer(&pool, created.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stored_index(&pool, created.id).await, 0);
    }

    #[tokio::test]
    async fn test_answer_for_unknown_id_is_not_found() {
        let pool = test_pool().await;
        let err = record_answer(&pool, 42, "hello").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transcript_pairs_questions_with_answers() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(3))
            .await
            .unwrap();
        record_answer(&pool, created.id, "first").await.unwrap();
        let interview = record_answer(&pool, created.id, "second").await.unwrap();

        let transcript = interview.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].question, "Question 0?");
        assert_eq!(transcript[0].answer, "first");
        assert_eq!(transcript[0].category, QuestionCategory::General);
        assert_eq!(transcript[1].category, QuestionCategory::Technical);
    }

    #[tokio::test]
    async fn test_mark_complete_is_idempotent_and_guarded() {
        let pool = test_pool().await;
        let created = create_interview(&pool, &candidate(), "cv", &questions(1))
            .await
            .unwrap();

        let err = mark_complete(&pool, created.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        record_answer(&pool, created.id, "done").await.unwrap();
        mark_complete(&pool, created.id).await.unwrap();
        mark_complete(&pool, created.id).await.unwrap();

        let interview = get_interview(&pool, created.id).await.unwrap().unwrap();
        assert!(interview.is_completed);

        assert!(matches!(
            mark_complete(&pool, 777).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    async fn completed_interview(pool: &SqlitePool) -> Interview {
        let interview = create_interview(pool, &candidate(), "cv", &questions(1))
            .await
            .unwrap();
        record_answer(pool, interview.id, "done").await.unwrap()
    }

    #[tokio::test]
    async fn test_report_claim_is_exclusive() {
        let pool = test_pool().await;
        let interview = completed_interview(&pool).await;

        assert!(claim_report(&pool, interview.id).await.unwrap());
        assert!(!claim_report(&pool, interview.id).await.unwrap());

        release_report_claim(&pool, interview.id).await.unwrap();
        assert!(claim_report(&pool, interview.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_stale_report_claim_can_be_taken_over() {
        let pool = test_pool().await;
        let interview = completed_interview(&pool).await;
        assert!(claim_report(&pool, interview.id).await.unwrap());

        sqlx::query("UPDATE interviews SET report_claimed_at = $1 WHERE id = $2")
            .bind(Utc::now().timestamp() - REPORT_CLAIM_TTL_SECS - 60)
            .bind(interview.id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(claim_report(&pool, interview.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_report_claim_requires_completion() {
        let pool = test_pool().await;
        let interview = create_interview(&pool, &candidate(), "cv", &questions(2))
            .await
            .unwrap();
        assert!(!claim_report(&pool, interview.id).await.unwrap());
    }
}
