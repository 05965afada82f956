use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::AppError;
use crate::models::interview::TranscriptEntry;
use crate::models::report::{ReportBody, ReportListItem, ReportRow};
use crate::models::{decode_versioned, encode_versioned};

/// Default and upper bound for the admin report list.
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Parameters for persisting a finished report.
pub struct NewReport<'a> {
    pub interview_id: Option<i64>,
    pub candidate_name: &'a str,
    pub email: &'a str,
    pub resume_text: &'a str,
    pub transcript: &'a [TranscriptEntry],
    pub body: &'a ReportBody,
}

/// A stored report with its JSON columns decoded.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: i64,
    pub interview_id: Option<i64>,
    pub candidate_name: String,
    pub email: String,
    pub resume_text: String,
    pub transcript: Vec<TranscriptEntry>,
    pub report: ReportBody,
    pub overall_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = AppError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        Ok(Report {
            id: row.id,
            interview_id: row.interview_id,
            candidate_name: row.candidate_name,
            email: row.email,
            resume_text: row.resume_text,
            transcript: decode_versioned("transcript_json", &row.transcript_json)?,
            report: decode_versioned("report_json", &row.report_json)?,
            overall_score: row.overall_score,
            created_at: row.created_at,
        })
    }
}

/// Inserts a report. Reports are immutable and there is at most one per
/// interview: a second insert for the same interview returns the first id.
pub async fn insert_report(pool: &SqlitePool, new: NewReport<'_>) -> Result<i64, AppError> {
    let transcript_json = encode_versioned(&new.transcript)?;
    let report_json = encode_versioned(new.body)?;

    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO reports
            (interview_id, candidate_name, email, resume_text,
             transcript_json, report_json, overall_score, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT(interview_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(new.interview_id)
    .bind(new.candidate_name)
    .bind(new.email)
    .bind(new.resume_text)
    .bind(&transcript_json)
    .bind(&report_json)
    .bind(new.body.overall_score())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    let id = match (inserted, new.interview_id) {
        (Some(id), _) => id,
        (None, Some(interview_id)) => find_report_id_for_interview(pool, interview_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(anyhow!(
                    "Report insert for interview {interview_id} conflicted but no row exists"
                ))
            })?,
        (None, None) => {
            return Err(AppError::Internal(anyhow!("Report insert returned no id")));
        }
    };

    info!(
        "Saved report {id} for {} (degraded: {})",
        new.email,
        new.body.is_degraded()
    );
    Ok(id)
}

pub async fn find_report_id_for_interview(
    pool: &SqlitePool,
    interview_id: i64,
) -> Result<Option<i64>, AppError> {
    Ok(
        sqlx::query_scalar("SELECT id FROM reports WHERE interview_id = $1")
            .bind(interview_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Most recent first, at most `limit` rows (clamped to 1..=DEFAULT_LIST_LIMIT).
pub async fn list_reports(pool: &SqlitePool, limit: i64) -> Result<Vec<ReportListItem>, AppError> {
    let limit = limit.clamp(1, DEFAULT_LIST_LIMIT);
    Ok(sqlx::query_as::<_, ReportListItem>(
        r#"
        SELECT id, candidate_name, email, overall_score, created_at
        FROM reports
        ORDER BY created_at DESC, id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn get_report(pool: &SqlitePool, id: i64) -> Result<Option<Report>, AppError> {
    sqlx::query_as::<_, ReportRow>("SELECT * FROM reports WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Report::try_from)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::interview::QuestionCategory;
    use crate::models::report::{Evaluation, Recommendation};

    fn transcript() -> Vec<TranscriptEntry> {
        vec![
            TranscriptEntry {
                question: "Tell me about yourself".into(),
                answer: "I build Flask apps".into(),
                category: QuestionCategory::General,
            },
            TranscriptEntry {
                question: "Explain the GIL".into(),
                answer: "A global lock".into(),
                category: QuestionCategory::Technical,
            },
            TranscriptEntry {
                question: "What did X do?".into(),
                answer: "Tracked orders".into(),
                category: QuestionCategory::Project,
            },
        ]
    }

    fn evaluated(score: u8) -> ReportBody {
        ReportBody::Evaluated(Evaluation {
            overall_score: score,
            strengths: vec!["Clear communicator".into()],
            weaknesses: vec![],
            recommendation: Recommendation::Consider,
            summary: "Decent".into(),
        })
    }

    async fn save(pool: &SqlitePool, name: &str, body: &ReportBody) -> i64 {
        let transcript = transcript();
        insert_report(
            pool,
            NewReport {
                interview_id: None,
                candidate_name: name,
                email: "c@example.com",
                resume_text: "cv",
                transcript: &transcript,
                body,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_transcript_round_trips_in_order() {
        let pool = test_pool().await;
        let body = evaluated(64);
        let id = save(&pool, "Alan", &body).await;

        let report = get_report(&pool, id).await.unwrap().unwrap();
        assert_eq!(report.transcript, transcript());
        assert_eq!(report.report, body);
        assert_eq!(report.overall_score, Some(64.0));
        assert_eq!(report.candidate_name, "Alan");
    }

    #[tokio::test]
    async fn test_degraded_report_has_no_score() {
        let pool = test_pool().await;
        let body = ReportBody::Degraded {
            error: "Failed to generate a valid JSON report.".into(),
            raw: "oops".into(),
        };
        let id = save(&pool, "Bea", &body).await;
        let report = get_report(&pool, id).await.unwrap().unwrap();
        assert!(report.report.is_degraded());
        assert_eq!(report.overall_score, None);
    }

    #[tokio::test]
    async fn test_list_is_most_recent_first_and_bounded() {
        let pool = test_pool().await;
        let first = save(&pool, "first", &evaluated(10)).await;
        let second = save(&pool, "second", &evaluated(20)).await;
        let third = save(&pool, "third", &evaluated(30)).await;

        let all = list_reports(&pool, DEFAULT_LIST_LIMIT).await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let bounded = list_reports(&pool, 2).await.unwrap();
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].id, third);
    }

    #[tokio::test]
    async fn test_unknown_report_is_none() {
        let pool = test_pool().await;
        assert!(get_report(&pool, 12345).await.unwrap().is_none());
    }
}
