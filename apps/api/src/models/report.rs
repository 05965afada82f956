use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub id: i64,
    pub interview_id: Option<i64>,
    pub candidate_name: String,
    pub email: String,
    pub resume_text: String,
    pub transcript_json: String,
    pub report_json: String,
    pub overall_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Summary row for the admin report list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReportListItem {
    pub id: i64,
    pub candidate_name: String,
    pub email: String,
    pub overall_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Hiring recommendation vocabulary the synthesizer must choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strongly Recommend")]
    StronglyRecommend,
    #[serde(rename = "Recommend")]
    Recommend,
    #[serde(rename = "Consider")]
    Consider,
    #[serde(rename = "Do Not Proceed")]
    DoNotProceed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// 0 – 100
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendation: Recommendation,
    pub summary: String,
}

/// Stored report body. `Degraded` keeps the raw reply when synthesis failed,
/// so the interview data is never lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportBody {
    Evaluated(Evaluation),
    Degraded { error: String, raw: String },
}

impl ReportBody {
    pub fn overall_score(&self) -> Option<f64> {
        match self {
            ReportBody::Evaluated(evaluation) => Some(f64::from(evaluation.overall_score)),
            ReportBody::Degraded { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReportBody::Degraded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_uses_display_vocabulary() {
        let r: Recommendation = serde_json::from_str(r#""Do Not Proceed""#).unwrap();
        assert_eq!(r, Recommendation::DoNotProceed);
        assert!(serde_json::from_str::<Recommendation>(r#""Maybe""#).is_err());
    }

    #[test]
    fn test_degraded_body_is_tagged() {
        let body = ReportBody::Degraded {
            error: "Failed to generate a valid JSON report.".into(),
            raw: "not json".into(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["raw"], "not json");
        assert_eq!(body.overall_score(), None);
    }

    #[test]
    fn test_evaluated_body_flattens_fields() {
        let body = ReportBody::Evaluated(Evaluation {
            overall_score: 72,
            strengths: vec!["Flask".into()],
            weaknesses: vec![],
            recommendation: Recommendation::Consider,
            summary: "Solid".into(),
        });
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "evaluated");
        assert_eq!(value["overall_score"], 72);
        assert_eq!(value["recommendation"], "Consider");
        let back: ReportBody = serde_json::from_value(value).unwrap();
        assert_eq!(back, body);
        assert_eq!(back.overall_score(), Some(72.0));
    }
}
