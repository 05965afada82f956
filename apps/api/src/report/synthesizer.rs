//! Report synthesis: turns a finished transcript into a hiring report.
//!
//! Never fails: when the service errors or replies with something that is
//! not a valid report, the result is a `ReportBody::Degraded` carrying the
//! raw reply so the interview is still persisted.

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm_client::prompts::{render_prompt, GROUNDING_INSTRUCTION};
use crate::llm_client::{strip_json_fences, GenerationRequest, TextGenerator};
use crate::models::interview::TranscriptEntry;
use crate::models::report::{Evaluation, Recommendation, ReportBody};
use crate::report::prompts::{REPORT_PROMPT, REPORT_SYSTEM};

pub const DEGRADED_REPORT_ERROR: &str = "Failed to generate a valid JSON report.";

/// Lenient view of the reply; validated into `Evaluation`.
#[derive(Debug, Deserialize)]
struct RawEvaluation {
    overall_score: f64,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default, alias = "risks")]
    weaknesses: Vec<String>,
    recommendation: Recommendation,
    #[serde(default)]
    summary: String,
}

pub async fn synthesize_report(
    llm: &dyn TextGenerator,
    resume_text: &str,
    transcript: &[TranscriptEntry],
) -> ReportBody {
    let prompt = build_report_prompt(resume_text, transcript);

    let raw = match llm
        .generate(GenerationRequest::json(&prompt, REPORT_SYSTEM))
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Report generation call failed: {e}");
            return ReportBody::Degraded {
                error: format!("{DEGRADED_REPORT_ERROR} Generation service error: {e}"),
                raw: String::new(),
            };
        }
    };

    match parse_evaluation(&raw) {
        Ok(evaluation) => {
            info!(
                "Report synthesized: score={}, recommendation={:?}",
                evaluation.overall_score, evaluation.recommendation
            );
            ReportBody::Evaluated(evaluation)
        }
        Err(reason) => {
            warn!("Storing degraded report: {reason}");
            ReportBody::Degraded {
                error: format!("{DEGRADED_REPORT_ERROR} {reason}"),
                raw,
            }
        }
    }
}

/// Parses and validates a report reply. Fractional scores are rounded.
pub fn parse_evaluation(raw: &str) -> Result<Evaluation, String> {
    let parsed: RawEvaluation =
        serde_json::from_str(strip_json_fences(raw)).map_err(|e| format!("Parse error: {e}"))?;

    if !parsed.overall_score.is_finite() || !(0.0..=100.0).contains(&parsed.overall_score) {
        return Err(format!(
            "overall_score {} is outside 0-100",
            parsed.overall_score
        ));
    }

    Ok(Evaluation {
        overall_score: parsed.overall_score.round() as u8,
        strengths: parsed.strengths,
        weaknesses: parsed.weaknesses,
        recommendation: parsed.recommendation,
        summary: parsed.summary,
    })
}

pub fn build_report_prompt(resume_text: &str, transcript: &[TranscriptEntry]) -> String {
    let qna = transcript
        .iter()
        .map(|entry| {
            format!(
                "[{}] Q: {}\nA: {}",
                entry.category.as_str(),
                entry.question,
                entry.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    render_prompt(
        REPORT_PROMPT,
        &[
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("resume_text", resume_text),
            ("transcript", qna.as_str()),
        ],
    )
}
