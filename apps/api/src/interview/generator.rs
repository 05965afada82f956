//! Question-set generation: one JSON-mode call that turns résumé text into
//! the flattened, category-tagged interview question list.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::prompts::{QUESTION_SET_PROMPT, QUESTION_SET_SYSTEM};
use crate::interview::question_set::{flatten_question_sets, parse_question_sets};
use crate::llm_client::prompts::{render_prompt, GROUNDING_INSTRUCTION};
use crate::llm_client::{GenerationRequest, TextGenerator};
use crate::models::interview::{Question, QuestionCategory};

/// Candidate metadata collected alongside the résumé.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub college: String,
}

/// Generates the interview questions for a résumé. Single attempt: a reply
/// that is not the expected JSON object fails with `GenerationParse`.
/// Returns an empty list when the reply parsed but held no questions; the
/// caller decides whether that blocks session creation.
pub async fn generate_questions(
    llm: &dyn TextGenerator,
    resume_text: &str,
    candidate: &CandidateProfile,
) -> Result<Vec<Question>, AppError> {
    let prompt = build_question_set_prompt(resume_text, candidate);

    let raw = llm
        .generate(GenerationRequest::json(&prompt, QUESTION_SET_SYSTEM))
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    let sets = parse_question_sets(&raw).map_err(|e| {
        AppError::GenerationParse(format!(
            "Question set reply is not valid JSON ({e}); reply starts with {:?}",
            raw.chars().take(80).collect::<String>()
        ))
    })?;

    let questions = flatten_question_sets(&sets);

    for category in QuestionCategory::ALL {
        let got = questions.iter().filter(|q| q.category == category).count();
        if got != category.expected_count() {
            warn!(
                "Generator returned {got} {} questions (expected {})",
                category.as_str(),
                category.expected_count()
            );
        }
    }
    info!(
        "Generated {} questions for candidate {}",
        questions.len(),
        candidate.email
    );

    Ok(questions)
}

pub fn build_question_set_prompt(resume_text: &str, candidate: &CandidateProfile) -> String {
    let general = QuestionCategory::General.expected_count().to_string();
    let technical = QuestionCategory::Technical.expected_count().to_string();
    let project = QuestionCategory::Project.expected_count().to_string();
    let experience = QuestionCategory::Experience.expected_count().to_string();

    render_prompt(
        QUESTION_SET_PROMPT,
        &[
            ("general_count", general.as_str()),
            ("technical_count", technical.as_str()),
            ("project_count", project.as_str()),
            ("experience_count", experience.as_str()),
            ("grounding_instruction", GROUNDING_INSTRUCTION),
            ("name", candidate.name.as_str()),
            ("email", candidate.email.as_str()),
            ("college", candidate.college.as_str()),
            ("resume_text", resume_text),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::LlmError;

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            college: "IIT".into(),
        }
    }

    #[test]
    fn test_prompt_carries_counts_and_resume() {
        let prompt = build_question_set_prompt("Python developer, built X with Flask", &candidate());
        assert!(prompt.contains("general: 5 concise"));
        assert!(prompt.contains("technical: 8 tailored"));
        assert!(prompt.contains("Candidate: Ada, ada@example.com, IIT"));
        assert!(prompt.ends_with("Python developer, built X with Flask"));
        assert!(!prompt.contains("{name}"));
        assert!(!prompt.contains("{grounding_instruction}"));
    }

    #[test]
    fn test_candidate_fields_with_braces_are_sent_verbatim() {
        let candidate = CandidateProfile {
            name: "{resume_text}".into(),
            email: "{college}".into(),
            college: "IIT".into(),
        };
        let prompt = build_question_set_prompt("SECRET RESUME BODY", &candidate);
        assert!(prompt.contains("Candidate: {resume_text}, {college}, IIT"));
        assert_eq!(prompt.matches("SECRET RESUME BODY").count(), 1);
    }

    #[tokio::test]
    async fn test_generate_questions_flattens_reply() {
        let llm = ScriptedGenerator::new()
            .reply(r#"{"general": ["g1"], "technical": ["t1", "t2"], "project": [], "experience": ["e1"]}"#);
        let questions = generate_questions(&llm, "resume", &candidate()).await.unwrap();
        assert_eq!(questions.len(), 4);
        assert_eq!(questions[3].category, QuestionCategory::Experience);
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompts()[0].contains("Candidate: Ada, ada@example.com, IIT"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_generation_parse_error() {
        let llm = ScriptedGenerator::new().reply("Sure! Here are some questions:");
        let err = generate_questions(&llm, "resume", &candidate())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationParse(_)));
        assert!(err.is_retryable());
        // No automatic retry.
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_is_llm_error() {
        let llm = ScriptedGenerator::new().fail(LlmError::EmptyContent);
        let err = generate_questions(&llm, "resume", &candidate())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
