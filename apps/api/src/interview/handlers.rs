//! Axum route handlers for the candidate interview.
//!
//! The candidate's only handle on a session is its token, sent either as
//! the `x-interview-token` header or in the signed `interview_token` cookie.

use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart, State},
    http::{request::Parts, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::flow::{finalize_interview, start_interview, submit_answer, AnswerOutcome};
use crate::interview::generator::CandidateProfile;
use crate::interview::resume::{extract_resume_text, normalize_resume_text, ResumeUpload};
use crate::interview::session::{get_interview_by_token, Interview, SessionState};
use crate::models::interview::{QuestionCategory, TranscriptEntry};
use crate::state::AppState;

pub const INTERVIEW_COOKIE: &str = "interview_token";
pub const INTERVIEW_TOKEN_HEADER: &str = "x-interview-token";

// ────────────────────────────────────────────────────────────────────────────
// Session token
// ────────────────────────────────────────────────────────────────────────────

/// The session token presented by the client. Not yet validated; pass it
/// to `load_interview` to resolve the session.
#[derive(Debug, Clone)]
pub struct InterviewToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for InterviewToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(value) = parts.headers.get(INTERVIEW_TOKEN_HEADER) {
            let token = value
                .to_str()
                .map_err(|_| AppError::Validation("Malformed interview token".to_string()))?;
            return Ok(InterviewToken(token.trim().to_string()));
        }

        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|never| -> AppError { match never {} })?;
        jar.get(INTERVIEW_COOKIE)
            .map(|cookie| InterviewToken(cookie.value().to_string()))
            .ok_or_else(session_expired)
    }
}

fn session_expired() -> AppError {
    AppError::NotFound("Your session has expired. Please start over.".to_string())
}

async fn load_interview(state: &AppState, token: &InterviewToken) -> Result<Interview, AppError> {
    get_interview_by_token(&state.db, &token.0)
        .await?
        .ok_or_else(session_expired)
}

fn token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((INTERVIEW_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub category: QuestionCategory,
    pub text: String,
}

/// What the candidate sees between answers.
#[derive(Debug, Serialize)]
pub struct InterviewView {
    pub interview_id: i64,
    pub candidate_name: String,
    pub state: SessionState,
    pub progress: String,
    pub answered: usize,
    pub total: usize,
    pub current_question: Option<QuestionView>,
    pub history: Vec<TranscriptEntry>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Interview> for InterviewView {
    fn from(interview: &Interview) -> Self {
        InterviewView {
            interview_id: interview.id,
            candidate_name: interview.candidate.name.clone(),
            state: interview.state(),
            progress: interview.progress_label(),
            answered: interview.current_index(),
            total: interview.total(),
            current_question: interview.current_question().map(|q| QuestionView {
                index: interview.current_index(),
                category: q.category,
                text: q.text.clone(),
            }),
            history: interview.transcript(),
            started_at: interview.created_at,
            updated_at: interview.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub token: String,
    pub interview: InterviewView,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub interview: InterviewView,
    /// Set once the last answer is in and the report is stored.
    pub report_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FinishResponse {
    pub report_id: i64,
}

/// Fields collected from the start form.
#[derive(Debug, Default)]
struct StartForm {
    name: String,
    email: String,
    college: String,
    resume: Option<ResumeUpload>,
    resume_text: Option<String>,
}

async fn read_start_form(mut multipart: Multipart) -> Result<StartForm, AppError> {
    let bad_body = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("Invalid form submission: {e}"))
    };

    let mut form = StartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = field.text().await.map_err(bad_body)?.trim().to_string(),
            "email" => form.email = field.text().await.map_err(bad_body)?.trim().to_string(),
            "college" => form.college = field.text().await.map_err(bad_body)?.trim().to_string(),
            "resume_text" => form.resume_text = Some(field.text().await.map_err(bad_body)?),
            "resume" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_body)?;
                if !bytes.is_empty() {
                    form.resume = Some(ResumeUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Multipart form: name, email, college, and either a `resume` file (PDF or
/// plain text) or a `resume_text` field. Generates the questions and opens
/// the session.
pub async fn handle_start(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    multipart: Multipart,
) -> Result<(StatusCode, SignedCookieJar, Json<StartResponse>), AppError> {
    let form = read_start_form(multipart).await?;
    let missing = || {
        AppError::Validation("Please fill all fields and upload your resume PDF.".to_string())
    };

    if form.name.is_empty() || form.email.is_empty() || form.college.is_empty() {
        return Err(missing());
    }

    let resume_text = match (form.resume, form.resume_text) {
        (Some(upload), _) => extract_resume_text(upload).await?,
        (None, Some(text)) if !text.trim().is_empty() => normalize_resume_text(&text),
        _ => return Err(missing()),
    };

    let candidate = CandidateProfile {
        name: form.name,
        email: form.email,
        college: form.college,
    };
    let interview = start_interview(&state.db, state.llm.as_ref(), candidate, &resume_text).await?;

    Ok((
        StatusCode::CREATED,
        jar.add(token_cookie(&interview.token)),
        Json(StartResponse {
            token: interview.token.clone(),
            interview: InterviewView::from(&interview),
        }),
    ))
}

/// GET /api/v1/interviews/current
pub async fn handle_current(
    State(state): State<AppState>,
    token: InterviewToken,
) -> Result<Json<InterviewView>, AppError> {
    let interview = load_interview(&state, &token).await?;
    Ok(Json(InterviewView::from(&interview)))
}

/// POST /api/v1/interviews/current/answers
///
/// Records the answer to the current question. The last answer also
/// triggers report synthesis.
pub async fn handle_answer(
    State(state): State<AppState>,
    token: InterviewToken,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let interview = load_interview(&state, &token).await?;

    let response = match submit_answer(&state.db, state.llm.as_ref(), interview.id, &request.answer)
        .await?
    {
        AnswerOutcome::Next(interview) => AnswerResponse {
            interview: InterviewView::from(&interview),
            report_id: None,
        },
        AnswerOutcome::Completed {
            interview,
            report_id,
        } => AnswerResponse {
            interview: InterviewView::from(&interview),
            report_id: Some(report_id),
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/interviews/current/finish
///
/// Idempotent: returns the stored report, synthesizing it only if the
/// completion step did not get to it. Clears the session cookie.
pub async fn handle_finish(
    State(state): State<AppState>,
    token: InterviewToken,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Json<FinishResponse>), AppError> {
    let interview = load_interview(&state, &token).await?;
    let report_id = finalize_interview(&state.db, state.llm.as_ref(), &interview).await?;

    Ok((
        jar.remove(Cookie::build(INTERVIEW_COOKIE).path("/").build()),
        Json(FinishResponse { report_id }),
    ))
}
