//! Admin login session carried in a signed cookie:
//! `username:issued_at:credential_stamp`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use chrono::{Duration, Utc};
use tracing::debug;

use crate::admin::credentials::current_credential_stamp;
use crate::errors::AppError;
use crate::state::AppState;

pub const ADMIN_COOKIE: &str = "admin_session";
const SESSION_TTL_HOURS: i64 = 8;

/// An authenticated administrator. Extracting it rejects with 401 when the
/// cookie is missing, tampered, expired, or issued before the account's
/// password last changed (or the account is gone).
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
}

#[derive(Debug, PartialEq, Eq)]
struct SessionValue<'a> {
    username: &'a str,
    issued_at: i64,
    stamp: &'a str,
}

pub fn session_cookie(username: &str, stamp: &str) -> Cookie<'static> {
    Cookie::build((
        ADMIN_COOKIE,
        format!("{username}:{}:{stamp}", Utc::now().timestamp()),
    ))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .build()
}

pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(ADMIN_COOKIE).path("/").build()
}

fn parse_session_value(value: &str) -> Option<SessionValue<'_>> {
    let mut parts = value.rsplitn(3, ':');
    let stamp = parts.next()?;
    let issued_at = parts.next()?.parse().ok()?;
    let username = parts.next()?;
    (!username.is_empty() && !stamp.is_empty()).then_some(SessionValue {
        username,
        issued_at,
        stamp,
    })
}

fn is_expired(issued_at: i64) -> bool {
    Utc::now().timestamp() - issued_at > Duration::hours(SESSION_TTL_HOURS).num_seconds()
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(|never| -> AppError { match never {} })?;

        let cookie = jar.get(ADMIN_COOKIE).ok_or(AppError::Unauthorized)?;
        let session = parse_session_value(cookie.value()).ok_or(AppError::Unauthorized)?;

        if is_expired(session.issued_at) {
            debug!("Admin session for '{}' expired", session.username);
            return Err(AppError::Unauthorized);
        }
        let current = current_credential_stamp(&state.db, session.username).await?;
        if current.as_deref() != Some(session.stamp) {
            debug!("Admin session for '{}' predates its credentials", session.username);
            return Err(AppError::Unauthorized);
        }

        Ok(AdminSession {
            username: session.username.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_value_round_trip() {
        let cookie = session_cookie("admin", "AbC-_9");
        let session = parse_session_value(cookie.value()).unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.stamp, "AbC-_9");
        assert!(!is_expired(session.issued_at));
    }

    #[test]
    fn test_usernames_with_colons_parse() {
        assert_eq!(
            parse_session_value("a:b:100:xyz"),
            Some(SessionValue {
                username: "a:b",
                issued_at: 100,
                stamp: "xyz",
            })
        );
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(parse_session_value("admin").is_none());
        assert!(parse_session_value("admin:100").is_none());
        assert!(parse_session_value(":100:xyz").is_none());
        assert!(parse_session_value("admin:100:").is_none());
        assert!(parse_session_value("admin:soon:xyz").is_none());
    }

    #[test]
    fn test_old_sessions_expire() {
        let nine_hours_ago = Utc::now().timestamp() - 9 * 3600;
        assert!(is_expired(nine_hours_ago));
    }
}
