//! Axum route handlers for administrator login and account management.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::admin::credentials::{current_credential_stamp, upsert_admin, verify_admin};
use crate::admin::session::{removal_cookie, session_cookie, AdminSession};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
}

/// POST /api/v1/admin/login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<CredentialsRequest>,
) -> Result<(SignedCookieJar, Json<LoginResponse>), AppError> {
    let username = request.username.trim().to_string();
    if !verify_admin(&state.db, &username, &request.password).await? {
        warn!("Failed admin login for '{username}'");
        return Err(AppError::Unauthorized);
    }

    let stamp = current_credential_stamp(&state.db, &username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    info!("Administrator '{username}' logged in");
    Ok((
        jar.add(session_cookie(&username, &stamp)),
        Json(LoginResponse { username }),
    ))
}

/// POST /api/v1/admin/logout
pub async fn handle_logout(jar: SignedCookieJar) -> (SignedCookieJar, StatusCode) {
    (jar.remove(removal_cookie()), StatusCode::NO_CONTENT)
}

/// PUT /api/v1/admin/credentials
///
/// Creates an administrator or replaces its password. Changing a password
/// ends that account's existing sessions; when the caller changed their
/// own, a fresh cookie is issued with the response.
pub async fn handle_upsert_credentials(
    admin: AdminSession,
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<CredentialsRequest>,
) -> Result<(SignedCookieJar, StatusCode), AppError> {
    let username = request.username.trim();
    upsert_admin(&state.db, username, &request.password).await?;
    info!(
        "Administrator '{}' updated credentials for '{username}'",
        admin.username
    );

    if username != admin.username {
        return Ok((jar, StatusCode::NO_CONTENT));
    }
    let stamp = current_credential_stamp(&state.db, username)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok((
        jar.add(session_cookie(username, &stamp)),
        StatusCode::NO_CONTENT,
    ))
}
