use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::admin::session::AdminSession;
use crate::errors::AppError;
use crate::models::report::ReportListItem;
use crate::report::store::{get_report, list_reports, Report, DEFAULT_LIST_LIMIT};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/admin/reports
pub async fn handle_list_reports(
    _admin: AdminSession,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ReportListItem>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(list_reports(&state.db, limit).await?))
}

/// GET /api/v1/admin/reports/:id
pub async fn handle_get_report(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Report>, AppError> {
    let report = get_report(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))?;
    Ok(Json(report))
}
