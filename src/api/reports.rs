//! Monthly report endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::report::{MonthSummary, MonthlyReport},
};

use super::AuthenticatedStaff;

/// Months with timesheet activity, newest first
#[utoipa::path(
    get,
    path = "/reports/months",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Month summaries", body = Vec<MonthSummary>)
    )
)]
pub async fn list_months(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
) -> AppResult<Json<Vec<MonthSummary>>> {
    let months = state.services.reports.months().await?;
    Ok(Json(months))
}

/// Per-equipment report for one month
#[utoipa::path(
    get,
    path = "/reports/{year}/{month}",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(
        ("year" = i32, Path, description = "Year"),
        ("month" = u32, Path, description = "Month (1-12)")
    ),
    responses(
        (status = 200, description = "Monthly report", body = MonthlyReport),
        (status = 400, description = "Invalid month", body = crate::error::ErrorResponse)
    )
)]
pub async fn monthly_report(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<Json<MonthlyReport>> {
    let report = state.services.reports.month(year, month).await?;
    Ok(Json(report))
}
