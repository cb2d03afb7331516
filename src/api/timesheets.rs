//! Timesheet endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::timesheet::{Timesheet, TimesheetEntry, TimesheetPay, TimesheetPayRequest},
};

use super::AuthenticatedStaff;

/// List timesheets, most recent first
#[utoipa::path(
    get,
    path = "/timesheets",
    tag = "timesheets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Timesheet list", body = Vec<Timesheet>)
    )
)]
pub async fn list_timesheets(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
) -> AppResult<Json<Vec<Timesheet>>> {
    let sheets = state.services.timesheets.list().await?;
    Ok(Json(sheets))
}

/// Compute shift pay without recording it
#[utoipa::path(
    post,
    path = "/timesheets/pay-preview",
    tag = "timesheets",
    security(("bearer_auth" = [])),
    request_body = TimesheetPayRequest,
    responses(
        (status = 200, description = "Hours split and pay", body = TimesheetPay),
        (status = 400, description = "Invalid times", body = crate::error::ErrorResponse)
    )
)]
pub async fn preview_pay(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Json(request): Json<TimesheetPayRequest>,
) -> AppResult<Json<TimesheetPay>> {
    let pay = state.services.timesheets.preview_pay(&request).await?;
    Ok(Json(pay))
}

/// Record a timesheet
#[utoipa::path(
    post,
    path = "/timesheets",
    tag = "timesheets",
    security(("bearer_auth" = [])),
    request_body = TimesheetEntry,
    responses(
        (status = 201, description = "Timesheet recorded", body = Timesheet),
        (status = 400, description = "Invalid entry", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_timesheet(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Json(entry): Json<TimesheetEntry>,
) -> AppResult<(StatusCode, Json<Timesheet>)> {
    let sheet = state.services.timesheets.create(&entry).await?;
    Ok((StatusCode::CREATED, Json(sheet)))
}

#[utoipa::path(
    put,
    path = "/timesheets/{id}",
    tag = "timesheets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Timesheet ID")),
    request_body = TimesheetEntry,
    responses(
        (status = 200, description = "Timesheet updated", body = Timesheet)
    )
)]
pub async fn update_timesheet(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
    Json(entry): Json<TimesheetEntry>,
) -> AppResult<Json<Timesheet>> {
    let sheet = state.services.timesheets.update(id, &entry).await?;
    Ok(Json(sheet))
}

#[utoipa::path(
    delete,
    path = "/timesheets/{id}",
    tag = "timesheets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Timesheet ID")),
    responses(
        (status = 204, description = "Timesheet deleted")
    )
)]
pub async fn delete_timesheet(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.timesheets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
