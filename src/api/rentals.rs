//! Rental endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        invoice::Invoice,
        rental::{
            AvailabilityQuery, CreateRental, Rental, RentalPeriod, RentalQuery, UpdateRental,
            UpdateRentalStatus,
        },
    },
    services::{
        availability::UnitAvailability,
        rentals::{CreatedRental, RentalUpdate},
    },
};

use super::AuthenticatedStaff;

/// Availability of every registered unit for a period
#[derive(Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub period: RentalPeriod,
    /// Equipment id to availability flag
    #[schema(value_type = Object)]
    pub available: HashMap<Uuid, bool>,
    /// Per-unit detail, sorted by name
    pub units: Vec<UnitAvailability>,
}

/// List rentals
#[utoipa::path(
    get,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(RentalQuery),
    responses(
        (status = 200, description = "Rental list", body = Vec<Rental>)
    )
)]
pub async fn list_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Query(query): Query<RentalQuery>,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = state.services.rentals.list(query.status).await?;
    Ok(Json(rentals))
}

/// Check equipment availability for a period
#[utoipa::path(
    get,
    path = "/rentals/availability",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability per unit (empty when start is after end)", body = AvailabilityResponse),
        (status = 503, description = "Availability could not be determined", body = crate::error::ErrorResponse)
    )
)]
pub async fn check_availability(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let period = RentalPeriod::new(query.start_date, query.end_date);
    let availability = state
        .services
        .rentals
        .check_availability(period, query.exclude_rental_id)
        .await?;

    Ok(Json(AvailabilityResponse {
        period,
        available: availability.flags(),
        units: availability.into_sorted(),
    }))
}

/// Create a rental and its invoice
#[utoipa::path(
    post,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    request_body = CreateRental,
    responses(
        (status = 201, description = "Rental and invoice created", body = CreatedRental),
        (status = 400, description = "Invalid draft", body = crate::error::ErrorResponse),
        (status = 409, description = "Equipment unavailable", body = crate::error::ErrorResponse),
        (status = 503, description = "Availability could not be determined", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_rental(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Json(draft): Json<CreateRental>,
) -> AppResult<(StatusCode, Json<CreatedRental>)> {
    tracing::debug!(staff = %claims.sub, "Creating rental");
    let created = state.services.rentals.create_rental(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get rental by ID
#[utoipa::path(
    get,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental details", body = Rental),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_rental(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.get(id).await?;
    Ok(Json(rental))
}

/// Edit a rental
///
/// Conflicts with other active rentals are returned as 409 unless `force` is set.
#[utoipa::path(
    put,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rental ID")),
    request_body = UpdateRental,
    responses(
        (status = 200, description = "Rental updated", body = RentalUpdate),
        (status = 409, description = "Scheduling conflict", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_rental(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(claims): AuthenticatedStaff,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateRental>,
) -> AppResult<Json<RentalUpdate>> {
    if changes.force.unwrap_or(false) {
        tracing::info!(staff = %claims.sub, rental_id = %id, "Rental edit submitted with force");
    }
    let updated = state.services.rentals.update_rental(id, changes).await?;
    Ok(Json(updated))
}

/// Delete a rental and its invoice
#[utoipa::path(
    delete,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rental ID")),
    responses(
        (status = 204, description = "Rental deleted")
    )
)]
pub async fn delete_rental(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.rentals.delete_rental(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change rental status
#[utoipa::path(
    put,
    path = "/rentals/{id}/status",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rental ID")),
    request_body = UpdateRentalStatus,
    responses(
        (status = 200, description = "Status updated", body = Rental)
    )
)]
pub async fn update_rental_status(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateRentalStatus>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.set_status(id, data.status).await?;
    Ok(Json(rental))
}

/// Get the invoice of a rental
#[utoipa::path(
    get,
    path = "/rentals/{id}/invoice",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 404, description = "No invoice for this rental", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_rental_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    let invoice = state.services.rentals.invoice_for(id).await?;
    Ok(Json(invoice))
}
