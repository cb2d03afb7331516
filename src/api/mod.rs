//! API handlers for the rental REST endpoints

pub mod equipment;
pub mod health;
pub mod invoices;
pub mod openapi;
pub mod rentals;
pub mod reports;
pub mod timesheets;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};

use crate::{error::AppError, models::staff::StaffClaims, AppState};

/// Extractor for an authenticated staff member from the bearer token
pub struct AuthenticatedStaff(pub StaffClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedStaff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = StaffClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedStaff(claims))
    }
}

/// Routes mounted under /api/v1
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Equipment registry
        .route(
            "/equipment",
            get(equipment::list_equipment).post(equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(equipment::get_equipment)
                .put(equipment::update_equipment)
                .delete(equipment::delete_equipment),
        )
        // Rentals
        .route(
            "/rentals",
            get(rentals::list_rentals).post(rentals::create_rental),
        )
        .route("/rentals/availability", get(rentals::check_availability))
        .route(
            "/rentals/:id",
            get(rentals::get_rental)
                .put(rentals::update_rental)
                .delete(rentals::delete_rental),
        )
        .route("/rentals/:id/status", put(rentals::update_rental_status))
        .route("/rentals/:id/invoice", get(rentals::get_rental_invoice))
        // Invoices
        .route("/invoices", get(invoices::list_invoices))
        .route("/invoices/:id", get(invoices::get_invoice))
        .route("/invoices/:id/paid", put(invoices::set_invoice_paid))
        // Timesheets
        .route(
            "/timesheets",
            get(timesheets::list_timesheets).post(timesheets::create_timesheet),
        )
        .route("/timesheets/pay-preview", post(timesheets::preview_pay))
        .route(
            "/timesheets/:id",
            put(timesheets::update_timesheet).delete(timesheets::delete_timesheet),
        )
        // Reports
        .route("/reports/months", get(reports::list_months))
        .route("/reports/:year/:month", get(reports::monthly_report))
        .with_state(state)
}
