//! Invoice endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::invoice::{Invoice, UpdateInvoicePaid},
};

use super::AuthenticatedStaff;

/// List invoices, newest first
#[utoipa::path(
    get,
    path = "/invoices",
    tag = "invoices",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Invoice list", body = Vec<Invoice>)
    )
)]
pub async fn list_invoices(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
) -> AppResult<Json<Vec<Invoice>>> {
    let invoices = state.services.invoices.list().await?;
    Ok(Json(invoices))
}

#[utoipa::path(
    get,
    path = "/invoices/{id}",
    tag = "invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice", body = Invoice),
        (status = 404, description = "Invoice not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_invoice(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    let invoice = state.services.invoices.get_by_id(id).await?;
    Ok(Json(invoice))
}

/// Set the paid flag
#[utoipa::path(
    put,
    path = "/invoices/{id}/paid",
    tag = "invoices",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoicePaid,
    responses(
        (status = 200, description = "Invoice updated", body = Invoice)
    )
)]
pub async fn set_invoice_paid(
    State(state): State<crate::AppState>,
    AuthenticatedStaff(_staff): AuthenticatedStaff,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateInvoicePaid>,
) -> AppResult<Json<Invoice>> {
    let invoice = state.services.invoices.set_paid(id, data.is_paid).await?;
    Ok(Json(invoice))
}
