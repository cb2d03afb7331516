//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment, health, invoices, rentals, reports, timesheets};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Excavator Rental API",
        version = "1.0.0",
        description = "Equipment registry, rentals with availability checks, invoices, timesheets and monthly reports"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Rentals
        rentals::list_rentals,
        rentals::check_availability,
        rentals::create_rental,
        rentals::get_rental,
        rentals::update_rental,
        rentals::delete_rental,
        rentals::update_rental_status,
        rentals::get_rental_invoice,
        // Invoices
        invoices::list_invoices,
        invoices::get_invoice,
        invoices::set_invoice_paid,
        // Timesheets
        timesheets::list_timesheets,
        timesheets::preview_pay,
        timesheets::create_timesheet,
        timesheets::update_timesheet,
        timesheets::delete_timesheet,
        // Reports
        reports::list_months,
        reports::monthly_report,
    ),
    components(
        schemas(
            // Equipment
            crate::models::enums::EquipmentStatus,
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentQuery,
            // Rentals
            crate::models::enums::RentalStatus,
            crate::models::rental::Rental,
            crate::models::rental::RentalLine,
            crate::models::rental::RentalPeriod,
            crate::models::rental::RentalConflict,
            crate::models::rental::LineItemDraft,
            crate::models::rental::CreateRental,
            crate::models::rental::UpdateRental,
            crate::models::rental::UpdateRentalStatus,
            crate::services::availability::UnitAvailability,
            crate::services::rentals::CreatedRental,
            crate::services::rentals::RentalUpdate,
            rentals::AvailabilityResponse,
            // Invoices
            crate::models::invoice::Invoice,
            crate::models::invoice::InvoiceLine,
            crate::models::invoice::UpdateInvoicePaid,
            // Timesheets
            crate::models::timesheet::Timesheet,
            crate::models::timesheet::TimesheetEntry,
            crate::models::timesheet::TimesheetPay,
            crate::models::timesheet::TimesheetPayRequest,
            // Reports
            crate::models::report::MonthSummary,
            crate::models::report::MonthlyReport,
            crate::models::report::MonthlyReportSummary,
            crate::models::report::EquipmentMonth,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "equipment", description = "Equipment registry"),
        (name = "rentals", description = "Rentals and availability"),
        (name = "invoices", description = "Invoices"),
        (name = "timesheets", description = "Daily timesheets and shift pay"),
        (name = "reports", description = "Monthly timesheet reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
