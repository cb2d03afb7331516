//! Invoice model (one per rental)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

/// Invoice line mirroring a rental line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceLine {
    pub equipment_name: String,
    pub brand: String,
    pub equipment_type: String,
    pub operator_name: String,
    pub regular_rate_per_hour: i64,
    pub overtime_rate_per_hour: i64,
    pub regular_hours: f64,
    pub overtime_hours: f64,
    pub duration_days: i32,
    pub total_regular_pay: i64,
    pub total_overtime_pay: i64,
    pub total: i64,
}

/// Invoice derived from a rental at creation time and kept in sync with it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Invoice {
    pub id: Uuid,
    pub rental_id: Uuid,
    /// INV-YYYYMMDD-HHMMSS-XXXX
    pub invoice_number: String,
    pub renter_name: String,
    pub renter_phone: String,
    pub renter_email: Option<String>,
    pub date_issued: DateTime<Utc>,
    #[schema(value_type = Vec<InvoiceLine>)]
    pub lines: Json<Vec<InvoiceLine>>,
    pub total_regular_pay: i64,
    pub total_overtime_pay: i64,
    pub total_amount: i64,
    pub is_paid: bool,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Set paid flag request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInvoicePaid {
    pub is_paid: bool,
}
