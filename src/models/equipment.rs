//! Equipment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::EquipmentStatus;

/// One rentable equipment record; `stock` interchangeable physical units
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    /// Model name
    pub name: String,
    pub brand: String,
    /// Free-text type (e.g. "mini", "long arm")
    pub equipment_type: String,
    pub operator_name: String,
    /// Hourly rate, whole currency units
    pub regular_rate_per_hour: i64,
    /// Overtime hourly rate, whole currency units
    pub overtime_rate_per_hour: i64,
    pub status: EquipmentStatus,
    pub stock: i32,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Equipment {
    /// Name shown on rentals, invoices and timesheets ("<brand> <name>")
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.name).trim().to_string()
    }
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    pub equipment_type: Option<String>,
    pub operator_name: Option<String>,
    #[validate(range(min = 0, max = 1000000000, message = "Regular rate must be between 0 and 1,000,000,000"))]
    pub regular_rate_per_hour: i64,
    #[validate(range(min = 0, max = 1000000000, message = "Overtime rate must be between 0 and 1,000,000,000"))]
    pub overtime_rate_per_hour: i64,
    pub status: Option<EquipmentStatus>,
    #[validate(range(min = 1, message = "Stock must be at least 1"))]
    pub stock: Option<i32>,
}

/// Update equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Brand cannot be empty"))]
    pub brand: Option<String>,
    pub equipment_type: Option<String>,
    pub operator_name: Option<String>,
    #[validate(range(min = 0, max = 1000000000, message = "Regular rate must be between 0 and 1,000,000,000"))]
    pub regular_rate_per_hour: Option<i64>,
    #[validate(range(min = 0, max = 1000000000, message = "Overtime rate must be between 0 and 1,000,000,000"))]
    pub overtime_rate_per_hour: Option<i64>,
    pub status: Option<EquipmentStatus>,
    #[validate(range(min = 1, message = "Stock must be at least 1"))]
    pub stock: Option<i32>,
}

/// Query parameters for listing equipment
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EquipmentQuery {
    /// Only return equipment with this status
    pub status: Option<EquipmentStatus>,
}
