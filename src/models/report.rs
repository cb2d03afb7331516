//! Monthly timesheet report types

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::timesheet::Timesheet;

/// One month of timesheet activity
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthSummary {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub total_entries: i64,
    /// Number of distinct equipment units with entries
    pub equipment_count: i64,
    pub equipment_names: Vec<String>,
    /// Work plus overtime hours, rounded to whole hours
    pub total_hours: f64,
    pub total_pay: i64,
}

/// Per-equipment section of a monthly report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EquipmentMonth {
    pub equipment_id: Uuid,
    pub equipment_name: String,
    /// Records sorted by work date
    pub records: Vec<Timesheet>,
    pub working_days: i64,
    pub total_hours: f64,
    pub total_pay: i64,
    pub average_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MonthlyReportSummary {
    pub total_equipment: i64,
    pub total_working_days: i64,
    /// Rounded to 2 decimals
    pub total_hours: f64,
    pub total_pay: i64,
    /// Rounded to 2 decimals
    pub average_hours_per_day: f64,
}

/// Monthly report for one (year, month)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    /// Sorted by equipment name
    pub equipment: Vec<EquipmentMonth>,
    pub summary: MonthlyReportSummary,
}
