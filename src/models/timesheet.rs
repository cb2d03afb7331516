//! Timesheet models (one row per equipment per work day)

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Timesheet record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Timesheet {
    pub id: Uuid,
    pub equipment_id: Uuid,
    /// "<brand> <name>" at the time of entry
    pub equipment_name: String,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Regular hours, capped at 8
    pub work_hours: f64,
    /// Hours beyond the first 8
    pub overtime_hours: f64,
    /// Raw elapsed hours
    pub total_works: f64,
    pub total_regular_pay: i64,
    pub total_overtime_pay: i64,
    pub total_pay: i64,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Hours split and pay for one shift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TimesheetPay {
    pub work_hours: f64,
    pub overtime_hours: f64,
    pub total_works: f64,
    pub total_regular_pay: i64,
    pub total_overtime_pay: i64,
    pub total_pay: i64,
}

/// Create/replace timesheet request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TimesheetEntry {
    pub equipment_id: Uuid,
    /// Work date (YYYY-MM-DD)
    pub date: String,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
}

/// Parsed form of a [`TimesheetEntry`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftTimes {
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimesheetEntry {
    pub fn parse_times(&self) -> AppResult<ShiftTimes> {
        let work_date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation("Invalid date (use YYYY-MM-DD)".to_string()))?;
        let start_time = NaiveTime::parse_from_str(&self.start_time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid start_time (use HH:MM)".to_string()))?;
        let end_time = NaiveTime::parse_from_str(&self.end_time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid end_time (use HH:MM)".to_string()))?;
        Ok(ShiftTimes {
            work_date,
            start_time,
            end_time,
        })
    }
}

/// Pay preview request
#[derive(Debug, Deserialize, ToSchema)]
pub struct TimesheetPayRequest {
    pub equipment_id: Uuid,
    /// Start time (HH:MM)
    pub start_time: String,
    /// End time (HH:MM)
    pub end_time: String,
}
