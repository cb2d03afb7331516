//! Rental model, line items and rental drafts

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::RentalStatus;
use crate::error::{AppError, AppResult};

pub const MIN_PHONE_DIGITS: usize = 9;
pub const MAX_PHONE_DIGITS: usize = 13;

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").expect("valid regex"));

// ---------------------------------------------------------------------------
// RentalPeriod
// ---------------------------------------------------------------------------

/// Inclusive calendar-day rental period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RentalPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RentalPeriod {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self { start_date, end_date }
    }

    /// Number of rented days, both ends included. Zero or negative when end precedes start.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn is_valid(&self) -> bool {
        self.start_date <= self.end_date
    }

    /// Inclusive overlap: periods sharing a single day overlap.
    pub fn overlaps(&self, other: &RentalPeriod) -> bool {
        self.start_date <= other.end_date && self.end_date >= other.start_date
    }
}

// ---------------------------------------------------------------------------
// Rental
// ---------------------------------------------------------------------------

/// One equipment assignment within a rental with its frozen rate snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RentalLine {
    pub equipment_id: Uuid,
    /// "<brand> <name>" at the time of the snapshot
    pub equipment_name: String,
    pub brand: String,
    pub equipment_type: String,
    pub operator_name: String,
    pub regular_rate_per_hour: i64,
    pub overtime_rate_per_hour: i64,
    /// Regular hours per day
    pub regular_hours: f64,
    /// Overtime hours per day
    pub overtime_hours: f64,
    #[serde(default)]
    pub total_regular_pay: i64,
    #[serde(default)]
    pub total_overtime_pay: i64,
    #[serde(default)]
    pub total_pay: i64,
}

/// Rental record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: Uuid,
    pub renter_name: String,
    /// Normalized phone number (leading "0")
    pub renter_phone: String,
    pub renter_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i32,
    #[schema(value_type = Vec<RentalLine>)]
    pub lines: Json<Vec<RentalLine>>,
    pub total_amount: i64,
    pub status: RentalStatus,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

impl Rental {
    pub fn period(&self) -> RentalPeriod {
        RentalPeriod::new(self.start_date, self.end_date)
    }

    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }

    pub fn line_for(&self, equipment_id: Uuid) -> Option<&RentalLine> {
        self.lines.iter().find(|l| l.equipment_id == equipment_id)
    }
}

/// Another active rental that holds a unit the edited rental needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RentalConflict {
    pub rental_id: Uuid,
    pub renter_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Display names of the contended equipment
    pub equipment_names: Vec<String>,
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

fn default_regular_hours() -> f64 {
    8.0
}

/// Treats a missing, null or blank equipment id as "nothing selected".
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A requested equipment assignment before snapshot and pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct LineItemDraft {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    #[schema(value_type = Option<String>)]
    pub equipment_id: Option<Uuid>,
    #[serde(default = "default_regular_hours")]
    #[validate(range(min = 0.0, max = 24.0, message = "Regular hours must be between 0 and 24"))]
    pub regular_hours: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 16.0, message = "Overtime hours must be between 0 and 16"))]
    pub overtime_hours: f64,
}

impl LineItemDraft {
    pub fn new(equipment_id: Option<Uuid>, regular_hours: f64, overtime_hours: f64) -> Self {
        Self {
            equipment_id,
            regular_hours,
            overtime_hours,
        }
    }
}

/// Create rental request (the rental draft)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRental {
    #[validate(length(min = 3, max = 100, message = "Renter name must be 3 to 100 characters"))]
    pub renter_name: String,
    pub renter_phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub renter_email: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, max = 10, message = "A rental needs 1 to 10 equipment lines"), nested)]
    pub lines: Vec<LineItemDraft>,
}

impl CreateRental {
    pub fn period(&self) -> RentalPeriod {
        RentalPeriod::new(self.start_date, self.end_date)
    }

    /// Trim text fields, normalize the phone number and drop an empty email, then validate.
    pub fn normalized(mut self) -> AppResult<Self> {
        self.renter_name = self.renter_name.trim().to_string();
        self.renter_phone = normalize_phone(&self.renter_phone)?;
        self.renter_email = normalize_email(self.renter_email);
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(self)
    }
}

/// Update rental request; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateRental {
    #[validate(length(min = 3, max = 100, message = "Renter name must be 3 to 100 characters"))]
    pub renter_name: Option<String>,
    pub renter_phone: Option<String>,
    /// Empty string clears the email
    #[validate(email(message = "Invalid email format"))]
    pub renter_email: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 10, message = "A rental needs 1 to 10 equipment lines"), nested)]
    pub lines: Option<Vec<LineItemDraft>>,
    /// Proceed even when other active rentals hold the requested units
    pub force: Option<bool>,
}

/// The fully-resolved state of a rental being edited, before snapshot and pricing
#[derive(Debug, Clone)]
pub struct RentalRevision {
    pub renter_name: String,
    pub renter_phone: String,
    pub renter_email: Option<String>,
    pub period: RentalPeriod,
    pub lines: Vec<LineItemDraft>,
}

impl UpdateRental {
    /// Merge the requested changes over the current rental and validate the result.
    pub fn apply_to(mut self, current: &Rental) -> AppResult<RentalRevision> {
        if let Some(name) = self.renter_name.as_mut() {
            *name = name.trim().to_string();
        }
        if let Some(email) = self.renter_email.as_mut() {
            *email = email.trim().to_string();
        }
        let clearing_email = matches!(self.renter_email.as_deref(), Some(""));
        if clearing_email {
            self.renter_email = None;
        }
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let renter_phone = match self.renter_phone.as_deref() {
            Some(phone) => normalize_phone(phone)?,
            None => current.renter_phone.clone(),
        };
        let renter_email = if clearing_email {
            None
        } else {
            self.renter_email.or_else(|| current.renter_email.clone())
        };
        let lines = self.lines.unwrap_or_else(|| {
            current
                .lines
                .iter()
                .map(|l| LineItemDraft::new(Some(l.equipment_id), l.regular_hours, l.overtime_hours))
                .collect()
        });

        Ok(RentalRevision {
            renter_name: self.renter_name.unwrap_or_else(|| current.renter_name.clone()),
            renter_phone,
            renter_email,
            period: RentalPeriod::new(
                self.start_date.unwrap_or(current.start_date),
                self.end_date.unwrap_or(current.end_date),
            ),
            lines,
        })
    }
}

/// Update rental status request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRentalStatus {
    pub status: RentalStatus,
}

/// Query parameters for listing rentals
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RentalQuery {
    pub status: Option<RentalStatus>,
}

/// Query parameters for the availability check
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AvailabilityQuery {
    /// Start date (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// End date (YYYY-MM-DD)
    pub end_date: NaiveDate,
    /// Rental being edited; it never conflicts with itself
    pub exclude_rental_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Renter contact normalization
// ---------------------------------------------------------------------------

/// Strip non-digits and turn a leading "62" country code into "0".
pub fn normalize_phone(raw: &str) -> AppResult<String> {
    let digits = NON_DIGITS.replace_all(raw, "");
    let normalized = match digits.strip_prefix("62") {
        Some(rest) => format!("0{}", rest),
        None => digits.to_string(),
    };

    let len = normalized.len();
    if !normalized.starts_with('0') || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&len) {
        return Err(AppError::Validation(format!(
            "Invalid phone number: {}",
            raw.trim()
        )));
    }
    Ok(normalized)
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}
