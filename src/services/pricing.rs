//! Rental submission gate, line pricing and invoice derivation
//!
//! Pure functions: no I/O, callers load inputs and persist outputs.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::availability::Availability;
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::Equipment,
        invoice::{Invoice, InvoiceLine},
        rental::{LineItemDraft, Rental, RentalLine, RentalPeriod},
    },
};

/// Priced line items and their sums
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLines {
    pub lines: Vec<RentalLine>,
    pub total_regular_pay: i64,
    pub total_overtime_pay: i64,
    pub total_amount: i64,
}

// ---------------------------------------------------------------------------
// Submission gate
// ---------------------------------------------------------------------------

/// Reject duplicated or missing equipment selections.
pub fn validate_selection(lines: &[LineItemDraft]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for id in lines.iter().filter_map(|l| l.equipment_id) {
        if !seen.insert(id) {
            return Err(AppError::DuplicateEquipment);
        }
    }
    if lines.iter().any(|l| l.equipment_id.is_none()) {
        return Err(AppError::EmptySelection);
    }
    Ok(())
}

pub fn validate_period(period: RentalPeriod) -> AppResult<()> {
    if period.duration_days() <= 0 {
        return Err(AppError::InvalidPeriod(format!(
            "End date {} is before start date {}",
            period.end_date, period.start_date
        )));
    }
    Ok(())
}

/// Selected equipment ids the availability result reports as unavailable.
///
/// Equipment absent from the result is not treated as unavailable.
pub fn unavailable_ids(lines: &[LineItemDraft], availability: &Availability) -> Vec<Uuid> {
    lines
        .iter()
        .filter_map(|l| l.equipment_id)
        .filter(|id| availability.is_available(id) == Some(false))
        .collect()
}

/// Gate a rental submission. Checks run in order: duplicates, empty
/// selection, availability, then period.
pub fn validate_submission(
    lines: &[LineItemDraft],
    period: RentalPeriod,
    availability: &Availability,
) -> AppResult<()> {
    validate_selection(lines)?;

    let names: Vec<String> = unavailable_ids(lines, availability)
        .iter()
        .filter_map(|id| availability.get(id))
        .map(|u| u.equipment_name.clone())
        .collect();
    if !names.is_empty() {
        return Err(AppError::Unavailable(names));
    }

    validate_period(period)
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

fn amount_overflow() -> AppError {
    AppError::Validation("Amount exceeds the supported range".to_string())
}

/// `rate x hours x days`, rounded to the nearest currency unit.
pub(crate) fn line_pay(rate_per_hour: i64, hours: f64, duration_days: i64) -> AppResult<i64> {
    let pay = (rate_per_hour as f64 * hours * duration_days as f64).round();
    // `as i64` saturates, so anything at or past the bound is rejected here
    if !pay.is_finite() || pay.abs() >= i64::MAX as f64 {
        return Err(amount_overflow());
    }
    Ok(pay as i64)
}

pub(crate) fn checked_total(amounts: impl IntoIterator<Item = i64>) -> AppResult<i64> {
    amounts
        .into_iter()
        .try_fold(0i64, |acc, amount| acc.checked_add(amount).ok_or_else(amount_overflow))
}

/// Freeze equipment rates onto the requested lines.
///
/// Equipment already on `previous` keeps the snapshot it was rented with;
/// anything else is snapshotted from the current registry.
pub fn snapshot_lines(
    drafts: &[LineItemDraft],
    equipment: &[Equipment],
    previous: Option<&Rental>,
) -> AppResult<Vec<RentalLine>> {
    drafts
        .iter()
        .map(|draft| {
            let id = draft.equipment_id.ok_or(AppError::EmptySelection)?;

            if let Some(kept) = previous.and_then(|r| r.line_for(id)) {
                return Ok(RentalLine {
                    regular_hours: draft.regular_hours,
                    overtime_hours: draft.overtime_hours,
                    ..kept.clone()
                });
            }

            let unit = equipment
                .iter()
                .find(|e| e.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))?;

            Ok(RentalLine {
                equipment_id: unit.id,
                equipment_name: unit.display_name(),
                brand: unit.brand.clone(),
                equipment_type: unit.equipment_type.clone(),
                operator_name: unit.operator_name.clone(),
                regular_rate_per_hour: unit.regular_rate_per_hour,
                overtime_rate_per_hour: unit.overtime_rate_per_hour,
                regular_hours: draft.regular_hours,
                overtime_hours: draft.overtime_hours,
                total_regular_pay: 0,
                total_overtime_pay: 0,
                total_pay: 0,
            })
        })
        .collect()
}

/// Price every line from its own rate snapshot and sum the rental.
///
/// Amounts that do not fit in an `i64` are rejected as a validation error.
pub fn compute_totals(lines: Vec<RentalLine>, duration_days: i64) -> AppResult<PricedLines> {
    let lines = lines
        .into_iter()
        .map(|line| {
            let total_regular_pay =
                line_pay(line.regular_rate_per_hour, line.regular_hours, duration_days)?;
            let total_overtime_pay =
                line_pay(line.overtime_rate_per_hour, line.overtime_hours, duration_days)?;
            Ok(RentalLine {
                total_regular_pay,
                total_overtime_pay,
                total_pay: checked_total([total_regular_pay, total_overtime_pay])?,
                ..line
            })
        })
        .collect::<AppResult<Vec<RentalLine>>>()?;

    let total_regular_pay = checked_total(lines.iter().map(|l| l.total_regular_pay))?;
    let total_overtime_pay = checked_total(lines.iter().map(|l| l.total_overtime_pay))?;
    let total_amount = checked_total(lines.iter().map(|l| l.total_pay))?;

    Ok(PricedLines {
        lines,
        total_regular_pay,
        total_overtime_pay,
        total_amount,
    })
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// Time-based invoice number with a short random suffix: INV-YYYYMMDD-HHMMSS-XXXX
pub fn invoice_number(issued_at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..4].to_uppercase();
    format!("INV-{}-{}", issued_at.format("%Y%m%d-%H%M%S"), suffix)
}

fn invoice_lines(rental: &Rental) -> Vec<InvoiceLine> {
    rental
        .lines
        .iter()
        .map(|l| InvoiceLine {
            equipment_name: l.equipment_name.clone(),
            brand: l.brand.clone(),
            equipment_type: l.equipment_type.clone(),
            operator_name: l.operator_name.clone(),
            regular_rate_per_hour: l.regular_rate_per_hour,
            overtime_rate_per_hour: l.overtime_rate_per_hour,
            regular_hours: l.regular_hours,
            overtime_hours: l.overtime_hours,
            duration_days: rental.duration_days,
            total_regular_pay: l.total_regular_pay,
            total_overtime_pay: l.total_overtime_pay,
            total: l.total_pay,
        })
        .collect()
}

/// Derive the unpaid invoice of a freshly priced rental.
pub fn build_invoice(rental: &Rental, issued_at: DateTime<Utc>) -> Invoice {
    let lines = invoice_lines(rental);
    Invoice {
        id: Uuid::new_v4(),
        rental_id: rental.id,
        invoice_number: invoice_number(issued_at),
        renter_name: rental.renter_name.clone(),
        renter_phone: rental.renter_phone.clone(),
        renter_email: rental.renter_email.clone(),
        date_issued: issued_at,
        total_regular_pay: lines.iter().map(|l| l.total_regular_pay).sum(),
        total_overtime_pay: lines.iter().map(|l| l.total_overtime_pay).sum(),
        total_amount: rental.total_amount,
        lines: Json(lines),
        is_paid: false,
        crea_date: Some(issued_at),
        modif_date: Some(issued_at),
    }
}

/// Bring an existing invoice in line with its edited rental.
///
/// Number, issue date and paid flag are kept.
pub fn refresh_invoice(invoice: Invoice, rental: &Rental, now: DateTime<Utc>) -> Invoice {
    let lines = invoice_lines(rental);
    Invoice {
        renter_name: rental.renter_name.clone(),
        renter_phone: rental.renter_phone.clone(),
        renter_email: rental.renter_email.clone(),
        total_regular_pay: lines.iter().map(|l| l.total_regular_pay).sum(),
        total_overtime_pay: lines.iter().map(|l| l.total_overtime_pay).sum(),
        total_amount: rental.total_amount,
        lines: Json(lines),
        modif_date: Some(now),
        ..invoice
    }
}
