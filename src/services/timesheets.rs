//! Timesheet service and shift pay calculator

use chrono::{NaiveTime, Utc};
use uuid::Uuid;

use super::pricing::{checked_total, line_pay};
use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::Equipment,
        timesheet::{Timesheet, TimesheetEntry, TimesheetPay, TimesheetPayRequest},
    },
    repository::Repository,
};

/// Hours paid at the regular rate before overtime starts
pub const REGULAR_HOURS_CAP: f64 = 8.0;

/// Split a same-day shift into regular and overtime hours and price it
/// with the equipment's current rates.
pub fn compute_timesheet_pay(
    equipment: &Equipment,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> AppResult<TimesheetPay> {
    if end_time <= start_time {
        return Err(AppError::InvalidPeriod(format!(
            "Shift end {} must be after start {} on the same day",
            end_time.format("%H:%M"),
            start_time.format("%H:%M")
        )));
    }

    let elapsed = (end_time - start_time).num_minutes() as f64 / 60.0;
    let work_hours = elapsed.min(REGULAR_HOURS_CAP);
    let overtime_hours = (elapsed - REGULAR_HOURS_CAP).max(0.0);

    let total_regular_pay = line_pay(equipment.regular_rate_per_hour, work_hours, 1)?;
    let total_overtime_pay = line_pay(equipment.overtime_rate_per_hour, overtime_hours, 1)?;

    Ok(TimesheetPay {
        work_hours,
        overtime_hours,
        total_works: elapsed,
        total_regular_pay,
        total_overtime_pay,
        total_pay: checked_total([total_regular_pay, total_overtime_pay])?,
    })
}

#[derive(Clone)]
pub struct TimesheetsService {
    repository: Repository,
}

impl TimesheetsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Timesheet>> {
        self.repository.timesheets.list().await
    }

    /// Pay for a shift without recording it
    pub async fn preview_pay(&self, request: &TimesheetPayRequest) -> AppResult<TimesheetPay> {
        let parse = |raw: &str, field: &str| {
            NaiveTime::parse_from_str(raw, "%H:%M")
                .map_err(|_| AppError::Validation(format!("Invalid {} (use HH:MM)", field)))
        };
        let start_time = parse(&request.start_time, "start_time")?;
        let end_time = parse(&request.end_time, "end_time")?;
        let equipment = self.repository.equipment.get_by_id(request.equipment_id).await?;
        compute_timesheet_pay(&equipment, start_time, end_time)
    }

    /// Build a full record from an entry, pricing it against current rates
    async fn price_entry(&self, id: Uuid, entry: &TimesheetEntry) -> AppResult<Timesheet> {
        let times = entry.parse_times()?;
        let equipment = self.repository.equipment.get_by_id(entry.equipment_id).await?;
        let pay = compute_timesheet_pay(&equipment, times.start_time, times.end_time)?;
        let now = Utc::now();

        Ok(Timesheet {
            id,
            equipment_id: equipment.id,
            equipment_name: equipment.display_name(),
            work_date: times.work_date,
            start_time: times.start_time,
            end_time: times.end_time,
            work_hours: pay.work_hours,
            overtime_hours: pay.overtime_hours,
            total_works: pay.total_works,
            total_regular_pay: pay.total_regular_pay,
            total_overtime_pay: pay.total_overtime_pay,
            total_pay: pay.total_pay,
            crea_date: Some(now),
            modif_date: Some(now),
        })
    }

    pub async fn create(&self, entry: &TimesheetEntry) -> AppResult<Timesheet> {
        let sheet = self.price_entry(Uuid::new_v4(), entry).await?;
        let sheet = self.repository.timesheets.create(&sheet).await?;
        tracing::info!(
            timesheet_id = %sheet.id,
            equipment = %sheet.equipment_name,
            total_pay = sheet.total_pay,
            "Timesheet recorded"
        );
        Ok(sheet)
    }

    /// Replace a timesheet; pay is recomputed from the equipment's current rates
    pub async fn update(&self, id: Uuid, entry: &TimesheetEntry) -> AppResult<Timesheet> {
        self.repository.timesheets.get_by_id(id).await?;
        let sheet = self.price_entry(id, entry).await?;
        self.repository.timesheets.update(&sheet).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.timesheets.delete(id).await
    }
}
