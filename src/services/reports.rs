//! Monthly timesheet reports

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        report::{EquipmentMonth, MonthSummary, MonthlyReport, MonthlyReportSummary},
        timesheet::Timesheet,
    },
    repository::Repository,
};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sheet_hours(sheet: &Timesheet) -> f64 {
    sheet.work_hours + sheet.overtime_hours
}

/// One summary per month with entries, newest month first
pub fn summarize_months(sheets: &[Timesheet]) -> Vec<MonthSummary> {
    #[derive(Default)]
    struct Acc {
        entries: i64,
        equipment: BTreeSet<Uuid>,
        names: BTreeSet<String>,
        hours: f64,
        pay: i64,
    }

    let mut months: BTreeMap<(i32, u32), Acc> = BTreeMap::new();
    for sheet in sheets {
        let acc = months
            .entry((sheet.work_date.year(), sheet.work_date.month()))
            .or_default();
        acc.entries += 1;
        acc.equipment.insert(sheet.equipment_id);
        acc.names.insert(sheet.equipment_name.clone());
        acc.hours += sheet_hours(sheet);
        acc.pay += sheet.total_pay;
    }

    months
        .into_iter()
        .rev()
        .map(|((year, month), acc)| MonthSummary {
            year,
            month,
            total_entries: acc.entries,
            equipment_count: acc.equipment.len() as i64,
            equipment_names: acc.names.into_iter().collect(),
            total_hours: acc.hours.round(),
            total_pay: acc.pay,
        })
        .collect()
}

/// Per-equipment breakdown of one month's timesheets
pub fn monthly_report(year: i32, month: u32, sheets: Vec<Timesheet>) -> MonthlyReport {
    let total_records = sheets.len() as i64;
    let total_hours: f64 = sheets.iter().map(sheet_hours).sum();
    let total_pay: i64 = sheets.iter().map(|s| s.total_pay).sum();

    let mut groups: HashMap<Uuid, Vec<Timesheet>> = HashMap::new();
    for sheet in sheets {
        groups.entry(sheet.equipment_id).or_default().push(sheet);
    }

    let mut equipment: Vec<EquipmentMonth> = groups
        .into_iter()
        .map(|(equipment_id, mut records)| {
            records.sort_by_key(|r| (r.work_date, r.start_time));
            let working_days = records.len() as i64;
            let hours: f64 = records.iter().map(sheet_hours).sum();
            EquipmentMonth {
                equipment_id,
                equipment_name: records
                    .first()
                    .map(|r| r.equipment_name.clone())
                    .unwrap_or_default(),
                working_days,
                total_hours: round2(hours),
                total_pay: records.iter().map(|r| r.total_pay).sum(),
                average_hours: round2(hours / working_days as f64),
                records,
            }
        })
        .collect();
    equipment.sort_by(|a, b| a.equipment_name.cmp(&b.equipment_name));

    let average_hours_per_day = if total_records > 0 {
        round2(total_hours / total_records as f64)
    } else {
        0.0
    };

    MonthlyReport {
        year,
        month,
        summary: MonthlyReportSummary {
            total_equipment: equipment.len() as i64,
            total_working_days: total_records,
            total_hours: round2(total_hours),
            total_pay,
            average_hours_per_day,
        },
        equipment,
    }
}

/// First and last calendar day of a month
fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::BadRequest(format!("Invalid month {}-{:02}", year, month));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn months(&self) -> AppResult<Vec<MonthSummary>> {
        let sheets = self.repository.timesheets.list().await?;
        Ok(summarize_months(&sheets))
    }

    pub async fn month(&self, year: i32, month: u32) -> AppResult<MonthlyReport> {
        let (first, last) = month_bounds(year, month)?;
        let sheets = self.repository.timesheets.list_between(first, last).await?;
        Ok(monthly_report(year, month, sheets))
    }
}
