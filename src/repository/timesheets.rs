//! Timesheets repository

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::timesheet::Timesheet,
};

#[derive(Clone)]
pub struct TimesheetsRepository {
    pool: Pool<Postgres>,
}

impl TimesheetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All timesheets, most recent work date first
    pub async fn list(&self) -> AppResult<Vec<Timesheet>> {
        let rows = sqlx::query_as::<_, Timesheet>(
            "SELECT * FROM timesheets ORDER BY work_date DESC, start_time",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Timesheets with a work date in `[from, to]`
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Timesheet>> {
        let rows = sqlx::query_as::<_, Timesheet>(
            r#"
            SELECT * FROM timesheets
            WHERE work_date >= $1 AND work_date <= $2
            ORDER BY work_date, start_time
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Timesheet> {
        sqlx::query_as::<_, Timesheet>("SELECT * FROM timesheets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Timesheet with id {} not found", id)))
    }

    pub async fn create(&self, sheet: &Timesheet) -> AppResult<Timesheet> {
        let row = sqlx::query_as::<_, Timesheet>(
            r#"
            INSERT INTO timesheets (id, equipment_id, equipment_name, work_date, start_time,
                                    end_time, work_hours, overtime_hours, total_works,
                                    total_regular_pay, total_overtime_pay, total_pay,
                                    crea_date, modif_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(sheet.id)
        .bind(sheet.equipment_id)
        .bind(&sheet.equipment_name)
        .bind(sheet.work_date)
        .bind(sheet.start_time)
        .bind(sheet.end_time)
        .bind(sheet.work_hours)
        .bind(sheet.overtime_hours)
        .bind(sheet.total_works)
        .bind(sheet.total_regular_pay)
        .bind(sheet.total_overtime_pay)
        .bind(sheet.total_pay)
        .bind(sheet.crea_date)
        .bind(sheet.modif_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Replace every recorded field of an existing timesheet
    pub async fn update(&self, sheet: &Timesheet) -> AppResult<Timesheet> {
        sqlx::query_as::<_, Timesheet>(
            r#"
            UPDATE timesheets
            SET equipment_id = $1, equipment_name = $2, work_date = $3, start_time = $4,
                end_time = $5, work_hours = $6, overtime_hours = $7, total_works = $8,
                total_regular_pay = $9, total_overtime_pay = $10, total_pay = $11,
                modif_date = $12
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(sheet.equipment_id)
        .bind(&sheet.equipment_name)
        .bind(sheet.work_date)
        .bind(sheet.start_time)
        .bind(sheet.end_time)
        .bind(sheet.work_hours)
        .bind(sheet.overtime_hours)
        .bind(sheet.total_works)
        .bind(sheet.total_regular_pay)
        .bind(sheet.total_overtime_pay)
        .bind(sheet.total_pay)
        .bind(sheet.modif_date)
        .bind(sheet.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Timesheet with id {} not found", sheet.id)))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM timesheets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Timesheet with id {} not found", id)));
        }
        Ok(())
    }
}
