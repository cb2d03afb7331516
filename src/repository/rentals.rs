//! Rentals repository
//!
//! Every write touching a rental also writes its invoice inside one transaction.

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RentalStatus,
        invoice::Invoice,
        rental::{Rental, RentalPeriod},
    },
};

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List rentals, newest start date first
    pub async fn list(&self, status: Option<RentalStatus>) -> AppResult<Vec<Rental>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Rental>(
                    "SELECT * FROM rentals WHERE status = $1 ORDER BY start_date DESC, crea_date DESC",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Rental>(
                    "SELECT * FROM rentals ORDER BY start_date DESC, crea_date DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id {} not found", id)))
    }

    /// Active rentals whose period overlaps `period`, both ends inclusive
    pub async fn list_active_overlapping(&self, period: RentalPeriod) -> AppResult<Vec<Rental>> {
        let rows = sqlx::query_as::<_, Rental>(
            r#"
            SELECT * FROM rentals
            WHERE status = $1 AND start_date <= $2 AND end_date >= $3
            "#,
        )
        .bind(RentalStatus::Active)
        .bind(period.end_date)
        .bind(period.start_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a rental and its invoice; neither is visible unless both are written
    pub async fn create_with_invoice(&self, rental: &Rental, invoice: &Invoice) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rentals (id, renter_name, renter_phone, renter_email, start_date, end_date,
                                 duration_days, lines, total_amount, status, crea_date, modif_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(rental.id)
        .bind(&rental.renter_name)
        .bind(&rental.renter_phone)
        .bind(&rental.renter_email)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.duration_days)
        .bind(&rental.lines)
        .bind(rental.total_amount)
        .bind(rental.status)
        .bind(rental.crea_date)
        .bind(rental.modif_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (id, rental_id, invoice_number, renter_name, renter_phone,
                                  renter_email, date_issued, lines, total_regular_pay,
                                  total_overtime_pay, total_amount, is_paid, crea_date, modif_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(invoice.id)
        .bind(invoice.rental_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.renter_name)
        .bind(&invoice.renter_phone)
        .bind(&invoice.renter_email)
        .bind(invoice.date_issued)
        .bind(&invoice.lines)
        .bind(invoice.total_regular_pay)
        .bind(invoice.total_overtime_pay)
        .bind(invoice.total_amount)
        .bind(invoice.is_paid)
        .bind(invoice.crea_date)
        .bind(invoice.modif_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Rewrite a rental's terms and, when present, its invoice in one transaction
    pub async fn update_with_invoice(&self, rental: &Rental, invoice: Option<&Invoice>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE rentals
            SET renter_name = $1, renter_phone = $2, renter_email = $3, start_date = $4,
                end_date = $5, duration_days = $6, lines = $7, total_amount = $8, modif_date = $9
            WHERE id = $10
            "#,
        )
        .bind(&rental.renter_name)
        .bind(&rental.renter_phone)
        .bind(&rental.renter_email)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.duration_days)
        .bind(&rental.lines)
        .bind(rental.total_amount)
        .bind(rental.modif_date)
        .bind(rental.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rental with id {} not found", rental.id)));
        }

        if let Some(invoice) = invoice {
            sqlx::query(
                r#"
                UPDATE invoices
                SET renter_name = $1, renter_phone = $2, renter_email = $3, lines = $4,
                    total_regular_pay = $5, total_overtime_pay = $6, total_amount = $7,
                    modif_date = $8
                WHERE id = $9
                "#,
            )
            .bind(&invoice.renter_name)
            .bind(&invoice.renter_phone)
            .bind(&invoice.renter_email)
            .bind(&invoice.lines)
            .bind(invoice.total_regular_pay)
            .bind(invoice.total_overtime_pay)
            .bind(invoice.total_amount)
            .bind(invoice.modif_date)
            .bind(invoice.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a rental together with its invoice
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM invoices WHERE rental_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM rentals WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rental with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn update_status(&self, id: Uuid, status: RentalStatus) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(
            "UPDATE rentals SET status = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Rental with id {} not found", id)))
    }
}
