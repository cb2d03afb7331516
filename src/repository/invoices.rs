//! Invoices repository (writes go through the rentals repository)

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::invoice::Invoice,
};

#[derive(Clone)]
pub struct InvoicesRepository {
    pool: Pool<Postgres>,
}

impl InvoicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices ORDER BY date_issued DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Invoice> {
        sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invoice with id {} not found", id)))
    }

    /// The invoice of a rental, if one exists
    pub async fn get_by_rental(&self, rental_id: Uuid) -> AppResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE rental_id = $1")
            .bind(rental_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn set_paid(&self, id: Uuid, is_paid: bool) -> AppResult<Invoice> {
        sqlx::query_as::<_, Invoice>(
            "UPDATE invoices SET is_paid = $1, modif_date = $2 WHERE id = $3 RETURNING *",
        )
        .bind(is_paid)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Invoice with id {} not found", id)))
    }
}
