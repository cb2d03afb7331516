//! Equipment registry repository

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::EquipmentStatus,
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment, optionally filtered by status
    pub async fn list(&self, status: Option<EquipmentStatus>) -> AppResult<Vec<Equipment>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, Equipment>(
                    "SELECT * FROM equipment WHERE status = $1 ORDER BY brand, name",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Equipment>("SELECT * FROM equipment ORDER BY brand, name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (id, name, brand, equipment_type, operator_name,
                                   regular_rate_per_hour, overtime_rate_per_hour, status, stock,
                                   crea_date, modif_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .bind(data.brand.trim())
        .bind(data.equipment_type.as_deref().unwrap_or("").trim())
        .bind(data.operator_name.as_deref().unwrap_or("").trim())
        .bind(data.regular_rate_per_hour)
        .bind(data.overtime_rate_per_hour)
        .bind(data.status.unwrap_or_default())
        .bind(data.stock.unwrap_or(1))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update the provided fields only
    pub async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let mut sets = vec!["modif_date = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.brand, "brand");
        add_field!(data.equipment_type, "equipment_type");
        add_field!(data.operator_name, "operator_name");
        add_field!(data.regular_rate_per_hour, "regular_rate_per_hour");
        add_field!(data.overtime_rate_per_hour, "overtime_rate_per_hour");
        add_field!(data.status, "status");
        add_field!(data.stock, "stock");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.brand);
        bind_field!(data.equipment_type);
        bind_field!(data.operator_name);
        bind_field!(data.regular_rate_per_hour);
        bind_field!(data.overtime_rate_per_hour);
        bind_field!(data.status);
        bind_field!(data.stock);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment with id {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment with id {} not found", id)));
        }
        Ok(())
    }
}
