//! Repository layer for database operations

pub mod equipment;
pub mod invoices;
pub mod rentals;
pub mod timesheets;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        enums::RentalStatus,
        equipment::Equipment,
        invoice::Invoice,
        rental::{Rental, RentalPeriod},
    },
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub equipment: equipment::EquipmentRepository,
    pub rentals: rentals::RentalsRepository,
    pub invoices: invoices::InvoicesRepository,
    pub timesheets: timesheets::TimesheetsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            rentals: rentals::RentalsRepository::new(pool.clone()),
            invoices: invoices::InvoicesRepository::new(pool.clone()),
            timesheets: timesheets::TimesheetsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Storage primitives the rental workflow runs on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;

    async fn list_active_overlapping(&self, period: RentalPeriod) -> AppResult<Vec<Rental>>;

    async fn list_rentals(&self, status: Option<RentalStatus>) -> AppResult<Vec<Rental>>;

    async fn get_rental(&self, id: Uuid) -> AppResult<Rental>;

    async fn get_invoice_by_rental(&self, rental_id: Uuid) -> AppResult<Option<Invoice>>;

    /// Atomic: both records are written or neither is
    async fn insert_rental_with_invoice(&self, rental: &Rental, invoice: &Invoice) -> AppResult<()>;

    /// Atomic: the invoice, when given, is rewritten alongside the rental
    async fn update_rental_with_invoice(&self, rental: &Rental, invoice: Option<Invoice>) -> AppResult<()>;

    async fn delete_rental(&self, id: Uuid) -> AppResult<()>;

    async fn update_rental_status(&self, id: Uuid, status: RentalStatus) -> AppResult<Rental>;
}

#[async_trait]
impl RentalStore for Repository {
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.equipment.list(None).await
    }

    async fn list_active_overlapping(&self, period: RentalPeriod) -> AppResult<Vec<Rental>> {
        self.rentals.list_active_overlapping(period).await
    }

    async fn list_rentals(&self, status: Option<RentalStatus>) -> AppResult<Vec<Rental>> {
        self.rentals.list(status).await
    }

    async fn get_rental(&self, id: Uuid) -> AppResult<Rental> {
        self.rentals.get_by_id(id).await
    }

    async fn get_invoice_by_rental(&self, rental_id: Uuid) -> AppResult<Option<Invoice>> {
        self.invoices.get_by_rental(rental_id).await
    }

    async fn insert_rental_with_invoice(&self, rental: &Rental, invoice: &Invoice) -> AppResult<()> {
        self.rentals.create_with_invoice(rental, invoice).await
    }

    async fn update_rental_with_invoice(&self, rental: &Rental, invoice: Option<Invoice>) -> AppResult<()> {
        self.rentals.update_with_invoice(rental, invoice.as_ref()).await
    }

    async fn delete_rental(&self, id: Uuid) -> AppResult<()> {
        self.rentals.delete(id).await
    }

    async fn update_rental_status(&self, id: Uuid, status: RentalStatus) -> AppResult<Rental> {
        self.rentals.update_status(id, status).await
    }
}
