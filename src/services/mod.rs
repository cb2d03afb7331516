//! Business logic services

pub mod availability;
pub mod equipment;
pub mod invoices;
pub mod pricing;
pub mod rentals;
pub mod reports;
pub mod timesheets;

use std::sync::Arc;

use chrono::FixedOffset;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment: equipment::EquipmentService,
    pub rentals: rentals::RentalsService,
    pub invoices: invoices::InvoicesService,
    pub timesheets: timesheets::TimesheetsService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository and the business's UTC offset
    pub fn new(repository: Repository, utc_offset: FixedOffset) -> Self {
        Self {
            equipment: equipment::EquipmentService::new(repository.clone()),
            rentals: rentals::RentalsService::new(Arc::new(repository.clone()), utc_offset),
            invoices: invoices::InvoicesService::new(repository.clone()),
            timesheets: timesheets::TimesheetsService::new(repository.clone()),
            reports: reports::ReportsService::new(repository),
        }
    }
}
