//! Invoice service

use uuid::Uuid;

use crate::{error::AppResult, models::invoice::Invoice, repository::Repository};

#[derive(Clone)]
pub struct InvoicesService {
    repository: Repository,
}

impl InvoicesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Invoice>> {
        self.repository.invoices.list().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Invoice> {
        self.repository.invoices.get_by_id(id).await
    }

    /// Mark an invoice as paid or unpaid
    pub async fn set_paid(&self, id: Uuid, is_paid: bool) -> AppResult<Invoice> {
        let invoice = self.repository.invoices.set_paid(id, is_paid).await?;
        tracing::info!(invoice_number = %invoice.invoice_number, is_paid, "Invoice payment flag changed");
        Ok(invoice)
    }
}
