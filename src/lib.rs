//! Excavator Rental Server
//!
//! REST JSON API for an excavator rental business: equipment registry,
//! rentals with stock-aware availability checks, derived invoices, daily
//! timesheets with shift pay, and monthly reports.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub pool: Pool<Postgres>,
}
