//! Data models for the rental server

pub mod enums;
pub mod equipment;
pub mod invoice;
pub mod rental;
pub mod report;
pub mod staff;
pub mod timesheet;

// Re-export commonly used types
pub use enums::{EquipmentStatus, RentalStatus};
pub use equipment::Equipment;
pub use invoice::{Invoice, InvoiceLine};
pub use rental::{Rental, RentalConflict, RentalLine, RentalPeriod};
pub use report::{MonthSummary, MonthlyReport};
pub use staff::StaffClaims;
pub use timesheet::{Timesheet, TimesheetPay};
