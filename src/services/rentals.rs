//! Rental workflow: availability, creation with invoice, edits and removal

use std::{collections::HashSet, sync::Arc};

use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    availability::{self, Availability, UnitAvailability},
    pricing,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::RentalStatus,
        equipment::Equipment,
        invoice::Invoice,
        rental::{CreateRental, Rental, RentalConflict, RentalPeriod, UpdateRental},
    },
    repository::RentalStore,
};

/// A newly created rental and its invoice
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedRental {
    pub rental: Rental,
    pub invoice: Invoice,
}

/// Outcome of a rental edit
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RentalUpdate {
    pub rental: Rental,
    pub invoice: Option<Invoice>,
    /// Conflicts the caller acknowledged with `force`
    pub overridden_conflicts: Vec<RentalConflict>,
}

#[derive(Clone)]
pub struct RentalsService {
    store: Arc<dyn RentalStore>,
    /// Offset of the business's local clock, used to decide what "today" is
    utc_offset: FixedOffset,
}

impl RentalsService {
    pub fn new(store: Arc<dyn RentalStore>, utc_offset: FixedOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Today's date on the business's local clock
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.utc_offset).date_naive()
    }

    pub async fn list(&self, status: Option<RentalStatus>) -> AppResult<Vec<Rental>> {
        self.store.list_rentals(status).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Rental> {
        self.store.get_rental(id).await
    }

    /// Invoice attached to a rental
    pub async fn invoice_for(&self, rental_id: Uuid) -> AppResult<Invoice> {
        self.store
            .get_invoice_by_rental(rental_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No invoice for rental {}", rental_id)))
    }

    /// Read the registry and the active rentals overlapping `period`.
    ///
    /// Read failures surface as [`AppError::Lookup`], never as "unavailable".
    async fn availability_inputs(&self, period: RentalPeriod) -> AppResult<(Vec<Equipment>, Vec<Rental>)> {
        let equipment = self
            .store
            .list_equipment()
            .await
            .map_err(AppError::into_lookup)?;
        let active = self
            .store
            .list_active_overlapping(period)
            .await
            .map_err(AppError::into_lookup)?;
        Ok((equipment, active))
    }

    /// Per-unit availability for a candidate period
    pub async fn check_availability(
        &self,
        period: RentalPeriod,
        exclude_rental_id: Option<Uuid>,
    ) -> AppResult<Availability> {
        if !period.is_valid() {
            return Ok(Availability::default());
        }
        let (equipment, active) = self.availability_inputs(period).await?;
        Ok(availability::check_availability(period, &equipment, &active, exclude_rental_id))
    }

    /// Validate a draft, price it and store it with its invoice.
    ///
    /// Unavailable equipment blocks creation outright.
    pub async fn create_rental(&self, draft: CreateRental) -> AppResult<CreatedRental> {
        pricing::validate_selection(&draft.lines)?;
        let draft = draft.normalized()?;
        let period = draft.period();

        if period.start_date < self.today() {
            return Err(AppError::InvalidPeriod(
                "Start date cannot be in the past".to_string(),
            ));
        }

        let (equipment, active) = if period.is_valid() {
            self.availability_inputs(period).await?
        } else {
            (Vec::new(), Vec::new())
        };
        let availability = availability::check_availability(period, &equipment, &active, None);
        pricing::validate_submission(&draft.lines, period, &availability)?;

        let lines = pricing::snapshot_lines(&draft.lines, &equipment, None)?;
        let priced = pricing::compute_totals(lines, period.duration_days())?;

        let now = Utc::now();
        let rental = Rental {
            id: Uuid::new_v4(),
            renter_name: draft.renter_name,
            renter_phone: draft.renter_phone,
            renter_email: draft.renter_email,
            start_date: period.start_date,
            end_date: period.end_date,
            duration_days: period.duration_days() as i32,
            lines: Json(priced.lines),
            total_amount: priced.total_amount,
            status: RentalStatus::Active,
            crea_date: Some(now),
            modif_date: Some(now),
        };
        let invoice = pricing::build_invoice(&rental, now);

        self.store
            .insert_rental_with_invoice(&rental, &invoice)
            .await
            .map_err(AppError::into_storage)?;

        tracing::info!(
            rental_id = %rental.id,
            invoice_number = %invoice.invoice_number,
            total_amount = rental.total_amount,
            "Rental created"
        );

        Ok(CreatedRental { rental, invoice })
    }

    /// Apply changes to a rental, re-price it and resync its invoice.
    ///
    /// Units held by other active rentals produce [`AppError::SchedulingConflict`]
    /// unless `force` is set, in which case the edit goes through and the
    /// overridden conflicts are returned. Units the rental already holds stay
    /// on it when they go under repair; newly added units under repair are
    /// refused with [`AppError::Unavailable`].
    pub async fn update_rental(&self, id: Uuid, changes: UpdateRental) -> AppResult<RentalUpdate> {
        if let Some(lines) = changes.lines.as_deref() {
            pricing::validate_selection(lines)?;
        }

        let current = self.store.get_rental(id).await?;
        let force = changes.force.unwrap_or(false);
        let revision = changes.apply_to(&current)?;

        pricing::validate_selection(&revision.lines)?;
        pricing::validate_period(revision.period)?;

        let (equipment, active) = self.availability_inputs(revision.period).await?;

        let mut conflicts = Vec::new();
        if current.is_active() {
            let availability =
                availability::check_availability(revision.period, &equipment, &active, Some(id));
            let (out_of_service, booked): (Vec<Uuid>, Vec<Uuid>) =
                pricing::unavailable_ids(&revision.lines, &availability)
                    .into_iter()
                    .partition(|unit_id| {
                        availability
                            .get(unit_id)
                            .is_some_and(UnitAvailability::is_out_of_service)
                    });

            let refused: Vec<String> = out_of_service
                .iter()
                .filter(|unit_id| current.line_for(**unit_id).is_none())
                .filter_map(|unit_id| availability.get(unit_id))
                .map(|u| u.equipment_name.clone())
                .collect();
            if !refused.is_empty() {
                return Err(AppError::Unavailable(refused));
            }

            let contended: HashSet<Uuid> = booked.into_iter().collect();
            if !contended.is_empty() {
                conflicts = availability::find_conflicts(revision.period, &active, Some(id), &contended);
                if !force {
                    return Err(AppError::SchedulingConflict(conflicts));
                }
            }
        }

        let lines = pricing::snapshot_lines(&revision.lines, &equipment, Some(&current))?;
        let priced = pricing::compute_totals(lines, revision.period.duration_days())?;

        let now = Utc::now();
        let rental = Rental {
            renter_name: revision.renter_name,
            renter_phone: revision.renter_phone,
            renter_email: revision.renter_email,
            start_date: revision.period.start_date,
            end_date: revision.period.end_date,
            duration_days: revision.period.duration_days() as i32,
            lines: Json(priced.lines),
            total_amount: priced.total_amount,
            modif_date: Some(now),
            ..current
        };

        let invoice = self
            .store
            .get_invoice_by_rental(id)
            .await
            .map_err(AppError::into_lookup)?
            .map(|invoice| pricing::refresh_invoice(invoice, &rental, now));

        self.store
            .update_rental_with_invoice(&rental, invoice.clone())
            .await
            .map_err(AppError::into_storage)?;

        if !conflicts.is_empty() {
            tracing::warn!(
                rental_id = %id,
                conflicts = conflicts.len(),
                "Rental updated despite scheduling conflicts"
            );
        }

        Ok(RentalUpdate {
            rental,
            invoice,
            overridden_conflicts: conflicts,
        })
    }

    /// Delete a rental and its invoice
    pub async fn delete_rental(&self, id: Uuid) -> AppResult<()> {
        self.store
            .delete_rental(id)
            .await
            .map_err(AppError::into_storage)?;
        tracing::info!(rental_id = %id, "Rental deleted");
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: RentalStatus) -> AppResult<Rental> {
        self.store.update_rental_status(id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{enums::EquipmentStatus, rental::LineItemDraft},
        repository::MockRentalStore,
        services::availability::tests::{date, excavator, rental},
    };
    use chrono::{Duration, NaiveDate};

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn days_from_now(days: i64) -> NaiveDate {
        Utc::now().date_naive() + Duration::days(days)
    }

    fn draft(equipment: &[&Equipment], start: NaiveDate, end: NaiveDate) -> CreateRental {
        CreateRental {
            renter_name: "Budi Santoso".to_string(),
            renter_phone: "+62 812 3456 7890".to_string(),
            renter_email: None,
            start_date: start,
            end_date: end,
            lines: equipment
                .iter()
                .map(|e| LineItemDraft::new(Some(e.id), 8.0, 2.0))
                .collect(),
        }
    }

    fn service(store: MockRentalStore) -> RentalsService {
        RentalsService::new(Arc::new(store), wib())
    }

    #[tokio::test]
    async fn test_create_rental_stores_rental_and_invoice() {
        let e1 = excavator("PC200", 1);
        let mut store = MockRentalStore::new();
        let registry = vec![e1.clone()];
        store
            .expect_list_equipment()
            .returning(move || Ok(registry.clone()));
        store
            .expect_list_active_overlapping()
            .returning(|_| Ok(Vec::new()));
        store
            .expect_insert_rental_with_invoice()
            .withf(|rental, invoice| invoice.rental_id == rental.id && invoice.total_amount == rental.total_amount)
            .times(1)
            .returning(|_, _| Ok(()));

        let created = service(store)
            .create_rental(draft(&[&e1], days_from_now(1), days_from_now(2)))
            .await
            .unwrap();

        assert_eq!(created.rental.renter_phone, "081234567890");
        assert_eq!(created.rental.duration_days, 2);
        assert_eq!(created.rental.total_amount, 2_200_000);
        assert_eq!(created.rental.status, RentalStatus::Active);
        assert!(!created.invoice.is_paid);
    }

    #[tokio::test]
    async fn test_create_rental_is_blocked_by_overlapping_rental() {
        let e1 = excavator("PC200", 1);
        let existing = rental(days_from_now(1), days_from_now(5), &[&e1]);
        let mut store = MockRentalStore::new();
        let registry = vec![e1.clone()];
        store
            .expect_list_equipment()
            .returning(move || Ok(registry.clone()));
        store
            .expect_list_active_overlapping()
            .returning(move |_| Ok(vec![existing.clone()]));
        store.expect_insert_rental_with_invoice().never();

        let result = service(store)
            .create_rental(draft(&[&e1], days_from_now(3), days_from_now(6)))
            .await;

        match result {
            Err(AppError::Unavailable(names)) => assert_eq!(names, vec![e1.display_name()]),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_is_not_unavailability() {
        let e1 = excavator("PC200", 1);
        let mut store = MockRentalStore::new();
        store
            .expect_list_equipment()
            .returning(|| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        store.expect_insert_rental_with_invoice().never();

        let svc = service(store);
        let result = svc
            .create_rental(draft(&[&e1], days_from_now(1), days_from_now(2)))
            .await;
        assert!(matches!(result, Err(AppError::Lookup(_))));

        let period = RentalPeriod::new(days_from_now(1), days_from_now(2));
        assert!(matches!(
            svc.check_availability(period, None).await,
            Err(AppError::Lookup(_))
        ));
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let e1 = excavator("PC200", 1);
        let mut store = MockRentalStore::new();
        let registry = vec![e1.clone()];
        store
            .expect_list_equipment()
            .returning(move || Ok(registry.clone()));
        store
            .expect_list_active_overlapping()
            .returning(|_| Ok(Vec::new()));
        store
            .expect_insert_rental_with_invoice()
            .returning(|_, _| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let result = service(store)
            .create_rental(draft(&[&e1], days_from_now(1), days_from_now(2)))
            .await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_duplicates_are_rejected_before_any_read() {
        let e1 = excavator("PC200", 1);
        let mut bad = draft(&[&e1, &e1], days_from_now(2), days_from_now(1));
        bad.renter_name = "x".to_string();
        bad.renter_phone = "12".to_string();

        let result = service(MockRentalStore::new()).create_rental(bad).await;
        assert!(matches!(result, Err(AppError::DuplicateEquipment)));
    }

    #[tokio::test]
    async fn test_past_start_date_is_rejected() {
        let e1 = excavator("PC200", 1);
        let result = service(MockRentalStore::new())
            .create_rental(draft(&[&e1], days_from_now(-1), days_from_now(2)))
            .await;
        assert!(matches!(result, Err(AppError::InvalidPeriod(_))));
    }

    #[tokio::test]
    async fn test_past_start_follows_business_clock() {
        let ahead = FixedOffset::east_opt(14 * 3600).unwrap();
        let svc = RentalsService::new(Arc::new(MockRentalStore::new()), ahead);
        assert_eq!(
            svc.today(),
            (Utc::now() + Duration::hours(14)).date_naive()
        );

        let e1 = excavator("PC200", 1);
        let yesterday = svc.today() - Duration::days(1);
        let result = svc.create_rental(draft(&[&e1], yesterday, svc.today())).await;
        assert!(matches!(result, Err(AppError::InvalidPeriod(_))));
    }

    #[tokio::test]
    async fn test_inverted_period_yields_empty_availability() {
        let svc = service(MockRentalStore::new());
        let period = RentalPeriod::new(date(2024, 1, 5), date(2024, 1, 1));
        assert!(svc.check_availability(period, None).await.unwrap().is_empty());
    }

    fn edit_store(registry: &[Equipment], own: &Rental, others: Vec<Rental>) -> MockRentalStore {
        let mut store = MockRentalStore::new();
        let registry = registry.to_vec();
        let own_for_get = own.clone();
        let mut active = others;
        active.push(own.clone());
        store
            .expect_get_rental()
            .returning(move |_| Ok(own_for_get.clone()));
        store
            .expect_list_equipment()
            .returning(move || Ok(registry.clone()));
        store
            .expect_list_active_overlapping()
            .returning(move |_| Ok(active.clone()));
        store
    }

    #[tokio::test]
    async fn test_extending_own_rental_does_not_conflict() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let mut store = edit_store(&[e1.clone()], &own, Vec::new());
        store
            .expect_get_invoice_by_rental()
            .returning(|_| Ok(None));
        store
            .expect_update_rental_with_invoice()
            .times(1)
            .returning(|_, _| Ok(()));

        let changes = UpdateRental {
            end_date: Some(date(2024, 1, 8)),
            ..Default::default()
        };
        let updated = service(store).update_rental(own.id, changes).await.unwrap();

        assert_eq!(updated.rental.duration_days, 8);
        assert_eq!(updated.rental.total_amount, 8 * 800_000);
        assert!(updated.overridden_conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_conflicting_edit_needs_force() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let other = rental(date(2024, 1, 7), date(2024, 1, 9), &[&e1]);
        let mut store = edit_store(&[e1.clone()], &own, vec![other.clone()]);
        store.expect_update_rental_with_invoice().never();

        let changes = UpdateRental {
            end_date: Some(date(2024, 1, 8)),
            ..Default::default()
        };
        match service(store).update_rental(own.id, changes).await {
            Err(AppError::SchedulingConflict(conflicts)) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].rental_id, other.id);
            }
            other => panic!("expected SchedulingConflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_forced_edit_proceeds_and_resyncs_invoice() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let other = rental(date(2024, 1, 7), date(2024, 1, 9), &[&e1]);
        let invoice = pricing::build_invoice(&own, Utc::now());
        let mut store = edit_store(&[e1.clone()], &own, vec![other]);
        store
            .expect_get_invoice_by_rental()
            .returning(move |_| Ok(Some(invoice.clone())));
        store
            .expect_update_rental_with_invoice()
            .withf(|rental, invoice| {
                invoice
                    .as_ref()
                    .is_some_and(|i| i.total_amount == rental.total_amount)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let changes = UpdateRental {
            end_date: Some(date(2024, 1, 8)),
            force: Some(true),
            ..Default::default()
        };
        let updated = service(store).update_rental(own.id, changes).await.unwrap();

        assert_eq!(updated.overridden_conflicts.len(), 1);
        assert_eq!(updated.invoice.map(|i| i.total_amount), Some(6_400_000));
    }

    #[tokio::test]
    async fn test_duplicate_lines_win_over_invalid_fields_on_edit() {
        let e1 = excavator("PC200", 1);
        let changes = UpdateRental {
            renter_name: Some("x".to_string()),
            lines: Some(vec![
                LineItemDraft::new(Some(e1.id), 8.0, 0.0),
                LineItemDraft::new(Some(e1.id), 8.0, 0.0),
            ]),
            ..Default::default()
        };

        let result = service(MockRentalStore::new())
            .update_rental(Uuid::new_v4(), changes)
            .await;
        assert!(matches!(result, Err(AppError::DuplicateEquipment)));
    }

    #[tokio::test]
    async fn test_edit_storage_failure_is_reported() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let mut store = edit_store(&[e1.clone()], &own, Vec::new());
        store
            .expect_get_invoice_by_rental()
            .returning(|_| Ok(None));
        store
            .expect_update_rental_with_invoice()
            .returning(|_, _| Err(AppError::Database(sqlx::Error::PoolClosed)));

        let changes = UpdateRental {
            end_date: Some(date(2024, 1, 6)),
            ..Default::default()
        };
        let result = service(store).update_rental(own.id, changes).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn test_edit_lookup_failure_is_not_a_conflict() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let own_for_get = own.clone();
        let registry = vec![e1.clone()];
        let mut store = MockRentalStore::new();
        store
            .expect_get_rental()
            .returning(move |_| Ok(own_for_get.clone()));
        store
            .expect_list_equipment()
            .returning(move || Ok(registry.clone()));
        store
            .expect_list_active_overlapping()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        store.expect_update_rental_with_invoice().never();

        let changes = UpdateRental {
            end_date: Some(date(2024, 1, 8)),
            ..Default::default()
        };
        let result = service(store).update_rental(own.id, changes).await;
        assert!(matches!(result, Err(AppError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_edit_invoice_read_failure_is_lookup() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let mut store = edit_store(&[e1.clone()], &own, Vec::new());
        store
            .expect_get_invoice_by_rental()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));
        store.expect_update_rental_with_invoice().never();

        let changes = UpdateRental {
            renter_phone: Some("0811111111".to_string()),
            ..Default::default()
        };
        let result = service(store).update_rental(own.id, changes).await;
        assert!(matches!(result, Err(AppError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_inactive_rental_edit_skips_conflict_check() {
        let e1 = excavator("PC200", 1);
        let mut own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        own.status = RentalStatus::Cancelled;
        let other = rental(date(2024, 1, 7), date(2024, 1, 9), &[&e1]);
        let mut store = edit_store(&[e1.clone()], &own, vec![other]);
        store
            .expect_get_invoice_by_rental()
            .returning(|_| Ok(None));
        store
            .expect_update_rental_with_invoice()
            .times(1)
            .returning(|_, _| Ok(()));

        let changes = UpdateRental {
            end_date: Some(date(2024, 1, 8)),
            ..Default::default()
        };
        let updated = service(store).update_rental(own.id, changes).await.unwrap();

        assert_eq!(updated.rental.status, RentalStatus::Cancelled);
        assert_eq!(updated.rental.duration_days, 8);
        assert!(updated.overridden_conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_held_unit_under_repair_does_not_block_edits() {
        let mut e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        e1.status = EquipmentStatus::UnderRepair;
        let mut store = edit_store(&[e1.clone()], &own, Vec::new());
        store
            .expect_get_invoice_by_rental()
            .returning(|_| Ok(None));
        store
            .expect_update_rental_with_invoice()
            .times(1)
            .returning(|_, _| Ok(()));

        let changes = UpdateRental {
            renter_phone: Some("+62 811 1111 111".to_string()),
            ..Default::default()
        };
        let updated = service(store).update_rental(own.id, changes).await.unwrap();

        assert_eq!(updated.rental.renter_phone, "08111111111");
        assert!(updated.overridden_conflicts.is_empty());
    }

    #[tokio::test]
    async fn test_adding_unit_under_repair_is_refused() {
        let e1 = excavator("PC200", 1);
        let mut e2 = excavator("PC75", 1);
        e2.status = EquipmentStatus::UnderRepair;
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let mut store = edit_store(&[e1.clone(), e2.clone()], &own, Vec::new());
        store.expect_update_rental_with_invoice().never();

        let changes = UpdateRental {
            lines: Some(vec![
                LineItemDraft::new(Some(e1.id), 8.0, 0.0),
                LineItemDraft::new(Some(e2.id), 8.0, 0.0),
            ]),
            force: Some(true),
            ..Default::default()
        };
        match service(store).update_rental(own.id, changes).await {
            Err(AppError::Unavailable(names)) => assert_eq!(names, vec![e2.display_name()]),
            other => panic!("expected Unavailable, got {:?}", other),
        }
    }
}
