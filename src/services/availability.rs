//! Rental availability: remaining stock per equipment unit over a candidate period
//!
//! Everything here is a plain function over already-fetched data. Debouncing
//! and re-checking while a form is edited is the caller's concern.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    enums::EquipmentStatus,
    equipment::Equipment,
    rental::{Rental, RentalConflict, RentalPeriod},
};

/// Availability of one equipment record for the checked period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UnitAvailability {
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub stock: i32,
    /// Units held by overlapping active rentals
    pub occupied: i32,
    pub available: bool,
}

impl UnitAvailability {
    /// Unavailable although stock is left, i.e. the unit is not in service.
    pub fn is_out_of_service(&self) -> bool {
        !self.available && self.occupied < self.stock
    }
}

/// Result of an availability check, keyed by equipment id
#[derive(Debug, Clone, Default)]
pub struct Availability {
    units: HashMap<Uuid, UnitAvailability>,
}

impl Availability {
    /// `None` when the equipment was not part of the check.
    pub fn is_available(&self, equipment_id: &Uuid) -> Option<bool> {
        self.units.get(equipment_id).map(|u| u.available)
    }

    pub fn get(&self, equipment_id: &Uuid) -> Option<&UnitAvailability> {
        self.units.get(equipment_id)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The plain `equipment id -> available` mapping.
    pub fn flags(&self) -> HashMap<Uuid, bool> {
        self.units
            .iter()
            .map(|(id, unit)| (*id, unit.available))
            .collect()
    }

    /// Units sorted by display name.
    pub fn into_sorted(self) -> Vec<UnitAvailability> {
        let mut units: Vec<UnitAvailability> = self.units.into_values().collect();
        units.sort_by(|a, b| a.equipment_name.cmp(&b.equipment_name));
        units
    }
}

/// Active rentals overlapping `period`, minus the excluded rental.
fn overlapping<'a>(
    period: RentalPeriod,
    rentals: &'a [Rental],
    exclude_rental_id: Option<Uuid>,
) -> impl Iterator<Item = &'a Rental> {
    rentals.iter().filter(move |r| {
        r.is_active() && Some(r.id) != exclude_rental_id && r.period().overlaps(&period)
    })
}

/// Count occupied units per equipment: one per distinct equipment in each overlapping rental.
pub fn occupancy(
    period: RentalPeriod,
    rentals: &[Rental],
    exclude_rental_id: Option<Uuid>,
) -> HashMap<Uuid, i32> {
    let mut counts: HashMap<Uuid, i32> = HashMap::new();
    for rental in overlapping(period, rentals, exclude_rental_id) {
        let distinct: HashSet<Uuid> = rental.lines.iter().map(|l| l.equipment_id).collect();
        for id in distinct {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    counts
}

/// Compute per-unit availability for `period`.
///
/// Returns an empty result when the period ends before it starts. Units under
/// repair are never available.
pub fn check_availability(
    period: RentalPeriod,
    equipment: &[Equipment],
    active_rentals: &[Rental],
    exclude_rental_id: Option<Uuid>,
) -> Availability {
    if !period.is_valid() {
        return Availability::default();
    }

    let occupied = occupancy(period, active_rentals, exclude_rental_id);

    let units = equipment
        .iter()
        .map(|e| {
            let held = occupied.get(&e.id).copied().unwrap_or(0);
            let unit = UnitAvailability {
                equipment_id: e.id,
                equipment_name: e.display_name(),
                stock: e.stock,
                occupied: held,
                available: e.status == EquipmentStatus::Available && e.stock - held > 0,
            };
            (e.id, unit)
        })
        .collect();

    Availability { units }
}

/// Other active rentals overlapping `period` that hold any of the `contended` units.
pub fn find_conflicts(
    period: RentalPeriod,
    active_rentals: &[Rental],
    exclude_rental_id: Option<Uuid>,
    contended: &HashSet<Uuid>,
) -> Vec<RentalConflict> {
    let mut conflicts: Vec<RentalConflict> = overlapping(period, active_rentals, exclude_rental_id)
        .filter_map(|rental| {
            let equipment_names: Vec<String> = rental
                .lines
                .iter()
                .filter(|l| contended.contains(&l.equipment_id))
                .map(|l| l.equipment_name.clone())
                .collect();
            if equipment_names.is_empty() {
                return None;
            }
            Some(RentalConflict {
                rental_id: rental.id,
                renter_name: rental.renter_name.clone(),
                start_date: rental.start_date,
                end_date: rental.end_date,
                equipment_names,
            })
        })
        .collect();
    conflicts.sort_by_key(|c| (c.start_date, c.rental_id));
    conflicts
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        enums::RentalStatus,
        rental::RentalLine,
    };
    use chrono::NaiveDate;
    use sqlx::types::Json;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn excavator(name: &str, stock: i32) -> Equipment {
        Equipment {
            id: Uuid::new_v4(),
            name: name.to_string(),
            brand: "Komatsu".to_string(),
            equipment_type: "PC".to_string(),
            operator_name: "Agus".to_string(),
            regular_rate_per_hour: 100_000,
            overtime_rate_per_hour: 150_000,
            status: EquipmentStatus::Available,
            stock,
            crea_date: None,
            modif_date: None,
        }
    }

    pub(crate) fn line(equipment: &Equipment) -> RentalLine {
        RentalLine {
            equipment_id: equipment.id,
            equipment_name: equipment.display_name(),
            brand: equipment.brand.clone(),
            equipment_type: equipment.equipment_type.clone(),
            operator_name: equipment.operator_name.clone(),
            regular_rate_per_hour: equipment.regular_rate_per_hour,
            overtime_rate_per_hour: equipment.overtime_rate_per_hour,
            regular_hours: 8.0,
            overtime_hours: 0.0,
            total_regular_pay: 0,
            total_overtime_pay: 0,
            total_pay: 0,
        }
    }

    pub(crate) fn rental(start: NaiveDate, end: NaiveDate, units: &[&Equipment]) -> Rental {
        Rental {
            id: Uuid::new_v4(),
            renter_name: "PT Maju Jaya".to_string(),
            renter_phone: "081234567890".to_string(),
            renter_email: None,
            start_date: start,
            end_date: end,
            duration_days: ((end - start).num_days() + 1) as i32,
            lines: Json(units.iter().map(|e| line(e)).collect()),
            total_amount: 0,
            status: RentalStatus::Active,
            crea_date: None,
            modif_date: None,
        }
    }

    #[test]
    fn test_touching_periods_conflict() {
        let e1 = excavator("PC200", 1);
        let rentals = vec![rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1])];

        let touching = RentalPeriod::new(date(2024, 1, 5), date(2024, 1, 10));
        let result = check_availability(touching, &[e1.clone()], &rentals, None);
        assert_eq!(result.is_available(&e1.id), Some(false));

        let after = RentalPeriod::new(date(2024, 1, 6), date(2024, 1, 10));
        let result = check_availability(after, &[e1.clone()], &rentals, None);
        assert_eq!(result.is_available(&e1.id), Some(true));
    }

    #[test]
    fn test_stock_is_shared_between_rentals() {
        let e1 = excavator("PC300", 2);
        let period = RentalPeriod::new(date(2024, 2, 1), date(2024, 2, 3));

        let one = vec![rental(date(2024, 2, 1), date(2024, 2, 2), &[&e1])];
        let result = check_availability(period, &[e1.clone()], &one, None);
        let unit = result.get(&e1.id).unwrap();
        assert!(unit.available);
        assert_eq!(unit.occupied, 1);

        let two = vec![
            rental(date(2024, 2, 1), date(2024, 2, 2), &[&e1]),
            rental(date(2024, 2, 3), date(2024, 2, 9), &[&e1]),
        ];
        let result = check_availability(period, &[e1.clone()], &two, None);
        assert_eq!(result.is_available(&e1.id), Some(false));
    }

    #[test]
    fn test_overlapping_rental_blocks_new_draft() {
        let e1 = excavator("PC200", 1);
        let e2 = excavator("PC75", 1);
        let rentals = vec![rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1])];

        let period = RentalPeriod::new(date(2024, 1, 3), date(2024, 1, 6));
        let result = check_availability(period, &[e1.clone(), e2.clone()], &rentals, None);
        assert_eq!(result.is_available(&e1.id), Some(false));
        assert_eq!(result.is_available(&e2.id), Some(true));
        assert_eq!(result.flags().len(), 2);
    }

    #[test]
    fn test_edited_rental_does_not_conflict_with_itself() {
        let e1 = excavator("PC200", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let rentals = vec![own.clone()];

        let extended = RentalPeriod::new(date(2024, 1, 1), date(2024, 1, 8));
        let result = check_availability(extended, &[e1.clone()], &rentals, Some(own.id));
        assert_eq!(result.is_available(&e1.id), Some(true));

        let result = check_availability(extended, &[e1.clone()], &rentals, None);
        assert_eq!(result.is_available(&e1.id), Some(false));
    }

    #[test]
    fn test_inverted_period_yields_empty_result() {
        let e1 = excavator("PC200", 1);
        let period = RentalPeriod::new(date(2024, 1, 5), date(2024, 1, 1));
        assert!(check_availability(period, &[e1], &[], None).is_empty());
    }

    #[test]
    fn test_inactive_and_repair_states() {
        let e1 = excavator("PC200", 1);
        let mut repaired = excavator("PC210", 3);
        repaired.status = EquipmentStatus::UnderRepair;

        let mut done = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        done.status = RentalStatus::Completed;

        let period = RentalPeriod::new(date(2024, 1, 2), date(2024, 1, 3));
        let result = check_availability(period, &[e1.clone(), repaired.clone()], &[done], None);
        assert_eq!(result.is_available(&e1.id), Some(true));
        assert_eq!(result.is_available(&repaired.id), Some(false));
        assert!(result.get(&repaired.id).unwrap().is_out_of_service());
        assert!(!result.get(&e1.id).unwrap().is_out_of_service());
    }

    #[test]
    fn test_rental_occupies_one_unit_per_equipment() {
        let e1 = excavator("PC200", 2);
        let mut twice = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        twice.lines.0.push(line(&e1));

        let counts = occupancy(RentalPeriod::new(date(2024, 1, 1), date(2024, 1, 1)), &[twice], None);
        assert_eq!(counts.get(&e1.id), Some(&1));
    }

    #[test]
    fn test_find_conflicts_lists_other_rentals_holding_units() {
        let e1 = excavator("PC200", 1);
        let e2 = excavator("PC75", 1);
        let own = rental(date(2024, 1, 1), date(2024, 1, 5), &[&e1]);
        let other = rental(date(2024, 1, 6), date(2024, 1, 9), &[&e1, &e2]);
        let unrelated = rental(date(2024, 1, 6), date(2024, 1, 9), &[&e2]);
        let rentals = vec![own.clone(), other.clone(), unrelated];

        let contended: HashSet<Uuid> = [e1.id].into_iter().collect();
        let extended = RentalPeriod::new(date(2024, 1, 1), date(2024, 1, 7));
        let conflicts = find_conflicts(extended, &rentals, Some(own.id), &contended);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].rental_id, other.id);
        assert_eq!(conflicts[0].equipment_names, vec![e1.display_name()]);
    }
}
