//! Land-holding aggregation.
//!
//! Computes, for each farmer, a size-accounting summary over the farmer,
//! farm, and mortgage tables: area directly owned, area held as a mortgage
//! recipient, area pledged away from owned farms, and the resulting net
//! total. The computation is a pure projection over in-memory collections;
//! it never touches the database itself and is recomputed on demand rather
//! than persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::entities::{farm, farmer, mortgage};

/// Computed size accounting for one farmer. All values in square meters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingSummary {
    /// Sum of sizes of owned, non-archived farms.
    pub owned_area: f64,
    /// Sum of farm sizes pledged to this farmer, active mortgages only.
    pub mortgage_in_size: f64,
    /// Sum of mortgage sizes pledged away from this farmer's owned farms.
    pub mortgage_out_size: f64,
    /// owned_area + mortgage_in_size - mortgage_out_size
    pub total_size: f64,
}

impl HoldingSummary {
    fn zero() -> Self {
        Self {
            owned_area: 0.0,
            mortgage_in_size: 0.0,
            mortgage_out_size: 0.0,
            total_size: 0.0,
        }
    }
}

/// Compute holding summaries for every farmer in `farmers`.
///
/// Join semantics:
/// - Archived farms never contribute to owned area.
/// - Mortgage-in counts active mortgages only, and resolves the pledged
///   farm's size from the full farm table (the mortgage row's own size is
///   not authoritative for the lender's credit).
/// - Mortgage-out counts mortgages of any status against the farmer's
///   non-archived farms, at the mortgage's own size. The status asymmetry
///   between the two directions is intentional and pinned by tests.
/// - Referential gaps (mortgage against a missing farm, farm with an
///   unknown owner) contribute nothing and raise no error.
pub fn summarize(
    farmers: &[farmer::Model],
    farms: &[farm::Model],
    mortgages: &[mortgage::Model],
) -> HashMap<i32, HoldingSummary> {
    // Non-archived farms partitioned by owner, plus farm-id -> owner for the
    // outgoing join.
    let mut owned_area: HashMap<i32, f64> = HashMap::new();
    let mut owner_of_farm: HashMap<i32, i32> = HashMap::new();
    for f in farms.iter().filter(|f| !f.is_archived) {
        *owned_area.entry(f.owner_id).or_default() += f.size;
        owner_of_farm.insert(f.id, f.owner_id);
    }

    // Full farm table by id, archived included: incoming pledges resolve
    // against every farm.
    let farm_by_id: HashMap<i32, &farm::Model> = farms.iter().map(|f| (f.id, f)).collect();

    let mut mortgage_in: HashMap<i32, f64> = HashMap::new();
    let mut mortgage_out: HashMap<i32, f64> = HashMap::new();
    for m in mortgages {
        if m.is_active() {
            if let Some(pledged) = farm_by_id.get(&m.farm_id) {
                *mortgage_in.entry(m.mortgage_to_id).or_default() += pledged.size;
            }
        }
        // Not filtered by status: a settled pledge still counts against the
        // owner's net.
        if let Some(owner) = owner_of_farm.get(&m.farm_id) {
            *mortgage_out.entry(*owner).or_default() += m.size;
        }
    }

    farmers
        .iter()
        .map(|f| {
            let owned = owned_area.get(&f.id).copied().unwrap_or(0.0);
            let min = mortgage_in.get(&f.id).copied().unwrap_or(0.0);
            let mout = mortgage_out.get(&f.id).copied().unwrap_or(0.0);
            (
                f.id,
                HoldingSummary {
                    owned_area: owned,
                    mortgage_in_size: min,
                    mortgage_out_size: mout,
                    total_size: owned + min - mout,
                },
            )
        })
        .collect()
}

/// Summary for a single farmer, defaulting to all zeros when the farmer has
/// no farms and no mortgages.
pub fn summarize_one(
    farmer: &farmer::Model,
    farms: &[farm::Model],
    mortgages: &[mortgage::Model],
) -> HoldingSummary {
    summarize(std::slice::from_ref(farmer), farms, mortgages)
        .remove(&farmer.id)
        .unwrap_or_else(HoldingSummary::zero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::mortgage::{STATUS_ACTIVE, STATUS_DEFAULTED, STATUS_PAID_OFF};

    fn farmer(id: i32) -> farmer::Model {
        farmer::Model {
            id,
            firstname: format!("First{}", id),
            lastname: format!("Last{}", id),
            middle_initial: None,
            street_address: String::new(),
            city_or_province: String::new(),
            municipality: String::new(),
            barangay: String::new(),
            zipcode: String::new(),
            phone_number: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn farm(id: i32, owner_id: i32, size: f64, is_archived: bool) -> farm::Model {
        farm::Model {
            id,
            owner_id,
            title_number: format!("T-{}", id),
            size,
            is_archived,
            crops: "[]".to_string(),
            coordinates: "[]".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn mortgage(id: i32, farm_id: i32, to: i32, status: &str, size: f64) -> mortgage::Model {
        mortgage::Model {
            id,
            farm_id,
            mortgage_to_id: to,
            status: status.to_string(),
            size,
            coordinates: "[]".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_farmer_with_nothing_is_all_zero() {
        let farmers = vec![farmer(1)];
        let result = summarize(&farmers, &[], &[]);

        let s = &result[&1];
        assert_eq!(s.owned_area, 0.0);
        assert_eq!(s.mortgage_in_size, 0.0);
        assert_eq!(s.mortgage_out_size, 0.0);
        assert_eq!(s.total_size, 0.0);
    }

    #[test]
    fn test_archived_farm_excluded_from_owned_area() {
        let farmers = vec![farmer(1)];
        let farms = vec![farm(10, 1, 1000.0, false), farm(11, 1, 500.0, true)];

        let result = summarize(&farmers, &farms, &[]);
        assert_eq!(result[&1].owned_area, 1000.0);
        assert_eq!(result[&1].total_size, 1000.0);
    }

    #[test]
    fn test_mortgage_in_counts_active_only() {
        let farmers = vec![farmer(1), farmer(2)];
        let farms = vec![farm(10, 2, 300.0, false), farm(11, 2, 200.0, false)];
        let mortgages = vec![
            mortgage(100, 10, 1, STATUS_ACTIVE, 300.0),
            mortgage(101, 11, 1, STATUS_PAID_OFF, 200.0),
        ];

        let result = summarize(&farmers, &farms, &mortgages);
        assert_eq!(result[&1].mortgage_in_size, 300.0);
    }

    #[test]
    fn test_mortgage_in_resolves_size_from_farm_not_mortgage() {
        // The pledged farm's size is authoritative for the lender's credit,
        // even when the mortgage row carries a different size.
        let farmers = vec![farmer(1), farmer(2)];
        let farms = vec![farm(10, 2, 300.0, false)];
        let mortgages = vec![mortgage(100, 10, 1, STATUS_ACTIVE, 120.0)];

        let result = summarize(&farmers, &farms, &mortgages);
        assert_eq!(result[&1].mortgage_in_size, 300.0);
        // The owner is debited at the mortgage's own size.
        assert_eq!(result[&2].mortgage_out_size, 120.0);
    }

    #[test]
    fn test_mortgage_out_ignores_status() {
        let farmers = vec![farmer(1), farmer(2)];
        let farms = vec![farm(10, 1, 2000.0, false)];
        let mortgages = vec![
            mortgage(100, 10, 2, STATUS_ACTIVE, 400.0),
            mortgage(101, 10, 2, STATUS_DEFAULTED, 600.0),
        ];

        let result = summarize(&farmers, &farms, &mortgages);
        assert_eq!(result[&1].mortgage_out_size, 1000.0);
        assert_eq!(result[&1].total_size, 1000.0);
    }

    #[test]
    fn test_unknown_owner_excluded_silently() {
        let farmers = vec![farmer(1)];
        // Owner 99 does not exist in the farmer collection.
        let farms = vec![farm(10, 99, 750.0, false)];

        let result = summarize(&farmers, &farms, &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[&1].owned_area, 0.0);
        let total: f64 = result.values().map(|s| s.owned_area).sum();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_mortgage_against_unknown_farm_contributes_nothing() {
        let farmers = vec![farmer(1)];
        let mortgages = vec![mortgage(100, 42, 1, STATUS_ACTIVE, 500.0)];

        let result = summarize(&farmers, &[], &mortgages);
        assert_eq!(result[&1].mortgage_in_size, 0.0);
        assert_eq!(result[&1].mortgage_out_size, 0.0);
    }

    #[test]
    fn test_active_mortgage_on_archived_farm() {
        // An archived farm drops out of its owner's accounting entirely,
        // including mortgage-out, but the lender is still credited because
        // incoming pledges resolve against the full farm table.
        let farmers = vec![farmer(1), farmer(2)];
        let farms = vec![farm(10, 1, 500.0, true)];
        let mortgages = vec![mortgage(100, 10, 2, STATUS_ACTIVE, 500.0)];

        let result = summarize(&farmers, &farms, &mortgages);
        assert_eq!(result[&1].owned_area, 0.0);
        assert_eq!(result[&1].mortgage_out_size, 0.0);
        assert_eq!(result[&2].mortgage_in_size, 500.0);
    }

    #[test]
    fn test_total_is_owned_plus_in_minus_out() {
        let farmers = vec![farmer(1), farmer(2), farmer(3)];
        let farms = vec![
            farm(10, 1, 1000.0, false),
            farm(11, 1, 250.0, false),
            farm(12, 2, 800.0, false),
            farm(13, 3, 50.0, true),
        ];
        let mortgages = vec![
            mortgage(100, 12, 1, STATUS_ACTIVE, 300.0),
            mortgage(101, 10, 2, STATUS_PAID_OFF, 150.0),
            mortgage(102, 11, 3, STATUS_ACTIVE, 250.0),
        ];

        let result = summarize(&farmers, &farms, &mortgages);
        for s in result.values() {
            assert_eq!(
                s.total_size,
                s.owned_area + s.mortgage_in_size - s.mortgage_out_size
            );
        }

        // Spot-check farmer 1: owns 1250, holds 800 in, pledged 400 out.
        assert_eq!(result[&1].owned_area, 1250.0);
        assert_eq!(result[&1].mortgage_in_size, 800.0);
        assert_eq!(result[&1].mortgage_out_size, 400.0);
        assert_eq!(result[&1].total_size, 1650.0);
    }

    #[test]
    fn test_idempotent_over_unchanged_input() {
        let farmers = vec![farmer(1), farmer(2)];
        let farms = vec![farm(10, 1, 1000.0, false), farm(11, 2, 2000.0, false)];
        let mortgages = vec![mortgage(100, 11, 1, STATUS_ACTIVE, 700.0)];

        let first = summarize(&farmers, &farms, &mortgages);
        let second = summarize(&farmers, &farms, &mortgages);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_one_defaults_to_zero() {
        let lone = farmer(7);
        let s = summarize_one(&lone, &[], &[]);
        assert_eq!(s, HoldingSummary::zero());
    }
}
