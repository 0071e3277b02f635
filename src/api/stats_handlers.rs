//! Dashboard statistics: headline counts, recent registrations, and
//! group-and-count overviews.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Datelike, Utc};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::db::entities::{farmer, Farm, Farmer, Mortgage};
use crate::error::{Result, ServerError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub total_farmers: usize,
    /// Sum of non-archived farm sizes, square meters.
    pub total_farm_size: f64,
    /// Sum of active mortgage sizes, square meters.
    pub total_mortgage_size: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerBrief {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub full_name: String,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentResponse {
    /// Farmers registered in the current calendar month.
    pub count: usize,
    /// Farmers registered today (UTC).
    pub today_farmers: Vec<FarmerBrief>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct OverviewBucket {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    pub by: Option<String>,
}

fn timestamp_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn is_same_month(ts: i64, now: DateTime<Utc>) -> bool {
    timestamp_to_utc(ts)
        .map(|dt| dt.year() == now.year() && dt.month() == now.month())
        .unwrap_or(false)
}

fn is_same_day(ts: i64, now: DateTime<Utc>) -> bool {
    timestamp_to_utc(ts)
        .map(|dt| dt.date_naive() == now.date_naive())
        .unwrap_or(false)
}

/// Registrations per calendar month of the current year, one bucket per
/// month, zeros included.
fn month_buckets(farmers: &[farmer::Model], now: DateTime<Utc>) -> Vec<OverviewBucket> {
    const LABELS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let mut counts = [0usize; 12];
    for f in farmers {
        if let Some(dt) = timestamp_to_utc(f.created_at) {
            if dt.year() == now.year() {
                counts[dt.month0() as usize] += 1;
            }
        }
    }

    LABELS
        .iter()
        .zip(counts)
        .map(|(label, count)| OverviewBucket {
            id: label.to_string(),
            count,
        })
        .collect()
}

/// Registrations per municipality, largest first, ties alphabetical.
fn municipality_buckets(farmers: &[farmer::Model]) -> Vec<OverviewBucket> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for f in farmers {
        *counts.entry(f.municipality.as_str()).or_default() += 1;
    }

    let mut buckets: Vec<OverviewBucket> = counts
        .into_iter()
        .map(|(id, count)| OverviewBucket {
            id: id.to_string(),
            count,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.id.cmp(&b.id)));
    buckets
}

/// GET /api/statistics/count - Headline totals
pub async fn stat_count(State(state): State<Arc<AppState>>) -> Result<Json<CountResponse>> {
    let farmers = Farmer::find().all(&state.db).await?;
    let farms = Farm::find().all(&state.db).await?;
    let mortgages = Mortgage::find().all(&state.db).await?;

    let total_farm_size = farms
        .iter()
        .filter(|f| !f.is_archived)
        .map(|f| f.size)
        .sum();
    let total_mortgage_size = mortgages
        .iter()
        .filter(|m| m.is_active())
        .map(|m| m.size)
        .sum();

    Ok(Json(CountResponse {
        total_farmers: farmers.len(),
        total_farm_size,
        total_mortgage_size,
    }))
}

/// GET /api/statistics/recent - This month's registrations
pub async fn stat_recent(State(state): State<Arc<AppState>>) -> Result<Json<RecentResponse>> {
    let farmers = Farmer::find().all(&state.db).await?;
    let now = Utc::now();

    let count = farmers
        .iter()
        .filter(|f| is_same_month(f.created_at, now))
        .count();

    let today_farmers = farmers
        .iter()
        .filter(|f| is_same_day(f.created_at, now))
        .map(|f| FarmerBrief {
            id: f.id,
            firstname: f.firstname.clone(),
            lastname: f.lastname.clone(),
            full_name: f.full_name(),
            created_at: f.created_at,
        })
        .collect();

    Ok(Json(RecentResponse {
        count,
        today_farmers,
    }))
}

/// GET /api/statistics/overview?by=month|municipality - Group-and-count
pub async fn stat_overview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<Vec<OverviewBucket>>> {
    let farmers = Farmer::find().all(&state.db).await?;

    match query.by.as_deref().unwrap_or("month") {
        "month" => Ok(Json(month_buckets(&farmers, Utc::now()))),
        "municipality" => Ok(Json(municipality_buckets(&farmers))),
        other => Err(ServerError::InvalidRequest(format!(
            "Unknown overview grouping: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn farmer_at(id: i32, municipality: &str, created_at: i64) -> farmer::Model {
        farmer::Model {
            id,
            firstname: format!("First{}", id),
            lastname: format!("Last{}", id),
            middle_initial: None,
            street_address: String::new(),
            city_or_province: String::new(),
            municipality: municipality.to_string(),
            barangay: String::new(),
            zipcode: String::new(),
            phone_number: String::new(),
            created_at,
            updated_at: created_at,
        }
    }

    fn ts(year: i32, month: u32, day: u32) -> i64 {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_month_buckets_current_year_only() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();
        let farmers = vec![
            farmer_at(1, "", ts(2024, 1, 10)),
            farmer_at(2, "", ts(2024, 6, 1)),
            farmer_at(3, "", ts(2024, 6, 20)),
            farmer_at(4, "", ts(2023, 6, 20)),
        ];

        let buckets = month_buckets(&farmers, now);
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0], OverviewBucket { id: "Jan".to_string(), count: 1 });
        assert_eq!(buckets[5], OverviewBucket { id: "Jun".to_string(), count: 2 });
        assert_eq!(buckets[11].count, 0);
    }

    #[test]
    fn test_municipality_buckets_sorted_by_count() {
        let farmers = vec![
            farmer_at(1, "Wao", 0),
            farmer_at(2, "Wao", 0),
            farmer_at(3, "Amai Manabilang", 0),
        ];

        let buckets = municipality_buckets(&farmers);
        assert_eq!(buckets[0].id, "Wao");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].id, "Amai Manabilang");
    }

    #[test]
    fn test_same_month_and_day_predicates() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 8, 30, 0).unwrap();
        assert!(is_same_month(ts(2024, 6, 1), now));
        assert!(!is_same_month(ts(2024, 5, 31), now));
        assert!(!is_same_month(ts(2023, 6, 15), now));
        assert!(is_same_day(ts(2024, 6, 15), now));
        assert!(!is_same_day(ts(2024, 6, 14), now));
    }
}
