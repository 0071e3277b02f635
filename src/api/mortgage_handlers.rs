//! Mortgage CRUD.
//!
//! Status values form a closed set; anything else is rejected here on the
//! write path. The holdings aggregation never validates status, it only
//! filters on it.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use super::{now_epoch, AppState};
use crate::db::entities::{mortgage, mortgage::STATUSES, Farm, Farmer, Mortgage};
use crate::error::{Result, ServerError};
use crate::geo::{self, Coordinates};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageRequest {
    pub farm_id: i32,
    pub mortgage_to_id: i32,
    pub status: String,
    pub size: f64,
    #[serde(default)]
    pub coordinates: Coordinates,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResponse {
    pub id: i32,
    pub farm_id: i32,
    pub farm_title_number: Option<String>,
    pub mortgage_to_id: i32,
    pub mortgage_to_name: Option<String>,
    pub status: String,
    pub size: f64,
    pub coordinates: Coordinates,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MortgageResponse {
    fn from_model(
        model: mortgage::Model,
        farm_title_number: Option<String>,
        mortgage_to_name: Option<String>,
    ) -> Self {
        Self {
            id: model.id,
            farm_id: model.farm_id,
            farm_title_number,
            mortgage_to_id: model.mortgage_to_id,
            mortgage_to_name,
            status: model.status,
            size: model.size,
            coordinates: geo::parse_coordinates(&model.coordinates).unwrap_or_default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn validate_status(status: &str) -> Result<()> {
    if STATUSES.contains(&status) {
        return Ok(());
    }
    Err(ServerError::InvalidRequest(format!(
        "Unknown mortgage status: {} (expected one of {})",
        status,
        STATUSES.join(", ")
    )))
}

async fn denormalize(
    state: &AppState,
    model: mortgage::Model,
) -> Result<MortgageResponse> {
    let farm_title = Farm::find_by_id(model.farm_id)
        .one(&state.db)
        .await?
        .map(|f| f.title_number);
    let lender_name = Farmer::find_by_id(model.mortgage_to_id)
        .one(&state.db)
        .await?
        .map(|f| f.full_name());
    Ok(MortgageResponse::from_model(model, farm_title, lender_name))
}

/// GET /api/mortgages - List mortgages with denormalized names
pub async fn list_mortgages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MortgageResponse>>> {
    let mortgages = Mortgage::find().all(&state.db).await?;
    let farms = Farm::find().all(&state.db).await?;
    let farmers = Farmer::find().all(&state.db).await?;

    let titles: HashMap<i32, String> =
        farms.into_iter().map(|f| (f.id, f.title_number)).collect();
    let names: HashMap<i32, String> =
        farmers.into_iter().map(|f| (f.id, f.full_name())).collect();

    let response = mortgages
        .into_iter()
        .map(|m| {
            let title = titles.get(&m.farm_id).cloned();
            let name = names.get(&m.mortgage_to_id).cloned();
            MortgageResponse::from_model(m, title, name)
        })
        .collect();

    Ok(Json(response))
}

/// GET /api/mortgages/:id - Fetch one mortgage
pub async fn get_mortgage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<MortgageResponse>> {
    let mortgage = Mortgage::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::MortgageNotFound(id))?;

    Ok(Json(denormalize(&state, mortgage).await?))
}

/// POST /api/mortgages - Record a mortgage
pub async fn create_mortgage(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MortgageRequest>,
) -> Result<Json<MortgageResponse>> {
    validate_status(&req.status)?;

    Farm::find_by_id(req.farm_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::InvalidRequest(format!("Unknown farm: {}", req.farm_id)))?;
    Farmer::find_by_id(req.mortgage_to_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ServerError::InvalidRequest(format!("Unknown farmer: {}", req.mortgage_to_id))
        })?;

    if req.size < 0.0 {
        return Err(ServerError::InvalidRequest(
            "size must be non-negative".to_string(),
        ));
    }

    let now = now_epoch();
    let model = mortgage::ActiveModel {
        farm_id: Set(req.farm_id),
        mortgage_to_id: Set(req.mortgage_to_id),
        status: Set(req.status),
        size: Set(req.size),
        coordinates: Set(geo::coordinates_to_string(&req.coordinates)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&state.db).await?;
    tracing::info!(
        "Recorded mortgage {} on farm {} to farmer {}",
        created.id,
        created.farm_id,
        created.mortgage_to_id
    );

    Ok(Json(denormalize(&state, created).await?))
}

/// PUT /api/mortgages/:id - Update a mortgage
pub async fn update_mortgage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<MortgageRequest>,
) -> Result<Json<MortgageResponse>> {
    validate_status(&req.status)?;

    let existing = Mortgage::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::MortgageNotFound(id))?;

    Farm::find_by_id(req.farm_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ServerError::InvalidRequest(format!("Unknown farm: {}", req.farm_id)))?;
    Farmer::find_by_id(req.mortgage_to_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ServerError::InvalidRequest(format!("Unknown farmer: {}", req.mortgage_to_id))
        })?;

    if req.size < 0.0 {
        return Err(ServerError::InvalidRequest(
            "size must be non-negative".to_string(),
        ));
    }

    let mut model: mortgage::ActiveModel = existing.into();
    model.farm_id = Set(req.farm_id);
    model.mortgage_to_id = Set(req.mortgage_to_id);
    model.status = Set(req.status);
    model.size = Set(req.size);
    model.coordinates = Set(geo::coordinates_to_string(&req.coordinates));
    model.updated_at = Set(now_epoch());

    let updated = model.update(&state.db).await?;

    Ok(Json(denormalize(&state, updated).await?))
}

/// DELETE /api/mortgages/:id - Delete a mortgage
pub async fn delete_mortgage(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let existing = Mortgage::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::MortgageNotFound(id))?;

    mortgage::ActiveModel::from(existing).delete(&state.db).await?;
    tracing::info!("Deleted mortgage {}", id);

    Ok(Json(serde_json::json!({
        "message": format!("Mortgage {} deleted", id)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_status_accepts_closed_set() {
        for status in STATUSES {
            assert!(validate_status(status).is_ok());
        }
    }

    #[test]
    fn test_validate_status_rejects_unknown() {
        assert!(validate_status("Open").is_err());
        assert!(validate_status("active").is_err());
        assert!(validate_status("").is_err());
    }
}
