//! Farm CRUD, archive toggling, and crop listing.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use super::{now_epoch, AppState};
use crate::db::entities::{farm, mortgage, mortgage::STATUS_ACTIVE, Farm, Farmer, Mortgage};
use crate::error::{Result, ServerError};
use crate::geo::{self, Coordinates};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmRequest {
    pub owner_id: i32,
    pub title_number: String,
    pub size: f64,
    #[serde(default)]
    pub crops: Vec<String>,
    #[serde(default)]
    pub coordinates: Coordinates,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmResponse {
    pub id: i32,
    pub owner_id: i32,
    pub owner_name: Option<String>,
    pub title_number: String,
    pub size: f64,
    pub is_archived: bool,
    /// True when at least one active mortgage references this farm.
    pub is_mortgaged: bool,
    pub crops: Vec<String>,
    pub coordinates: Coordinates,
    /// Bounding-box center of the polygon, for initial map placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl FarmResponse {
    fn from_model(model: farm::Model, owner_name: Option<String>, is_mortgaged: bool) -> Self {
        let coordinates = geo::parse_coordinates(&model.coordinates).unwrap_or_default();
        let center = geo::center(&coordinates);
        Self {
            id: model.id,
            owner_id: model.owner_id,
            owner_name,
            title_number: model.title_number,
            size: model.size,
            is_archived: model.is_archived,
            is_mortgaged,
            crops: serde_json::from_str(&model.crops).unwrap_or_default(),
            coordinates,
            center,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Distinct crop names across non-archived farms, sorted.
fn distinct_crops(farms: &[farm::Model]) -> Vec<String> {
    let mut crops: Vec<String> = farms
        .iter()
        .filter(|f| !f.is_archived)
        .flat_map(|f| serde_json::from_str::<Vec<String>>(&f.crops).unwrap_or_default())
        .collect();
    crops.sort();
    crops.dedup();
    crops
}

async fn owner_name_of(state: &AppState, owner_id: i32) -> Result<Option<String>> {
    Ok(Farmer::find_by_id(owner_id)
        .one(&state.db)
        .await?
        .map(|f| f.full_name()))
}

async fn farm_is_mortgaged(state: &AppState, farm_id: i32) -> Result<bool> {
    let active = Mortgage::find()
        .filter(mortgage::Column::FarmId.eq(farm_id))
        .filter(mortgage::Column::Status.eq(STATUS_ACTIVE))
        .one(&state.db)
        .await?;
    Ok(active.is_some())
}

/// GET /api/farms - List farms with owner names and mortgage flags
pub async fn list_farms(State(state): State<Arc<AppState>>) -> Result<Json<Vec<FarmResponse>>> {
    let farms = Farm::find().all(&state.db).await?;
    let farmers = Farmer::find().all(&state.db).await?;
    let mortgages = Mortgage::find().all(&state.db).await?;

    let names: HashMap<i32, String> =
        farmers.into_iter().map(|f| (f.id, f.full_name())).collect();

    let response = farms
        .into_iter()
        .map(|f| {
            let owner_name = names.get(&f.owner_id).cloned();
            let is_mortgaged = mortgages.iter().any(|m| m.farm_id == f.id && m.is_active());
            FarmResponse::from_model(f, owner_name, is_mortgaged)
        })
        .collect();

    Ok(Json(response))
}

/// GET /api/farms/:id - Fetch one farm
pub async fn get_farm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<FarmResponse>> {
    let farm = Farm::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmNotFound(id))?;

    let owner_name = owner_name_of(&state, farm.owner_id).await?;
    let is_mortgaged = farm_is_mortgaged(&state, farm.id).await?;

    Ok(Json(FarmResponse::from_model(farm, owner_name, is_mortgaged)))
}

/// POST /api/farms - Register a farm
pub async fn create_farm(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FarmRequest>,
) -> Result<Json<FarmResponse>> {
    // Owner must exist on the write path; the read-side aggregation stays
    // tolerant of gaps regardless.
    let owner = Farmer::find_by_id(req.owner_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ServerError::InvalidRequest(format!("Unknown owner: {}", req.owner_id))
        })?;

    if req.size < 0.0 {
        return Err(ServerError::InvalidRequest(
            "size must be non-negative".to_string(),
        ));
    }

    let now = now_epoch();
    let model = farm::ActiveModel {
        owner_id: Set(req.owner_id),
        title_number: Set(req.title_number),
        size: Set(req.size),
        is_archived: Set(false),
        crops: Set(serde_json::to_string(&req.crops)
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?),
        coordinates: Set(geo::coordinates_to_string(&req.coordinates)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&state.db).await?;
    tracing::info!("Registered farm {} for farmer {}", created.id, created.owner_id);

    Ok(Json(FarmResponse::from_model(
        created,
        Some(owner.full_name()),
        false,
    )))
}

/// PUT /api/farms/:id - Update a farm
pub async fn update_farm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<FarmRequest>,
) -> Result<Json<FarmResponse>> {
    let existing = Farm::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmNotFound(id))?;

    let owner = Farmer::find_by_id(req.owner_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ServerError::InvalidRequest(format!("Unknown owner: {}", req.owner_id))
        })?;

    if req.size < 0.0 {
        return Err(ServerError::InvalidRequest(
            "size must be non-negative".to_string(),
        ));
    }

    let mut model: farm::ActiveModel = existing.into();
    model.owner_id = Set(req.owner_id);
    model.title_number = Set(req.title_number);
    model.size = Set(req.size);
    model.crops = Set(serde_json::to_string(&req.crops)
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?);
    model.coordinates = Set(geo::coordinates_to_string(&req.coordinates));
    model.updated_at = Set(now_epoch());

    let updated = model.update(&state.db).await?;
    let is_mortgaged = farm_is_mortgaged(&state, updated.id).await?;

    Ok(Json(FarmResponse::from_model(
        updated,
        Some(owner.full_name()),
        is_mortgaged,
    )))
}

/// POST /api/farms/:id/archived - Toggle the archived flag
pub async fn toggle_archived(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<FarmResponse>> {
    let existing = Farm::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmNotFound(id))?;

    let was_archived = existing.is_archived;
    let owner_id = existing.owner_id;

    let mut model: farm::ActiveModel = existing.into();
    model.is_archived = Set(!was_archived);
    model.updated_at = Set(now_epoch());

    let updated = model.update(&state.db).await?;
    tracing::info!(
        "Farm {} {}",
        id,
        if updated.is_archived { "archived" } else { "unarchived" }
    );

    let owner_name = owner_name_of(&state, owner_id).await?;
    let is_mortgaged = farm_is_mortgaged(&state, updated.id).await?;

    Ok(Json(FarmResponse::from_model(updated, owner_name, is_mortgaged)))
}

/// DELETE /api/farms/:id - Delete a farm
pub async fn delete_farm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let existing = Farm::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmNotFound(id))?;

    farm::ActiveModel::from(existing).delete(&state.db).await?;
    tracing::info!("Deleted farm {}", id);

    Ok(Json(serde_json::json!({
        "message": format!("Farm {} deleted", id)
    })))
}

/// GET /api/farms/crops - Distinct crops across non-archived farms
pub async fn list_crops(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    let farms = Farm::find().all(&state.db).await?;
    Ok(Json(distinct_crops(&farms)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm_with_crops(id: i32, crops: &[&str], archived: bool) -> farm::Model {
        farm::Model {
            id,
            owner_id: 1,
            title_number: format!("T-{}", id),
            size: 100.0,
            is_archived: archived,
            crops: serde_json::to_string(crops).unwrap(),
            coordinates: "[]".to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_distinct_crops_dedup_and_sort() {
        let farms = vec![
            farm_with_crops(1, &["rice", "corn"], false),
            farm_with_crops(2, &["corn", "banana"], false),
        ];
        assert_eq!(distinct_crops(&farms), vec!["banana", "corn", "rice"]);
    }

    #[test]
    fn test_distinct_crops_skips_archived() {
        let farms = vec![
            farm_with_crops(1, &["rice"], false),
            farm_with_crops(2, &["cacao"], true),
        ];
        assert_eq!(distinct_crops(&farms), vec!["rice"]);
    }

    #[test]
    fn test_distinct_crops_tolerates_bad_column() {
        let mut bad = farm_with_crops(1, &[], false);
        bad.crops = "not json".to_string();
        assert!(distinct_crops(&[bad]).is_empty());
    }
}
