//! Disbursement CRUD.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::DateTime;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use super::{now_epoch, AppState};
use crate::db::entities::{disbursement, Disbursement, Farmer};
use crate::error::{Result, ServerError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementRequest {
    pub farmer_id: i32,
    #[serde(default)]
    pub assistances: Vec<String>,
    pub size: f64,
    /// RFC 3339 date-time string.
    pub received_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementResponse {
    pub id: i32,
    pub farmer_id: i32,
    pub farmer_name: Option<String>,
    pub assistances: Vec<String>,
    pub size: f64,
    pub received_date: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DisbursementResponse {
    fn from_model(model: disbursement::Model, farmer_name: Option<String>) -> Self {
        Self {
            id: model.id,
            farmer_id: model.farmer_id,
            farmer_name,
            assistances: serde_json::from_str(&model.assistances).unwrap_or_default(),
            size: model.size,
            received_date: model.received_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn parse_received_date(raw: &str) -> Result<i64> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.timestamp())
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid receivedDate: {}", e)))
}

async fn validate_request(state: &AppState, req: &DisbursementRequest) -> Result<i64> {
    Farmer::find_by_id(req.farmer_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            ServerError::InvalidRequest(format!("Unknown farmer: {}", req.farmer_id))
        })?;

    if req.size < 0.0 {
        return Err(ServerError::InvalidRequest(
            "size must be non-negative".to_string(),
        ));
    }

    parse_received_date(&req.received_date)
}

/// GET /api/disbursements - List disbursements
pub async fn list_disbursements(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DisbursementResponse>>> {
    let disbursements = Disbursement::find().all(&state.db).await?;
    let farmers = Farmer::find().all(&state.db).await?;

    let names: HashMap<i32, String> =
        farmers.into_iter().map(|f| (f.id, f.full_name())).collect();

    let response = disbursements
        .into_iter()
        .map(|d| {
            let name = names.get(&d.farmer_id).cloned();
            DisbursementResponse::from_model(d, name)
        })
        .collect();

    Ok(Json(response))
}

/// GET /api/disbursements/:id - Fetch one disbursement
pub async fn get_disbursement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<DisbursementResponse>> {
    let disbursement = Disbursement::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::DisbursementNotFound(id))?;

    let name = Farmer::find_by_id(disbursement.farmer_id)
        .one(&state.db)
        .await?
        .map(|f| f.full_name());

    Ok(Json(DisbursementResponse::from_model(disbursement, name)))
}

/// POST /api/disbursements - Record a disbursement
pub async fn create_disbursement(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DisbursementRequest>,
) -> Result<Json<DisbursementResponse>> {
    let received = validate_request(&state, &req).await?;

    let now = now_epoch();
    let model = disbursement::ActiveModel {
        farmer_id: Set(req.farmer_id),
        assistances: Set(serde_json::to_string(&req.assistances)
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?),
        size: Set(req.size),
        received_date: Set(received),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&state.db).await?;
    tracing::info!("Recorded disbursement {} for farmer {}", created.id, created.farmer_id);

    let name = Farmer::find_by_id(created.farmer_id)
        .one(&state.db)
        .await?
        .map(|f| f.full_name());

    Ok(Json(DisbursementResponse::from_model(created, name)))
}

/// PUT /api/disbursements/:id - Update a disbursement
pub async fn update_disbursement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<DisbursementRequest>,
) -> Result<Json<DisbursementResponse>> {
    let existing = Disbursement::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::DisbursementNotFound(id))?;

    let received = validate_request(&state, &req).await?;

    let mut model: disbursement::ActiveModel = existing.into();
    model.farmer_id = Set(req.farmer_id);
    model.assistances = Set(serde_json::to_string(&req.assistances)
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?);
    model.size = Set(req.size);
    model.received_date = Set(received);
    model.updated_at = Set(now_epoch());

    let updated = model.update(&state.db).await?;

    let name = Farmer::find_by_id(updated.farmer_id)
        .one(&state.db)
        .await?
        .map(|f| f.full_name());

    Ok(Json(DisbursementResponse::from_model(updated, name)))
}

/// DELETE /api/disbursements/:id - Delete a disbursement
pub async fn delete_disbursement(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let existing = Disbursement::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::DisbursementNotFound(id))?;

    disbursement::ActiveModel::from(existing).delete(&state.db).await?;
    tracing::info!("Deleted disbursement {}", id);

    Ok(Json(serde_json::json!({
        "message": format!("Disbursement {} deleted", id)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_received_date() {
        assert_eq!(parse_received_date("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(parse_received_date("2024-06-01T12:00:00+00:00").unwrap(), 1717243200);
    }

    #[test]
    fn test_parse_received_date_rejects_garbage() {
        assert!(parse_received_date("yesterday").is_err());
        assert!(parse_received_date("").is_err());
    }
}
