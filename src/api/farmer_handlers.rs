//! Farmer CRUD and the computed-holdings listing.
//!
//! `GET /api/farmers` is the aggregation endpoint: every farmer is returned
//! with the four computed size fields from the holdings module alongside the
//! passthrough identity fields.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use super::{now_epoch, AppState};
use crate::db::entities::{farmer, Farm, Farmer, Mortgage};
use crate::error::{Result, ServerError};
use crate::holdings::{self, HoldingSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street_address: String,
    pub city_or_province: String,
    pub municipality: String,
    pub barangay: String,
    pub zipcode: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerRequest {
    pub firstname: String,
    pub lastname: String,
    pub middle_initial: Option<String>,
    pub address: Address,
    pub phone_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerResponse {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_initial: Option<String>,
    pub full_name: String,
    pub address: Address,
    pub phone_number: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(flatten)]
    pub holdings: HoldingSummary,
}

impl FarmerResponse {
    fn from_model(model: farmer::Model, holdings: HoldingSummary) -> Self {
        Self {
            id: model.id,
            full_name: model.full_name(),
            address: Address {
                street_address: model.street_address,
                city_or_province: model.city_or_province,
                municipality: model.municipality,
                barangay: model.barangay,
                zipcode: model.zipcode,
            },
            firstname: model.firstname,
            lastname: model.lastname,
            middle_initial: model.middle_initial,
            phone_number: model.phone_number,
            created_at: model.created_at,
            updated_at: model.updated_at,
            holdings,
        }
    }
}

/// GET /api/farmers - List farmers with computed holdings
pub async fn list_farmers(State(state): State<Arc<AppState>>) -> Result<Json<Vec<FarmerResponse>>> {
    let farmers = Farmer::find().all(&state.db).await?;
    let farms = Farm::find().all(&state.db).await?;
    let mortgages = Mortgage::find().all(&state.db).await?;

    let mut summaries = holdings::summarize(&farmers, &farms, &mortgages);

    let response = farmers
        .into_iter()
        .map(|f| {
            let summary = summaries
                .remove(&f.id)
                .unwrap_or_else(|| holdings::summarize_one(&f, &[], &[]));
            FarmerResponse::from_model(f, summary)
        })
        .collect();

    Ok(Json(response))
}

/// GET /api/farmers/:id - Fetch one farmer with computed holdings
pub async fn get_farmer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<FarmerResponse>> {
    let farmer = Farmer::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmerNotFound(id))?;

    let farms = Farm::find().all(&state.db).await?;
    let mortgages = Mortgage::find().all(&state.db).await?;
    let summary = holdings::summarize_one(&farmer, &farms, &mortgages);

    Ok(Json(FarmerResponse::from_model(farmer, summary)))
}

/// POST /api/farmers - Register a farmer
pub async fn create_farmer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FarmerRequest>,
) -> Result<Json<FarmerResponse>> {
    if req.firstname.trim().is_empty() || req.lastname.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "firstname and lastname are required".to_string(),
        ));
    }

    let now = now_epoch();
    let model = farmer::ActiveModel {
        firstname: Set(req.firstname),
        lastname: Set(req.lastname),
        middle_initial: Set(req.middle_initial),
        street_address: Set(req.address.street_address),
        city_or_province: Set(req.address.city_or_province),
        municipality: Set(req.address.municipality),
        barangay: Set(req.address.barangay),
        zipcode: Set(req.address.zipcode),
        phone_number: Set(req.phone_number),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(&state.db).await?;
    tracing::info!("Registered farmer {}", created.id);

    let summary = holdings::summarize_one(&created, &[], &[]);
    Ok(Json(FarmerResponse::from_model(created, summary)))
}

/// PUT /api/farmers/:id - Update a farmer
pub async fn update_farmer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<FarmerRequest>,
) -> Result<Json<FarmerResponse>> {
    let existing = Farmer::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmerNotFound(id))?;

    let mut model: farmer::ActiveModel = existing.into();
    model.firstname = Set(req.firstname);
    model.lastname = Set(req.lastname);
    model.middle_initial = Set(req.middle_initial);
    model.street_address = Set(req.address.street_address);
    model.city_or_province = Set(req.address.city_or_province);
    model.municipality = Set(req.address.municipality);
    model.barangay = Set(req.address.barangay);
    model.zipcode = Set(req.address.zipcode);
    model.phone_number = Set(req.phone_number);
    model.updated_at = Set(now_epoch());

    let updated = model.update(&state.db).await?;

    let farms = Farm::find().all(&state.db).await?;
    let mortgages = Mortgage::find().all(&state.db).await?;
    let summary = holdings::summarize_one(&updated, &farms, &mortgages);

    Ok(Json(FarmerResponse::from_model(updated, summary)))
}

/// DELETE /api/farmers/:id - Delete a farmer
pub async fn delete_farmer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>> {
    let existing = Farmer::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or(ServerError::FarmerNotFound(id))?;

    farmer::ActiveModel::from(existing).delete(&state.db).await?;
    tracing::info!("Deleted farmer {}", id);

    Ok(Json(serde_json::json!({
        "message": format!("Farmer {} deleted", id)
    })))
}
