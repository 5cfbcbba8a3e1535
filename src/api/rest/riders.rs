use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::rider::{GeoPoint, Rider, RiderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/riders", post(create_rider).get(list_riders))
        .route("/riders/:id", get(get_rider))
        .route("/riders/:id/status", patch(update_rider_status))
        .route("/riders/:id/location", patch(update_rider_location))
}

#[derive(Deserialize)]
pub struct CreateRiderRequest {
    pub name: String,
    pub location: GeoPoint,
    pub capacity: u8,
    pub rating: f64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RiderStatus,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

async fn create_rider(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRiderRequest>,
) -> Result<Json<Rider>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if payload.capacity == 0 {
        return Err(AppError::BadRequest("capacity must be > 0".to_string()));
    }

    let rider = Rider {
        id: Uuid::new_v4(),
        name: payload.name,
        location: payload.location,
        capacity: payload.capacity,
        active_deliveries: 0,
        status: RiderStatus::Available,
        rating: payload.rating.clamp(0.0, 5.0),
        completed_deliveries: 0,
        total_earnings: 0.0,
        updated_at: Utc::now(),
    };

    state.riders.insert(rider.id, rider.clone());
    Ok(Json(rider))
}

async fn list_riders(State(state): State<Arc<AppState>>) -> Json<Vec<Rider>> {
    let riders = state
        .riders
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(riders)
}

async fn get_rider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Rider>, AppError> {
    let rider = state
        .riders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))?;

    Ok(Json(rider.value().clone()))
}

async fn update_rider_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Rider>, AppError> {
    let mut rider = state
        .riders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))?;

    // Busy is derived from load; a rider can only choose to be on or off shift.
    if payload.status == RiderStatus::Busy {
        return Err(AppError::BadRequest(
            "status must be Available or Offline".to_string(),
        ));
    }

    rider.status = if payload.status == RiderStatus::Available
        && rider.active_deliveries >= rider.capacity
    {
        RiderStatus::Busy
    } else {
        payload.status
    };
    rider.updated_at = Utc::now();

    Ok(Json(rider.clone()))
}

async fn update_rider_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Rider>, AppError> {
    let mut rider = state
        .riders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", id)))?;

    rider.location = payload.location;
    rider.updated_at = Utc::now();

    Ok(Json(rider.clone()))
}
