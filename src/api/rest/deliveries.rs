use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::dispatch::{self, NewDelivery};
use crate::engine::queue::enqueue_delivery;
use crate::error::AppError;
use crate::models::delivery::Delivery;
use crate::state::AppState;
use crate::verification::encode_qr_payload;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deliveries", post(create_delivery).get(list_deliveries))
        .route("/deliveries/scan", post(scan))
        .route("/deliveries/:id", get(get_delivery))
        .route("/deliveries/:id/codes", get(get_codes))
        .route("/deliveries/:id/assign", post(assign))
        .route("/deliveries/:id/pickup", post(pickup))
        .route("/deliveries/:id/confirm", post(confirm))
        .route("/deliveries/:id/cancel", post(cancel))
}

#[derive(Deserialize)]
pub struct CreateDeliveryRequest {
    #[serde(flatten)]
    pub delivery: NewDelivery,
    #[serde(default = "default_auto_assign")]
    pub auto_assign: bool,
}

fn default_auto_assign() -> bool {
    true
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub rider_id: Uuid,
}

#[derive(Deserialize)]
pub struct CodeSubmission {
    pub rider_id: Uuid,
    pub code: String,
}

#[derive(Deserialize)]
pub struct ScanRequest {
    pub rider_id: Uuid,
    pub payload: String,
}

#[derive(Serialize)]
pub struct DeliveryCodes {
    pub delivery_id: Uuid,
    pub pickup_code: String,
    pub confirmation_code: String,
    pub pickup_qr: String,
    pub confirmation_qr: String,
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<Json<Delivery>, AppError> {
    let delivery = dispatch::create_delivery(&state, payload.delivery)?;

    if payload.auto_assign {
        enqueue_delivery(&state, delivery.id).await?;
    }

    Ok(Json(delivery))
}

async fn list_deliveries(State(state): State<Arc<AppState>>) -> Json<Vec<Delivery>> {
    Json(state.deliveries.list())
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    state
        .deliveries
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", id)))
}

async fn get_codes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryCodes>, AppError> {
    let delivery = state
        .deliveries
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", id)))?;

    let qr_id = delivery.qr_id();
    Ok(Json(DeliveryCodes {
        delivery_id: delivery.id,
        pickup_qr: encode_qr_payload(&qr_id, &delivery.pickup_code),
        confirmation_qr: encode_qr_payload(&qr_id, &delivery.confirmation_code),
        pickup_code: delivery.pickup_code,
        confirmation_code: delivery.confirmation_code,
    }))
}

async fn assign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<Delivery>, AppError> {
    dispatch::assign_rider(&state, id, payload.rider_id).map(Json)
}

async fn pickup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CodeSubmission>,
) -> Result<Json<Delivery>, AppError> {
    dispatch::verify_pickup(&state, id, payload.rider_id, &payload.code).map(Json)
}

async fn confirm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CodeSubmission>,
) -> Result<Json<Delivery>, AppError> {
    dispatch::confirm_delivery(&state, id, payload.rider_id, &payload.code).map(Json)
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    dispatch::cancel_delivery(&state, id).map(Json)
}

async fn scan(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<Delivery>, AppError> {
    dispatch::submit_scan(&state, payload.rider_id, &payload.payload).map(Json)
}
