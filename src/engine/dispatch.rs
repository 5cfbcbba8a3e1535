//! Delivery operations shared by the HTTP handlers and the assignment engine.
//!
//! Every state change goes through [`DeliveryRepository::update`], so the
//! lifecycle checks run inside the delivery's critical section. Rider
//! bookkeeping happens after the delivery lock is released; the two locks
//! are never held together.
//!
//! [`DeliveryRepository::update`]: crate::repository::DeliveryRepository::update

use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commission::{self, locations::find_location};
use crate::engine::lifecycle;
use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus};
use crate::models::event::DeliveryEvent;
use crate::models::rider::{GeoPoint, RiderStatus};
use crate::state::AppState;
use crate::verification::{decode_qr_payload, generate_confirmation_code, generate_pickup_code};

#[derive(Debug, Clone, Deserialize)]
pub struct NewDelivery {
    pub order_reference: String,
    pub location_id: String,
    /// Defaults to the service location's coordinates.
    pub pickup: Option<GeoPoint>,
    pub dropoff: GeoPoint,
    pub delivery_fee: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Pickup,
    Delivery,
}

impl Stage {
    fn label(self) -> &'static str {
        match self {
            Stage::Pickup => "pickup",
            Stage::Delivery => "delivery",
        }
    }
}

pub fn create_delivery(state: &AppState, request: NewDelivery) -> Result<Delivery, AppError> {
    if request.order_reference.trim().is_empty() {
        return Err(AppError::BadRequest(
            "order_reference cannot be empty".to_string(),
        ));
    }

    if !commission::is_accepted_fee(request.delivery_fee) {
        return Err(AppError::BadRequest(format!(
            "delivery_fee must be between 0 and {}",
            commission::MAX_DELIVERY_FEE
        )));
    }

    let pickup = match (request.pickup, find_location(&request.location_id)) {
        (Some(point), _) => point,
        (None, Some(location)) => location.point.clone(),
        (None, None) => {
            return Err(AppError::BadRequest(format!(
                "unknown location {} requires an explicit pickup point",
                request.location_id
            )));
        }
    };

    let commission_amount = commission::calculate_commission(&request.location_id, request.delivery_fee);
    let rider_earning = commission::calculate_rider_earning(request.delivery_fee, commission_amount);

    let pickup_code = generate_pickup_code();
    let mut confirmation_code = generate_confirmation_code();
    while confirmation_code == pickup_code {
        confirmation_code = generate_confirmation_code();
    }

    let delivery = Delivery {
        id: Uuid::new_v4(),
        order_reference: request.order_reference,
        location_id: request.location_id,
        pickup,
        dropoff: request.dropoff,
        delivery_fee: request.delivery_fee,
        commission_amount,
        rider_earning,
        status: DeliveryStatus::Pending,
        rider_id: None,
        pickup_code,
        confirmation_code,
        created_at: Utc::now(),
        assigned_at: None,
        picked_up_at: None,
        delivered_at: None,
        cancelled_at: None,
    };

    state.deliveries.insert(delivery.clone());
    publish(state, &delivery);

    info!(
        delivery_id = %delivery.id,
        location_id = %delivery.location_id,
        delivery_fee = delivery.delivery_fee,
        commission = delivery.commission_amount,
        "delivery created"
    );

    Ok(delivery)
}

pub fn assign_rider(
    state: &AppState,
    delivery_id: Uuid,
    rider_id: Uuid,
) -> Result<Delivery, AppError> {
    reserve_rider(state, rider_id)?;

    let now = Utc::now();
    let result = state.deliveries.update(&delivery_id, &mut |delivery| {
        lifecycle::assign(delivery, rider_id, now).map_err(AppError::from)
    });

    let delivery = match result {
        Ok(delivery) => delivery,
        Err(err) => {
            release_rider(state, rider_id);
            return Err(err);
        }
    };

    publish(state, &delivery);
    info!(delivery_id = %delivery_id, rider_id = %rider_id, "rider assigned");

    Ok(delivery)
}

pub fn verify_pickup(
    state: &AppState,
    delivery_id: Uuid,
    rider_id: Uuid,
    code: &str,
) -> Result<Delivery, AppError> {
    let now = Utc::now();
    let result = state.deliveries.update(&delivery_id, &mut |delivery| {
        lifecycle::verify_pickup(delivery, rider_id, code, now).map_err(AppError::from)
    });
    let delivery = record_verification(state, Stage::Pickup, delivery_id, result)?;

    publish(state, &delivery);
    info!(delivery_id = %delivery_id, rider_id = %rider_id, "order picked up");

    Ok(delivery)
}

pub fn confirm_delivery(
    state: &AppState,
    delivery_id: Uuid,
    rider_id: Uuid,
    code: &str,
) -> Result<Delivery, AppError> {
    let now = Utc::now();
    let result = state.deliveries.update(&delivery_id, &mut |delivery| {
        lifecycle::confirm_delivery(delivery, rider_id, code, now).map_err(AppError::from)
    });
    let delivery = record_verification(state, Stage::Delivery, delivery_id, result)?;

    credit_rider(state, rider_id, delivery.rider_earning);
    state
        .metrics
        .commission_collected_total
        .inc_by(delivery.commission_amount);

    publish(state, &delivery);
    info!(
        delivery_id = %delivery_id,
        rider_id = %rider_id,
        rider_earning = delivery.rider_earning,
        "delivery confirmed"
    );

    Ok(delivery)
}

/// Routes a scanned QR payload to pickup or delivery verification depending
/// on where the delivery currently is.
pub fn submit_scan(state: &AppState, rider_id: Uuid, payload: &str) -> Result<Delivery, AppError> {
    let decoded = decode_qr_payload(payload)
        .ok_or_else(|| AppError::InvalidCode("invalid QR payload".to_string()))?;

    let delivery_id = Uuid::parse_str(&decoded.delivery_id)
        .map_err(|_| AppError::InvalidCode("invalid QR payload".to_string()))?;

    let delivery = state
        .deliveries
        .get(&delivery_id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", delivery_id)))?;

    match delivery.status {
        DeliveryStatus::Assigned => verify_pickup(state, delivery_id, rider_id, &decoded.code),
        DeliveryStatus::InTransit => confirm_delivery(state, delivery_id, rider_id, &decoded.code),
        status => Err(AppError::Conflict(format!(
            "delivery {} is {:?} and cannot be scanned",
            delivery_id, status
        ))),
    }
}

pub fn cancel_delivery(state: &AppState, delivery_id: Uuid) -> Result<Delivery, AppError> {
    let now = Utc::now();
    let mut released = None;
    let delivery = state.deliveries.update(&delivery_id, &mut |delivery| {
        released = match delivery.status {
            DeliveryStatus::Assigned => delivery.rider_id,
            _ => None,
        };
        lifecycle::cancel(delivery, now).map_err(AppError::from)
    })?;

    if let Some(rider_id) = released {
        release_rider(state, rider_id);
    }

    publish(state, &delivery);
    info!(delivery_id = %delivery_id, "delivery cancelled");

    Ok(delivery)
}

fn record_verification(
    state: &AppState,
    stage: Stage,
    delivery_id: Uuid,
    result: Result<Delivery, AppError>,
) -> Result<Delivery, AppError> {
    let outcome = if result.is_ok() { "accepted" } else { "rejected" };
    state
        .metrics
        .verification_attempts_total
        .with_label_values(&[stage.label(), outcome])
        .inc();

    if let Err(err) = &result {
        warn!(delivery_id = %delivery_id, stage = stage.label(), error = %err, "verification rejected");
    }

    result
}

fn reserve_rider(state: &AppState, rider_id: Uuid) -> Result<(), AppError> {
    let mut rider = state
        .riders
        .get_mut(&rider_id)
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", rider_id)))?;

    if !rider.can_take_delivery() {
        return Err(AppError::Conflict(format!(
            "rider {} cannot take another delivery",
            rider_id
        )));
    }

    rider.active_deliveries = rider.active_deliveries.saturating_add(1);
    if rider.active_deliveries >= rider.capacity {
        rider.status = RiderStatus::Busy;
    }
    rider.updated_at = Utc::now();

    set_utilization(state, rider_id, rider.active_deliveries, rider.capacity);
    Ok(())
}

fn release_rider(state: &AppState, rider_id: Uuid) {
    let Some(mut rider) = state.riders.get_mut(&rider_id) else {
        debug!(rider_id = %rider_id, "released rider no longer exists");
        return;
    };

    rider.active_deliveries = rider.active_deliveries.saturating_sub(1);
    if rider.status == RiderStatus::Busy && rider.active_deliveries < rider.capacity {
        rider.status = RiderStatus::Available;
    }
    rider.updated_at = Utc::now();

    set_utilization(state, rider_id, rider.active_deliveries, rider.capacity);
}

fn credit_rider(state: &AppState, rider_id: Uuid, earning: f64) {
    release_rider(state, rider_id);

    if let Some(mut rider) = state.riders.get_mut(&rider_id) {
        rider.completed_deliveries += 1;
        rider.total_earnings = commission::add_amounts(rider.total_earnings, earning);
    }
}

fn set_utilization(state: &AppState, rider_id: Uuid, active: u8, capacity: u8) {
    let utilization = if capacity == 0 {
        0.0
    } else {
        active as f64 / capacity as f64
    };
    state
        .metrics
        .rider_utilization
        .with_label_values(&[&rider_id.to_string()])
        .set(utilization);
}

fn publish(state: &AppState, delivery: &Delivery) {
    state
        .metrics
        .delivery_transitions_total
        .with_label_values(&[&format!("{:?}", delivery.status)])
        .inc();
    let _ = state.delivery_events_tx.send(DeliveryEvent::from(delivery));
}
