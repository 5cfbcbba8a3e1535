use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::dispatch::assign_rider;
use crate::engine::queue::enqueue_delivery;
use crate::engine::scoring::best_rider;
use crate::error::AppError;
use crate::models::delivery::DeliveryStatus;
use crate::models::rider::Rider;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Assigned,
    Skipped,
    Requeued,
}

impl Outcome {
    fn label(self) -> &'static str {
        match self {
            Outcome::Assigned => "success",
            Outcome::Skipped => "skipped",
            Outcome::Requeued => "requeued",
        }
    }
}

pub async fn run_assignment_engine(state: Arc<AppState>, mut delivery_rx: mpsc::Receiver<Uuid>) {
    info!("assignment engine started");

    while let Some(delivery_id) = delivery_rx.recv().await {
        state.metrics.deliveries_in_queue.dec();

        let start = Instant::now();
        let outcome = match process_delivery(&state, delivery_id) {
            Ok(outcome) => outcome.label(),
            Err(err) => {
                error!(delivery_id = %delivery_id, error = %err, "failed to process delivery");
                "error"
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        state
            .metrics
            .assignment_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed);
        state
            .metrics
            .assignments_total
            .with_label_values(&[outcome])
            .inc();
    }

    warn!("assignment engine stopped: queue channel closed");
}

fn process_delivery(state: &Arc<AppState>, delivery_id: Uuid) -> Result<Outcome, AppError> {
    let delivery = state
        .deliveries
        .get(&delivery_id)
        .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", delivery_id)))?;

    if delivery.status != DeliveryStatus::Pending {
        debug!(delivery_id = %delivery_id, status = ?delivery.status, "delivery no longer pending");
        return Ok(Outcome::Skipped);
    }

    let riders: Vec<Rider> = state
        .riders
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    let Some((rider, score)) = best_rider(riders.iter(), &delivery) else {
        warn!(delivery_id = %delivery_id, "no eligible riders; re-queueing delivery");
        requeue_later(state.clone(), delivery_id);
        return Ok(Outcome::Requeued);
    };

    match assign_rider(state, delivery_id, rider.id) {
        Ok(_) => {
            info!(
                delivery_id = %delivery_id,
                rider_id = %rider.id,
                score = score.total,
                distance_km = score.distance_km,
                "delivery auto-assigned"
            );
            Ok(Outcome::Assigned)
        }
        // The rider filled up or the delivery moved on since the snapshot.
        Err(AppError::Conflict(reason)) => {
            debug!(delivery_id = %delivery_id, reason = %reason, "assignment raced; retrying");
            requeue_later(state.clone(), delivery_id);
            Ok(Outcome::Requeued)
        }
        Err(err) => Err(err),
    }
}

fn requeue_later(state: Arc<AppState>, delivery_id: Uuid) {
    tokio::spawn(async move {
        sleep(state.assignment_retry).await;
        if let Err(err) = enqueue_delivery(&state, delivery_id).await {
            error!(delivery_id = %delivery_id, error = %err, "failed to re-queue delivery");
        }
    });
}
