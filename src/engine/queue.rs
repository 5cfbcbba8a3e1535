use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub async fn enqueue_delivery(state: &AppState, delivery_id: Uuid) -> Result<(), AppError> {
    state
        .delivery_tx
        .send(delivery_id)
        .await
        .map_err(|err| AppError::Internal(format!("delivery queue send failed: {err}")))?;

    state.metrics.deliveries_in_queue.inc();
    Ok(())
}
