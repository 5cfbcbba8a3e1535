use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::delivery::{Delivery, DeliveryStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub delivery_id: Uuid,
    pub rider_id: Option<Uuid>,
    pub status: DeliveryStatus,
    pub at: DateTime<Utc>,
}

impl From<&Delivery> for DeliveryEvent {
    fn from(delivery: &Delivery) -> Self {
        Self {
            delivery_id: delivery.id,
            rider_id: delivery.rider_id,
            status: delivery.status,
            at: Utc::now(),
        }
    }
}
