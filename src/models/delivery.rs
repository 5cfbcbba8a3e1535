use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::rider::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeliveryStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: Uuid,
    pub order_reference: String,
    pub location_id: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub delivery_fee: f64,
    pub commission_amount: f64,
    pub rider_earning: f64,
    pub status: DeliveryStatus,
    pub rider_id: Option<Uuid>,
    // Codes are handed out through the codes endpoint only.
    #[serde(skip_serializing, default)]
    pub pickup_code: String,
    #[serde(skip_serializing, default)]
    pub confirmation_code: String,
    pub created_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Delivery {
    /// Identifier embedded in QR payloads: the UUID without hyphens.
    pub fn qr_id(&self) -> String {
        self.id.simple().to_string()
    }
}
