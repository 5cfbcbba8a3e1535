use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RiderStatus {
    Available,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    pub id: Uuid,
    pub name: String,
    pub location: GeoPoint,
    pub capacity: u8,
    pub active_deliveries: u8,
    pub status: RiderStatus,
    pub rating: f64,
    pub completed_deliveries: u32,
    pub total_earnings: f64,
    pub updated_at: DateTime<Utc>,
}

impl Rider {
    pub fn can_take_delivery(&self) -> bool {
        self.status == RiderStatus::Available && self.active_deliveries < self.capacity
    }
}
