use serde::Serialize;

use crate::geo::distance_km;
use crate::models::delivery::Delivery;
use crate::models::rider::Rider;

const DISTANCE_WEIGHT: f64 = 0.50;
const LOAD_WEIGHT: f64 = 0.30;
const RATING_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, Serialize)]
pub struct RiderScore {
    pub distance_km: f64,
    pub distance_score: f64,
    pub load_score: f64,
    pub rating_score: f64,
    pub total: f64,
}

/// Higher is better. Every component lies in [0, 1].
pub fn score_rider(rider: &Rider, delivery: &Delivery) -> RiderScore {
    let distance_km = distance_km(&rider.location, &delivery.pickup);
    let distance_score = 1.0 / (1.0 + distance_km.max(0.0));
    let load_score = load_score(rider.active_deliveries, rider.capacity);
    let rating_score = (rider.rating / 5.0).clamp(0.0, 1.0);

    RiderScore {
        distance_km,
        distance_score,
        load_score,
        rating_score,
        total: distance_score * DISTANCE_WEIGHT
            + load_score * LOAD_WEIGHT
            + rating_score * RATING_WEIGHT,
    }
}

/// Picks the highest scoring rider among those able to take the delivery.
pub fn best_rider<'a, I>(riders: I, delivery: &Delivery) -> Option<(&'a Rider, RiderScore)>
where
    I: IntoIterator<Item = &'a Rider>,
{
    riders
        .into_iter()
        .filter(|rider| rider.can_take_delivery())
        .map(|rider| (rider, score_rider(rider, delivery)))
        .max_by(|a, b| a.1.total.total_cmp(&b.1.total))
}

fn load_score(active: u8, capacity: u8) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (1.0 - active as f64 / capacity as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{best_rider, score_rider};
    use crate::models::delivery::{Delivery, DeliveryStatus};
    use crate::models::rider::{GeoPoint, Rider, RiderStatus};

    fn rider(seed: u128, lat: f64, lng: f64, active: u8, rating: f64) -> Rider {
        Rider {
            id: Uuid::from_u128(seed),
            name: "rider".to_string(),
            location: GeoPoint { lat, lng },
            capacity: 3,
            active_deliveries: active,
            status: RiderStatus::Available,
            rating,
            completed_deliveries: 0,
            total_earnings: 0.0,
            updated_at: Utc::now(),
        }
    }

    fn delivery_at(lat: f64, lng: f64) -> Delivery {
        Delivery {
            id: Uuid::new_v4(),
            order_reference: "order".to_string(),
            location_id: "downtown".to_string(),
            pickup: GeoPoint { lat, lng },
            dropoff: GeoPoint {
                lat: lat + 0.02,
                lng: lng + 0.02,
            },
            delivery_fee: 25.0,
            commission_amount: 0.03,
            rider_earning: 24.97,
            status: DeliveryStatus::Pending,
            rider_id: None,
            pickup_code: "123456".to_string(),
            confirmation_code: "654321".to_string(),
            created_at: Utc::now(),
            assigned_at: None,
            picked_up_at: None,
            delivered_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn nearer_rider_scores_higher() {
        let delivery = delivery_at(52.52, 13.405);
        let near = score_rider(&rider(1, 52.521, 13.406, 0, 4.5), &delivery);
        let far = score_rider(&rider(2, 52.70, 13.80, 0, 4.5), &delivery);
        assert!(near.total > far.total);
    }

    #[test]
    fn busy_rider_is_penalized() {
        let delivery = delivery_at(52.52, 13.405);
        let idle = score_rider(&rider(1, 52.521, 13.406, 0, 4.5), &delivery);
        let loaded = score_rider(&rider(2, 52.521, 13.406, 2, 4.5), &delivery);
        assert!(idle.load_score > loaded.load_score);
        assert!(idle.total > loaded.total);
    }

    #[test]
    fn best_rider_skips_offline_and_full() {
        let delivery = delivery_at(52.52, 13.405);

        let mut offline = rider(1, 52.52, 13.405, 0, 5.0);
        offline.status = RiderStatus::Offline;
        let full = rider(2, 52.52, 13.405, 3, 5.0);
        let distant = rider(3, 52.60, 13.60, 0, 3.0);

        let riders = [offline, full, distant];
        let (chosen, _) = best_rider(riders.iter(), &delivery).unwrap();
        assert_eq!(chosen.id, Uuid::from_u128(3));
    }

    #[test]
    fn no_eligible_rider() {
        let delivery = delivery_at(52.52, 13.405);
        let full = rider(1, 52.52, 13.405, 3, 5.0);
        assert!(best_rider([&full], &delivery).is_none());
    }
}
