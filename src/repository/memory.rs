use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::Delivery;
use crate::repository::DeliveryRepository;

#[derive(Default)]
pub struct InMemoryDeliveryRepository {
    deliveries: DashMap<Uuid, Delivery>,
}

impl InMemoryDeliveryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeliveryRepository for InMemoryDeliveryRepository {
    fn insert(&self, delivery: Delivery) {
        self.deliveries.insert(delivery.id, delivery);
    }

    fn get(&self, id: &Uuid) -> Option<Delivery> {
        self.deliveries.get(id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<Delivery> {
        let mut deliveries: Vec<Delivery> = self
            .deliveries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        deliveries.sort_by_key(|delivery| delivery.created_at);
        deliveries
    }

    fn len(&self) -> usize {
        self.deliveries.len()
    }

    fn update(
        &self,
        id: &Uuid,
        apply: &mut dyn FnMut(&mut Delivery) -> Result<(), AppError>,
    ) -> Result<Delivery, AppError> {
        // The shard write lock is held until `entry` drops.
        let mut entry = self
            .deliveries
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", id)))?;

        let mut draft = entry.value().clone();
        apply(&mut draft)?;
        *entry = draft.clone();

        Ok(draft)
    }
}
