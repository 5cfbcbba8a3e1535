pub mod memory;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::Delivery;

pub use memory::InMemoryDeliveryRepository;

/// Storage for deliveries.
///
/// `update` is the only way to change a stored delivery. Implementations
/// must run `apply` while holding an exclusive lock on that delivery and
/// persist the draft only when `apply` succeeds.
pub trait DeliveryRepository: Send + Sync {
    fn insert(&self, delivery: Delivery);

    fn get(&self, id: &Uuid) -> Option<Delivery>;

    fn list(&self) -> Vec<Delivery>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(
        &self,
        id: &Uuid,
        apply: &mut dyn FnMut(&mut Delivery) -> Result<(), AppError>,
    ) -> Result<Delivery, AppError>;
}
