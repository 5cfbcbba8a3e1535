use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::models::event::DeliveryEvent;
use crate::models::rider::Rider;
use crate::observability::metrics::Metrics;
use crate::repository::{DeliveryRepository, InMemoryDeliveryRepository};

pub struct AppState {
    pub riders: DashMap<Uuid, Rider>,
    pub deliveries: Arc<dyn DeliveryRepository>,
    pub delivery_tx: mpsc::Sender<Uuid>,
    pub delivery_events_tx: broadcast::Sender<DeliveryEvent>,
    pub assignment_retry: Duration,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        delivery_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Uuid>) {
        Self::with_repository(
            Arc::new(InMemoryDeliveryRepository::new()),
            delivery_queue_size,
            event_buffer_size,
        )
    }

    pub fn with_repository(
        deliveries: Arc<dyn DeliveryRepository>,
        delivery_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, mpsc::Receiver<Uuid>) {
        let (delivery_tx, delivery_rx) = mpsc::channel(delivery_queue_size);
        let (delivery_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                riders: DashMap::new(),
                deliveries,
                delivery_tx,
                delivery_events_tx,
                assignment_retry: Duration::from_millis(250),
                metrics: Metrics::new(),
            },
            delivery_rx,
        )
    }

    pub fn with_assignment_retry(mut self, retry: Duration) -> Self {
        self.assignment_retry = retry;
        self
    }
}
