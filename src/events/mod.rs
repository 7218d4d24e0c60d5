use crate::models::job::JobStatus;
use tokio::sync::broadcast;

/// System events published on lifecycle transitions. Notification delivery
/// subscribes here; the lifecycle controller itself never blocks on it.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    JobStatusChanged {
        job_id: String,
        old_status: JobStatus,
        new_status: JobStatus,
        actor_id: String,
        timestamp: String, // ISO 8601
    },
    PaymentOrderCreated {
        job_id: String,
        order_id: String,
        amount_paise: i64,
        timestamp: String, // ISO 8601
    },
    PaymentCaptured {
        job_id: String,
        order_id: String,
        payment_id: String,
        timestamp: String, // ISO 8601
    },
}

/// Event bus for publishing and subscribing to system events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget)
    pub fn publish(&self, event: SystemEvent) {
        // Fire-and-forget - if no subscribers or channel full, just log and continue
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No subscribers for event: {}", e);
        }
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000) // Default capacity of 1000 events
    }
}
