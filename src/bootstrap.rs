use crate::api::middleware::AppState;
use crate::config::Config;
use crate::database::Database;
use crate::events::EventBus;
use crate::services::payment_gateway::RazorpayGateway;
use crate::services::JobService;
use std::sync::Arc;

/// Wire the application state: event bus, payment gateway client and the
/// job lifecycle service.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let event_bus = EventBus::new(100);
    tracing::info!("Event bus initialized with capacity 100");

    let gateway = Arc::new(RazorpayGateway::new(
        config.razorpay_base_url.clone(),
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    ));
    tracing::info!("Payment gateway client initialized for {}", config.razorpay_base_url);

    let job_service = JobService::new(
        db.clone(),
        gateway,
        event_bus.clone(),
        config.razorpay_key_id.clone(),
    );

    AppState {
        db,
        event_bus,
        job_service,
        session_duration_hours: config.session_duration_hours,
        payment_webhook_secret: config.razorpay_webhook_secret.clone(),
    }
}
