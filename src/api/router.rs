use crate::api;
use crate::api::middleware::{require_auth, AppState};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    // Build protected routes (require authentication)
    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/jobs", post(api::jobs::create_job))
        .route("/api/jobs", get(api::jobs::list_jobs))
        .route("/api/jobs/:id", get(api::jobs::get_job))
        .route("/api/jobs/:id", patch(api::jobs::update_job))
        .route("/api/jobs/:id/logs", get(api::jobs::get_job_logs))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Public routes: login and the gateway webhook (authenticated by its
    // HMAC signature, not by a session).
    let public = Router::new()
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/payments/webhook", post(api::payments::payment_webhook));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}
