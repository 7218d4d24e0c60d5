use crate::api::middleware::{ApiError, ApiResult, AppState};
use crate::services::payment_signature;
use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: WebhookPaymentWrapper,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentWrapper {
    entity: WebhookPaymentEntity,
}

#[derive(Debug, Deserialize)]
struct WebhookPaymentEntity {
    id: String,
    order_id: String,
}

/// Payment gateway webhook. Verifies the HMAC signature over the raw body,
/// then completes the job referenced by the captured order.
///
/// The gateway retries on non-2xx responses, so anything that is not a
/// signature failure or a malformed body is acknowledged.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<impl IntoResponse> {
    let signature = headers
        .get("X-Razorpay-Signature")
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if !payment_signature::verify_signature(&body, signature, &state.payment_webhook_secret) {
        tracing::warn!("Payment webhook rejected: signature mismatch");
        return Err(ApiError::Unauthorized);
    }

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {}", e)))?;

    if event.event != "payment.captured" {
        tracing::debug!("Ignoring payment webhook event {}", event.event);
        return Ok(Json(json!({ "status": "ignored" })));
    }

    let entity = event.payload.payment.entity;
    let job = state
        .job_service
        .confirm_payment(&entity.order_id, &entity.id)
        .await?;

    match job {
        Some(job) => Ok(Json(json!({ "status": "ok", "job_id": job.id }))),
        None => Ok(Json(json!({ "status": "ignored" }))),
    }
}
