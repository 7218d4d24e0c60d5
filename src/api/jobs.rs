use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedUser};
use crate::models::{
    CreateJobRequest, Job, JobActionRequest, JobLogListResponse, UserRole,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

/// Create a new job in PENDING state. The customer, worker and charge are
/// fixed here and never change over the job's lifetime.
pub async fn create_job(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<impl IntoResponse> {
    if auth_user.user.role != UserRole::Customer {
        return Err(ApiError::Forbidden(
            "Only customers can create jobs".to_string(),
        ));
    }

    if request.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Job title is required".to_string()));
    }

    if request.charge <= 0 {
        return Err(ApiError::BadRequest(
            "Job charge must be a positive amount".to_string(),
        ));
    }

    let worker = state
        .db
        .get_user_by_id(&request.worker_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Worker not found".to_string()))?;

    if worker.role != UserRole::Worker {
        return Err(ApiError::BadRequest(
            "Assigned user is not a worker".to_string(),
        ));
    }

    let job = Job::new(
        auth_user.user.id.clone(),
        worker.id,
        request.title.trim().to_string(),
        request.description,
        request.charge,
    );
    state.db.create_job(&job).await?;

    Ok(Json(json!({ "success": true, "job": job })))
}

/// Apply a lifecycle action (ACCEPT / START / COMPLETE / CANCEL) to a job.
pub async fn update_job(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<impl IntoResponse> {
    // Unknown action tags are rejected here, at the deserialization
    // boundary; past this point dispatch is an exhaustive match.
    let tag = body
        .get("action")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let action: JobActionRequest = serde_json::from_value(body).map_err(|e| match tag.as_deref() {
        // A known tag with a malformed payload (e.g. a non-numeric GPS
        // coordinate) is a payload problem, not an unknown action.
        Some("START") => ApiError::InvalidProof(format!("Malformed start proof payload: {}", e)),
        Some("ACCEPT") | Some("COMPLETE") | Some("CANCEL") => {
            ApiError::BadRequest(format!("Malformed action payload: {}", e))
        }
        _ => ApiError::InvalidAction(format!("Unrecognized job action: {}", e)),
    })?;

    let outcome = state
        .job_service
        .apply_action(&id, &auth_user.user, action)
        .await?;

    let response = match outcome.payment {
        Some(order) => {
            let resumed = order.resumed;
            Json(json!({
                "success": true,
                "requires_payment": true,
                "razorpay_order": order,
                "resumed": resumed,
                "job": outcome.job,
            }))
        }
        None => Json(json!({
            "success": true,
            "job": outcome.job,
        })),
    };

    Ok(response)
}

/// Get a job by ID. Only the job's customer or worker can see it.
pub async fn get_job(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job = fetch_visible_job(&state, &auth_user, &id).await?;
    Ok(Json(job))
}

/// List jobs where the caller is either the customer or the worker.
pub async fn list_jobs(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<impl IntoResponse> {
    let jobs = state.db.list_jobs_for_user(&auth_user.user.id).await?;
    Ok(Json(json!({ "jobs": jobs })))
}

/// Audit trail for a job, oldest first.
pub async fn get_job_logs(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    // Visibility is the same as for the job itself.
    fetch_visible_job(&state, &auth_user, &id).await?;

    let logs = state.db.list_job_logs(&id).await?;
    Ok(Json(JobLogListResponse { logs }))
}

async fn fetch_visible_job(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    id: &str,
) -> ApiResult<Job> {
    let job = state
        .db
        .get_job_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    if job.customer_id != auth_user.user.id && job.worker_id != auth_user.user.id {
        return Err(ApiError::Forbidden(format!(
            "Job {} does not involve you",
            id
        )));
    }

    Ok(job)
}
