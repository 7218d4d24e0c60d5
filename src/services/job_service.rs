use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::events::{EventBus, SystemEvent};
use crate::models::{
    Job, JobActionOutcome, JobActionRequest, JobLog, JobLogAction, JobStatus,
    PaymentOrderDescriptor, User, UserRole,
};
use crate::services::payment_gateway::PaymentGateway;
use crate::services::state_machine::{validate_transition, TransitionError};
use serde_json::json;
use std::sync::Arc;

/// Bounded retries for the optimistic version check around the
/// read-validate-write sequence.
const MAX_VERSION_RETRIES: u32 = 3;

const DEFAULT_CANCEL_REASON: &str = "No reason provided";

/// Server-authoritative job lifecycle controller.
///
/// Receives a lifecycle action for a job, authorizes it against job
/// ownership and role, validates the current state and action-specific
/// preconditions, applies the transition, appends an audit log entry, and
/// triggers side effects (payment-order creation, event publication).
#[derive(Clone)]
pub struct JobService {
    db: Database,
    gateway: Arc<dyn PaymentGateway>,
    event_bus: EventBus,
    razorpay_key_id: String,
}

impl JobService {
    pub fn new(
        db: Database,
        gateway: Arc<dyn PaymentGateway>,
        event_bus: EventBus,
        razorpay_key_id: String,
    ) -> Self {
        Self {
            db,
            gateway,
            event_bus,
            razorpay_key_id,
        }
    }

    /// Apply a lifecycle action on behalf of the resolved actor.
    ///
    /// The fetch-validate-mutate-log sequence runs under an optimistic
    /// version check; a concurrent mutation of the same job triggers a
    /// bounded re-read-and-retry before surfacing a conflict.
    pub async fn apply_action(
        &self,
        job_id: &str,
        actor: &User,
        action: JobActionRequest,
    ) -> ApiResult<JobActionOutcome> {
        let mut last_conflict = String::new();

        for attempt in 0..MAX_VERSION_RETRIES {
            if attempt > 0 {
                tracing::warn!(
                    "Retrying {} on job {} after version conflict (attempt {})",
                    action.name(),
                    job_id,
                    attempt + 1
                );
            }

            match self.try_apply(job_id, actor, &action).await {
                Err(ApiError::Conflict(msg)) => last_conflict = msg,
                other => return other,
            }
        }

        Err(ApiError::Conflict(last_conflict))
    }

    async fn try_apply(
        &self,
        job_id: &str,
        actor: &User,
        action: &JobActionRequest,
    ) -> ApiResult<JobActionOutcome> {
        let job = self
            .db
            .get_job_by_id(job_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

        match action {
            JobActionRequest::Accept => self.handle_accept(job, actor).await,
            JobActionRequest::Start {
                start_proof_photo,
                start_proof_gps_lat,
                start_proof_gps_lng,
            } => {
                self.handle_start(
                    job,
                    actor,
                    start_proof_photo.as_deref(),
                    *start_proof_gps_lat,
                    *start_proof_gps_lng,
                )
                .await
            }
            JobActionRequest::Complete => self.handle_complete(job, actor).await,
            JobActionRequest::Cancel { reason } => {
                self.handle_cancel(job, actor, reason.as_deref()).await
            }
        }
    }

    async fn handle_accept(&self, job: Job, actor: &User) -> ApiResult<JobActionOutcome> {
        ensure_transition(&job, JobStatus::Accepted)?;

        if actor.role != UserRole::Worker || actor.id != job.worker_id {
            return Err(ApiError::Forbidden(
                "Only the assigned worker can accept this job".to_string(),
            ));
        }

        if !self.db.mark_job_accepted(&job.id, job.version).await? {
            return Err(ApiError::Conflict(
                "Job was modified concurrently".to_string(),
            ));
        }

        let updated = self.reload(&job.id).await?;

        self.db
            .create_job_log(&JobLog::new(
                job.id.clone(),
                JobStatus::Pending,
                JobStatus::Accepted,
                JobLogAction::WorkerAccepted,
                actor.id.clone(),
                json!({}),
            ))
            .await?;

        self.publish_status_change(&updated, JobStatus::Pending, actor);

        tracing::info!("Job {} accepted by worker {}", job.id, actor.id);

        Ok(JobActionOutcome {
            job: updated,
            payment: None,
        })
    }

    async fn handle_start(
        &self,
        job: Job,
        actor: &User,
        photo: Option<&str>,
        gps_lat: Option<f64>,
        gps_lng: Option<f64>,
    ) -> ApiResult<JobActionOutcome> {
        ensure_transition(&job, JobStatus::InProgress)?;

        if actor.role != UserRole::Worker || actor.id != job.worker_id {
            return Err(ApiError::Forbidden(
                "Only the assigned worker can start this job".to_string(),
            ));
        }

        let proof = validate_start_proof(photo, gps_lat, gps_lng)?;

        // started_at is authoritative for downstream duration computation.
        let started_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| ApiError::Internal(format!("Timestamp formatting failed: {}", e)))?;

        let started = self
            .db
            .mark_job_started(
                &job.id,
                job.version,
                &proof.photo,
                proof.gps_lat,
                proof.gps_lng,
                &started_at,
            )
            .await?;

        if !started {
            return Err(ApiError::Conflict(
                "Job was modified concurrently".to_string(),
            ));
        }

        let updated = self.reload(&job.id).await?;

        self.db
            .create_job_log(&JobLog::new(
                job.id.clone(),
                JobStatus::Accepted,
                JobStatus::InProgress,
                JobLogAction::WorkStarted,
                actor.id.clone(),
                json!({
                    "start_proof_photo": proof.photo,
                    "start_proof_gps_lat": proof.gps_lat,
                    "start_proof_gps_lng": proof.gps_lng,
                    "started_at": started_at,
                }),
            ))
            .await?;

        self.publish_status_change(&updated, JobStatus::Accepted, actor);

        tracing::info!("Job {} started by worker {}", job.id, actor.id);

        Ok(JobActionOutcome {
            job: updated,
            payment: None,
        })
    }

    /// COMPLETE requests payment; the job stays IN_PROGRESS until the
    /// gateway confirms capture through the webhook. Retried calls are
    /// idempotent against the persisted order id.
    async fn handle_complete(&self, job: Job, actor: &User) -> ApiResult<JobActionOutcome> {
        if job.status != JobStatus::InProgress {
            return Err(ApiError::InvalidState(format!(
                "Payment can only be requested for jobs in progress (current status: {})",
                job.status
            )));
        }

        if actor.role != UserRole::Customer || actor.id != job.customer_id {
            return Err(ApiError::Forbidden(
                "Only the job's customer can request payment".to_string(),
            ));
        }

        // Retried COMPLETE calls short-circuit on the persisted order id:
        // no second gateway order, no second audit row.
        if let Some(order_id) = job.payment_order_id.clone() {
            tracing::info!("Reusing payment order {} for job {}", order_id, job.id);
            return Ok(self.payment_outcome(job, order_id, true));
        }

        let order = self
            .gateway
            .create_order(&job.id, job.charge_in_paise(), &actor.email, &actor.phone)
            .await
            .map_err(|e| ApiError::PaymentGateway(e.to_string()))?;

        if !self
            .db
            .claim_payment_order(&job.id, job.version, &order.id)
            .await?
        {
            // Either a concurrent COMPLETE already claimed an order id, or
            // another mutation bumped the version. Re-read to find out.
            let current = self.reload(&job.id).await?;
            if let Some(existing) = current.payment_order_id.clone() {
                tracing::warn!(
                    "Concurrent payment order creation for job {}; reusing {} (discarding {})",
                    job.id,
                    existing,
                    order.id
                );
                return Ok(self.payment_outcome(current, existing, true));
            }
            return Err(ApiError::Conflict(
                "Job was modified concurrently".to_string(),
            ));
        }

        let updated = self.reload(&job.id).await?;

        self.db
            .create_job_log(&JobLog::new(
                job.id.clone(),
                JobStatus::InProgress,
                JobStatus::InProgress,
                JobLogAction::PaymentInitiated,
                actor.id.clone(),
                json!({
                    "payment_order_id": order.id,
                    "amount_paise": order.amount,
                    "charge": job.charge,
                }),
            ))
            .await?;

        self.event_bus.publish(SystemEvent::PaymentOrderCreated {
            job_id: job.id.clone(),
            order_id: order.id.clone(),
            amount_paise: order.amount,
            timestamp: now_rfc3339(),
        });

        tracing::info!(
            "Payment order {} created for job {} ({} paise)",
            order.id,
            job.id,
            order.amount
        );

        Ok(self.payment_outcome(updated, order.id, false))
    }

    async fn handle_cancel(
        &self,
        job: Job,
        actor: &User,
        reason: Option<&str>,
    ) -> ApiResult<JobActionOutcome> {
        let cancelled_by = if actor.role == UserRole::Customer && actor.id == job.customer_id {
            "customer"
        } else if actor.role == UserRole::Worker && actor.id == job.worker_id {
            "worker"
        } else {
            return Err(ApiError::Forbidden(
                "Only the job's customer or worker can cancel it".to_string(),
            ));
        };

        // The anti-fraud gate for in-progress jobs is reported ahead of the
        // generic stage check inside the transition table.
        ensure_transition(&job, JobStatus::Cancelled)?;

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_CANCEL_REASON);

        if !self
            .db
            .mark_job_cancelled(&job.id, job.version, reason)
            .await?
        {
            return Err(ApiError::Conflict(
                "Job was modified concurrently".to_string(),
            ));
        }

        let updated = self.reload(&job.id).await?;

        self.db
            .create_job_log(&JobLog::new(
                job.id.clone(),
                job.status,
                JobStatus::Cancelled,
                JobLogAction::JobCancelled,
                actor.id.clone(),
                json!({
                    "cancelled_by": cancelled_by,
                    "reason": reason,
                }),
            ))
            .await?;

        self.publish_status_change(&updated, job.status, actor);

        tracing::info!("Job {} cancelled by {} ({})", job.id, cancelled_by, actor.id);

        Ok(JobActionOutcome {
            job: updated,
            payment: None,
        })
    }

    /// Complete a job once the gateway reports the payment captured.
    ///
    /// Idempotent: a replayed webhook for an already-completed job changes
    /// nothing and appends no second audit row. Unknown order ids are
    /// reported as `None` so the caller can acknowledge without retry.
    pub async fn confirm_payment(
        &self,
        order_id: &str,
        payment_id: &str,
    ) -> ApiResult<Option<Job>> {
        for _attempt in 0..MAX_VERSION_RETRIES {
            let job = match self.db.get_job_by_payment_order_id(order_id).await? {
                Some(job) => job,
                None => {
                    tracing::warn!("Payment captured for unknown order {}", order_id);
                    return Ok(None);
                }
            };

            match job.status {
                // Replayed webhook: already confirmed.
                JobStatus::Completed => return Ok(Some(job)),
                JobStatus::InProgress => {
                    if !self.db.mark_job_completed(&job.id, job.version).await? {
                        continue;
                    }

                    let updated = self.reload(&job.id).await?;

                    self.db
                        .create_job_log(&JobLog::new(
                            job.id.clone(),
                            JobStatus::InProgress,
                            JobStatus::Completed,
                            JobLogAction::PaymentConfirmed,
                            job.customer_id.clone(),
                            json!({
                                "payment_order_id": order_id,
                                "payment_id": payment_id,
                            }),
                        ))
                        .await?;

                    self.event_bus.publish(SystemEvent::PaymentCaptured {
                        job_id: job.id.clone(),
                        order_id: order_id.to_string(),
                        payment_id: payment_id.to_string(),
                        timestamp: now_rfc3339(),
                    });

                    tracing::info!("Job {} completed; payment {} captured", job.id, payment_id);

                    return Ok(Some(updated));
                }
                other => {
                    tracing::warn!(
                        "Payment captured for job {} in unexpected status {}",
                        job.id,
                        other
                    );
                    return Ok(None);
                }
            }
        }

        Err(ApiError::Conflict(
            "Job was modified concurrently".to_string(),
        ))
    }

    fn payment_outcome(&self, job: Job, order_id: String, resumed: bool) -> JobActionOutcome {
        let amount = job.charge_in_paise();
        JobActionOutcome {
            payment: Some(PaymentOrderDescriptor {
                order_id,
                amount,
                currency: "INR".to_string(),
                key_id: self.razorpay_key_id.clone(),
                resumed,
            }),
            job,
        }
    }

    fn publish_status_change(&self, job: &Job, old_status: JobStatus, actor: &User) {
        self.event_bus.publish(SystemEvent::JobStatusChanged {
            job_id: job.id.clone(),
            old_status,
            new_status: job.status,
            actor_id: actor.id.clone(),
            timestamp: now_rfc3339(),
        });
    }

    async fn reload(&self, job_id: &str) -> ApiResult<Job> {
        self.db
            .get_job_by_id(job_id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("Job {} vanished mid-update", job_id)))
    }
}

fn ensure_transition(job: &Job, to: JobStatus) -> ApiResult<()> {
    validate_transition(job.status, to).map_err(|e| match e {
        TransitionError::WorkAlreadyStarted => ApiError::AntiFraudBlock(e.to_string()),
        TransitionError::InvalidTransition { .. } => ApiError::InvalidState(e.to_string()),
    })
}

#[derive(Debug)]
struct StartProof {
    photo: String,
    gps_lat: f64,
    gps_lng: f64,
}

/// Validate the proof-of-work payload for START.
///
/// Missing fields are reported before range validation so the client
/// prompts the worker for proof instead of retrying blindly.
fn validate_start_proof(
    photo: Option<&str>,
    gps_lat: Option<f64>,
    gps_lng: Option<f64>,
) -> ApiResult<StartProof> {
    let photo = photo.map(str::trim).filter(|p| !p.is_empty());

    let mut missing = Vec::new();
    if photo.is_none() {
        missing.push("start_proof_photo");
    }
    if gps_lat.is_none() {
        missing.push("start_proof_gps_lat");
    }
    if gps_lng.is_none() {
        missing.push("start_proof_gps_lng");
    }

    let (photo, gps_lat, gps_lng) = match (photo, gps_lat, gps_lng) {
        (Some(photo), Some(lat), Some(lng)) => (photo, lat, lng),
        _ => {
            return Err(ApiError::MissingProof(format!(
                "Start proof is required: missing {}",
                missing.join(", ")
            )))
        }
    };

    if !gps_lat.is_finite() || !(-90.0..=90.0).contains(&gps_lat) {
        return Err(ApiError::InvalidProof(format!(
            "GPS latitude {} is outside the valid range [-90, 90]",
            gps_lat
        )));
    }

    if !gps_lng.is_finite() || !(-180.0..=180.0).contains(&gps_lng) {
        return Err(ApiError::InvalidProof(format!(
            "GPS longitude {} is outside the valid range [-180, 180]",
            gps_lng
        )));
    }

    Ok(StartProof {
        photo: photo.to_string(),
        gps_lat,
        gps_lng,
    })
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
