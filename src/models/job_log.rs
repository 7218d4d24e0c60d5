use crate::models::job::JobStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Discriminator for audit log entries. One row is appended per successful
/// state-changing or side-effecting action; rows are never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobLogAction {
    WorkerAccepted,
    WorkStarted,
    PaymentInitiated,
    PaymentConfirmed,
    JobCancelled,
}

impl fmt::Display for JobLogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobLogAction::WorkerAccepted => write!(f, "WORKER_ACCEPTED"),
            JobLogAction::WorkStarted => write!(f, "WORK_STARTED"),
            JobLogAction::PaymentInitiated => write!(f, "PAYMENT_INITIATED"),
            JobLogAction::PaymentConfirmed => write!(f, "PAYMENT_CONFIRMED"),
            JobLogAction::JobCancelled => write!(f, "JOB_CANCELLED"),
        }
    }
}

impl From<String> for JobLogAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "WORK_STARTED" => JobLogAction::WorkStarted,
            "PAYMENT_INITIATED" => JobLogAction::PaymentInitiated,
            "PAYMENT_CONFIRMED" => JobLogAction::PaymentConfirmed,
            "JOB_CANCELLED" => JobLogAction::JobCancelled,
            _ => JobLogAction::WorkerAccepted,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobLog {
    pub id: String,
    pub job_id: String,
    pub from_status: JobStatus,
    pub to_status: JobStatus,
    pub action: JobLogAction,
    pub performed_by: String,
    pub metadata: serde_json::Value,
    pub created_at: String,
}

impl JobLog {
    pub fn new(
        job_id: String,
        from_status: JobStatus,
        to_status: JobStatus,
        action: JobLogAction,
        performed_by: String,
        metadata: serde_json::Value,
    ) -> Self {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        Self {
            id: Uuid::new_v4().to_string(),
            job_id,
            from_status,
            to_status,
            action,
            performed_by,
            metadata,
            created_at: now,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobLogListResponse {
    pub logs: Vec<JobLog>,
}
