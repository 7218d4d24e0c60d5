use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "PENDING"),
            JobStatus::Accepted => write!(f, "ACCEPTED"),
            JobStatus::InProgress => write!(f, "IN_PROGRESS"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// Convert from string (for SQLx)
impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ACCEPTED" => JobStatus::Accepted,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "CANCELLED" => JobStatus::Cancelled,
            _ => JobStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Processing,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Processing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub customer_id: String,
    pub worker_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: JobStatus,
    /// Agreed price in whole rupees, fixed at creation.
    pub charge: i64,
    pub start_proof_photo: Option<String>,
    pub start_proof_gps_lat: Option<f64>,
    pub start_proof_gps_lng: Option<f64>,
    pub started_at: Option<String>, // ISO8601 string from DB
    pub payment_order_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub cancelled_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i64,
}

impl Job {
    pub fn new(
        customer_id: String,
        worker_id: String,
        title: String,
        description: Option<String>,
        charge: i64,
    ) -> Self {
        let now = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap();

        Self {
            id: Uuid::new_v4().to_string(),
            customer_id,
            worker_id,
            title,
            description,
            status: JobStatus::Pending,
            charge,
            start_proof_photo: None,
            start_proof_gps_lat: None,
            start_proof_gps_lng: None,
            started_at: None,
            payment_order_id: None,
            payment_status: None,
            cancelled_reason: None,
            created_at: now.clone(),
            updated_at: now,
            version: 1,
        }
    }

    /// Payment amount in the gateway's minor unit (paise).
    pub fn charge_in_paise(&self) -> i64 {
        self.charge * 100
    }
}

/// Lifecycle action, parsed from the PATCH body. Tagged on the `action`
/// field; unknown tags are rejected at the deserialization boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action")]
pub enum JobActionRequest {
    #[serde(rename = "ACCEPT")]
    Accept,
    #[serde(rename = "START")]
    Start {
        start_proof_photo: Option<String>,
        start_proof_gps_lat: Option<f64>,
        start_proof_gps_lng: Option<f64>,
    },
    #[serde(rename = "COMPLETE")]
    Complete,
    #[serde(rename = "CANCEL")]
    Cancel { reason: Option<String> },
}

impl JobActionRequest {
    pub fn name(&self) -> &'static str {
        match self {
            JobActionRequest::Accept => "ACCEPT",
            JobActionRequest::Start { .. } => "START",
            JobActionRequest::Complete => "COMPLETE",
            JobActionRequest::Cancel { .. } => "CANCEL",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobRequest {
    pub worker_id: String,
    pub title: String,
    pub description: Option<String>,
    pub charge: i64,
}

/// Descriptor the client relays to the checkout flow after COMPLETE.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOrderDescriptor {
    pub order_id: String,
    /// Amount in paise.
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    #[serde(skip)]
    pub resumed: bool,
}

/// Result of a successfully applied lifecycle action.
#[derive(Debug, Clone)]
pub struct JobActionOutcome {
    pub job: Job,
    pub payment: Option<PaymentOrderDescriptor>,
}
