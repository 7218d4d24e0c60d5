use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use workdesk::database::Database;
use workdesk::events::EventBus;
use workdesk::models::{Job, JobActionRequest, User, UserRole};
use workdesk::services::payment_gateway::{PaymentGateway, PaymentGatewayError, PaymentOrder};
use workdesk::services::JobService;

// Fixture users carry a placeholder hash; auth tests hash for real.
const PLACEHOLDER_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder";

pub async fn create_test_customer(db: &Database, email: &str) -> User {
    let user = User::new(
        email.to_string(),
        "+919876543210".to_string(),
        "Test Customer".to_string(),
        UserRole::Customer,
        PLACEHOLDER_HASH.to_string(),
    );
    db.create_user(&user).await.expect("Failed to create customer");
    user
}

pub async fn create_test_worker(db: &Database, email: &str) -> User {
    let user = User::new(
        email.to_string(),
        "+919123456780".to_string(),
        "Test Worker".to_string(),
        UserRole::Worker,
        PLACEHOLDER_HASH.to_string(),
    );
    db.create_user(&user).await.expect("Failed to create worker");
    user
}

pub async fn create_test_job(db: &Database, customer: &User, worker: &User, charge: i64) -> Job {
    let job = Job::new(
        customer.id.clone(),
        worker.id.clone(),
        "Fix leaking kitchen sink".to_string(),
        Some("Leak under the counter, needs new trap".to_string()),
        charge,
    );
    db.create_job(&job).await.expect("Failed to create job");
    job
}

/// Payment gateway test double: counts order creations, returns a fresh
/// order id per call, and can be switched into failure mode.
pub struct MockPaymentGateway {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl MockPaymentGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_order(
        &self,
        _job_id: &str,
        amount_paise: i64,
        _payer_email: &str,
        _payer_phone: &str,
    ) -> Result<PaymentOrder, PaymentGatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentGatewayError::Request(
                "gateway unavailable".to_string(),
            ));
        }

        Ok(PaymentOrder {
            id: format!("order_mock_{:04}", n),
            amount: amount_paise,
            currency: "INR".to_string(),
        })
    }
}

pub fn make_job_service(db: &Database, gateway: Arc<MockPaymentGateway>) -> JobService {
    JobService::new(
        db.clone(),
        gateway,
        EventBus::new(100),
        "rzp_test_key".to_string(),
    )
}

pub fn start_action(photo: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> JobActionRequest {
    JobActionRequest::Start {
        start_proof_photo: photo.map(str::to_string),
        start_proof_gps_lat: lat,
        start_proof_gps_lng: lng,
    }
}

/// Drive a PENDING job to IN_PROGRESS through the real lifecycle actions.
pub async fn drive_to_in_progress(service: &JobService, job: &Job, worker: &User) {
    service
        .apply_action(&job.id, worker, JobActionRequest::Accept)
        .await
        .expect("accept failed");
    service
        .apply_action(
            &job.id,
            worker,
            start_action(Some("uploads/proof.jpg"), Some(12.97), Some(77.59)),
        )
        .await
        .expect("start failed");
}
