use workdesk::models::{JobActionRequest, JobStatus};
use workdesk::ApiError;

mod helpers;
use helpers::*;

#[tokio::test]
async fn test_customer_cannot_accept() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let service = make_job_service(&db, MockPaymentGateway::new());

    let err = service
        .apply_action(&job.id, &customer, JobActionRequest::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_other_worker_cannot_accept() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let other_worker = create_test_worker(&db, "other.worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let service = make_job_service(&db, MockPaymentGateway::new());

    let err = service
        .apply_action(&job.id, &other_worker, JobActionRequest::Accept)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // The job is untouched and the assigned worker can still accept.
    let outcome = service
        .apply_action(&job.id, &worker, JobActionRequest::Accept)
        .await
        .unwrap();
    assert_eq!(outcome.job.status, JobStatus::Accepted);
}

#[tokio::test]
async fn test_customer_cannot_start() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let service = make_job_service(&db, MockPaymentGateway::new());
    service
        .apply_action(&job.id, &worker, JobActionRequest::Accept)
        .await
        .unwrap();

    let err = service
        .apply_action(
            &job.id,
            &customer,
            start_action(Some("uploads/p.jpg"), Some(12.9), Some(77.6)),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_worker_cannot_complete() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let gateway = MockPaymentGateway::new();
    let service = make_job_service(&db, gateway.clone());
    drive_to_in_progress(&service, &job, &worker).await;

    let err = service
        .apply_action(&job.id, &worker, JobActionRequest::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_other_customer_cannot_complete() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let other_customer = create_test_customer(&db, "other.customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let gateway = MockPaymentGateway::new();
    let service = make_job_service(&db, gateway.clone());
    drive_to_in_progress(&service, &job, &worker).await;

    let err = service
        .apply_action(&job.id, &other_customer, JobActionRequest::Complete)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn test_unrelated_user_cannot_cancel() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let outsider = create_test_customer(&db, "outsider@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let service = make_job_service(&db, MockPaymentGateway::new());

    let err = service
        .apply_action(&job.id, &outsider, JobActionRequest::Cancel { reason: None })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let current = db.get_job_by_id(&job.id).await.unwrap().unwrap();
    assert_eq!(current.status, JobStatus::Pending);
}

#[tokio::test]
async fn test_customer_may_cancel_pending_job() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let service = make_job_service(&db, MockPaymentGateway::new());

    let outcome = service
        .apply_action(&job.id, &customer, JobActionRequest::Cancel { reason: None })
        .await
        .unwrap();
    assert_eq!(outcome.job.status, JobStatus::Cancelled);
}

#[tokio::test]
async fn test_rejected_action_leaves_no_audit_row() {
    let db = setup_test_db().await;
    let customer = create_test_customer(&db, "customer@example.com").await;
    let worker = create_test_worker(&db, "worker@example.com").await;
    let job = create_test_job(&db, &customer, &worker, 500).await;

    let service = make_job_service(&db, MockPaymentGateway::new());

    service
        .apply_action(&job.id, &customer, JobActionRequest::Accept)
        .await
        .unwrap_err();
    service
        .apply_action(&job.id, &customer, JobActionRequest::Complete)
        .await
        .unwrap_err();

    let logs = db.list_job_logs(&job.id).await.unwrap();
    assert!(logs.is_empty());
}
