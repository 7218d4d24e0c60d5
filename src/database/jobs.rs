use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{Job, JobLog, JobLogAction, JobStatus, PaymentStatus};

use sqlx::Row;

const JOB_COLUMNS: &str = "id, customer_id, worker_id, title, description, status, charge,
        start_proof_photo, start_proof_gps_lat, start_proof_gps_lng, started_at,
        payment_order_id, payment_status, cancelled_reason, created_at, updated_at, version";

impl Database {
    // Job operations
    pub async fn create_job(&self, job: &Job) -> ApiResult<()> {
        tracing::debug!(
            "Creating job for customer_id={}, worker_id={}",
            job.customer_id,
            job.worker_id
        );

        sqlx::query(
            "INSERT INTO jobs (id, customer_id, worker_id, title, description, status, charge,
                               created_at, updated_at, version)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&job.id)
        .bind(&job.customer_id)
        .bind(&job.worker_id)
        .bind(&job.title)
        .bind(job.description.as_deref())
        .bind(job.status.to_string())
        .bind(job.charge)
        .bind(&job.created_at)
        .bind(&job.updated_at)
        .bind(job.version)
        .execute(self.pool())
        .await?;

        tracing::info!("Job created: id={}, status={}", job.id, job.status);

        Ok(())
    }

    pub async fn get_job_by_id(&self, id: &str) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!("SELECT {} FROM jobs WHERE id = ?", JOB_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(|row| Self::job_from_row(&row)).transpose()
    }

    pub async fn get_job_by_payment_order_id(&self, order_id: &str) -> ApiResult<Option<Job>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM jobs WHERE payment_order_id = ?",
            JOB_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(|row| Self::job_from_row(&row)).transpose()
    }

    /// Jobs where the given user is either side of the contract.
    pub async fn list_jobs_for_user(&self, user_id: &str) -> ApiResult<Vec<Job>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM jobs
             WHERE customer_id = ? OR worker_id = ?
             ORDER BY created_at DESC",
            JOB_COLUMNS
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(Self::job_from_row).collect()
    }

    /// PENDING -> ACCEPTED. Guarded by the version the caller read, so a
    /// concurrent mutation makes this a no-op and the caller re-reads.
    pub async fn mark_job_accepted(&self, id: &str, expected_version: i64) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs
             SET status = 'ACCEPTED', updated_at = ?, version = version + 1
             WHERE id = ? AND status = 'PENDING' AND version = ?",
        )
        .bind(now_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// ACCEPTED -> IN_PROGRESS, persisting start proof atomically with the
    /// status change. `started_at` is authoritative for downstream duration
    /// computations.
    pub async fn mark_job_started(
        &self,
        id: &str,
        expected_version: i64,
        photo: &str,
        gps_lat: f64,
        gps_lng: f64,
        started_at: &str,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs
             SET status = 'IN_PROGRESS', start_proof_photo = ?, start_proof_gps_lat = ?,
                 start_proof_gps_lng = ?, started_at = ?, updated_at = ?, version = version + 1
             WHERE id = ? AND status = 'ACCEPTED' AND version = ?",
        )
        .bind(photo)
        .bind(gps_lat)
        .bind(gps_lng)
        .bind(started_at)
        .bind(now_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist a freshly created gateway order id. The `payment_order_id IS
    /// NULL` guard means at most one order id ever lands on a job; a losing
    /// concurrent COMPLETE re-reads and reuses the winner's order.
    pub async fn claim_payment_order(
        &self,
        id: &str,
        expected_version: i64,
        order_id: &str,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs
             SET payment_order_id = ?, payment_status = 'processing', updated_at = ?,
                 version = version + 1
             WHERE id = ? AND status = 'IN_PROGRESS' AND payment_order_id IS NULL AND version = ?",
        )
        .bind(order_id)
        .bind(now_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// PENDING/ACCEPTED -> CANCELLED.
    pub async fn mark_job_cancelled(
        &self,
        id: &str,
        expected_version: i64,
        reason: &str,
    ) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs
             SET status = 'CANCELLED', cancelled_reason = ?, updated_at = ?, version = version + 1
             WHERE id = ? AND status IN ('PENDING', 'ACCEPTED') AND version = ?",
        )
        .bind(reason)
        .bind(now_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// IN_PROGRESS -> COMPLETED once the gateway confirms payment capture.
    pub async fn mark_job_completed(&self, id: &str, expected_version: i64) -> ApiResult<bool> {
        let result = sqlx::query(
            "UPDATE jobs
             SET status = 'COMPLETED', payment_status = 'paid', updated_at = ?,
                 version = version + 1
             WHERE id = ? AND status = 'IN_PROGRESS' AND version = ?",
        )
        .bind(now_rfc3339())
        .bind(id)
        .bind(expected_version)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // Job log operations (append-only)
    pub async fn create_job_log(&self, log: &JobLog) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO job_logs (id, job_id, from_status, to_status, action, performed_by,
                                   metadata, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&log.id)
        .bind(&log.job_id)
        .bind(log.from_status.to_string())
        .bind(log.to_status.to_string())
        .bind(log.action.to_string())
        .bind(&log.performed_by)
        .bind(log.metadata.to_string())
        .bind(&log.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    pub async fn list_job_logs(&self, job_id: &str) -> ApiResult<Vec<JobLog>> {
        let rows = sqlx::query(
            "SELECT id, job_id, from_status, to_status, action, performed_by, metadata, created_at
             FROM job_logs
             WHERE job_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(job_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let from_status: String = row.try_get("from_status")?;
                let to_status: String = row.try_get("to_status")?;
                let action: String = row.try_get("action")?;
                let metadata: String = row.try_get("metadata")?;

                Ok(JobLog {
                    id: row.try_get("id")?,
                    job_id: row.try_get("job_id")?,
                    from_status: JobStatus::from(from_status),
                    to_status: JobStatus::from(to_status),
                    action: JobLogAction::from(action),
                    performed_by: row.try_get("performed_by")?,
                    metadata: serde_json::from_str(&metadata)
                        .unwrap_or(serde_json::Value::Null),
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    fn job_from_row(row: &sqlx::any::AnyRow) -> ApiResult<Job> {
        let status: String = row.try_get("status")?;
        let payment_status: Option<String> = row.try_get("payment_status").ok();

        Ok(Job {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            worker_id: row.try_get("worker_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description").ok(),
            status: JobStatus::from(status),
            charge: row.try_get("charge")?,
            start_proof_photo: row.try_get("start_proof_photo").ok(),
            start_proof_gps_lat: row.try_get("start_proof_gps_lat").ok(),
            start_proof_gps_lng: row.try_get("start_proof_gps_lng").ok(),
            started_at: row.try_get("started_at").ok(),
            payment_order_id: row.try_get("payment_order_id").ok(),
            payment_status: payment_status.map(PaymentStatus::from),
            cancelled_reason: row.try_get("cancelled_reason").ok(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            version: row.try_get("version")?,
        })
    }
}

fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap()
}
