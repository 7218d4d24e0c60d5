use workdesk::database::Database;

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    use uuid::Uuid;
    let temp_file = format!("test_{}.db", Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    // Create schema manually
    setup_schema(&db).await;

    db
}

async fn setup_schema(db: &Database) {
    let pool = db.pool();

    // Create users table
    sqlx::query(
        "CREATE TABLE users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK(role IN ('CUSTOMER', 'WORKER')),
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create users table");

    sqlx::query("CREATE INDEX idx_users_email ON users(email)")
        .execute(pool)
        .await
        .ok();

    // Create sessions table
    sqlx::query(
        "CREATE TABLE sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            token TEXT UNIQUE NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create sessions table");

    // Create jobs table
    sqlx::query(
        "CREATE TABLE jobs (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL,
            worker_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL CHECK(status IN ('PENDING', 'ACCEPTED', 'IN_PROGRESS', 'COMPLETED', 'CANCELLED')) DEFAULT 'PENDING',
            charge INTEGER NOT NULL CHECK(charge > 0),
            start_proof_photo TEXT,
            start_proof_gps_lat REAL,
            start_proof_gps_lng REAL,
            started_at TEXT,
            payment_order_id TEXT UNIQUE,
            payment_status TEXT CHECK(payment_status IN ('processing', 'paid')),
            cancelled_reason TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (customer_id) REFERENCES users(id) ON DELETE RESTRICT,
            FOREIGN KEY (worker_id) REFERENCES users(id) ON DELETE RESTRICT
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create jobs table");

    sqlx::query("CREATE INDEX idx_jobs_customer ON jobs(customer_id)")
        .execute(pool)
        .await
        .ok();

    sqlx::query("CREATE INDEX idx_jobs_worker ON jobs(worker_id)")
        .execute(pool)
        .await
        .ok();

    sqlx::query("CREATE INDEX idx_jobs_payment_order ON jobs(payment_order_id)")
        .execute(pool)
        .await
        .ok();

    // Create job_logs table (append-only audit trail)
    sqlx::query(
        "CREATE TABLE job_logs (
            id TEXT PRIMARY KEY,
            job_id TEXT NOT NULL,
            from_status TEXT NOT NULL,
            to_status TEXT NOT NULL,
            action TEXT NOT NULL CHECK(action IN ('WORKER_ACCEPTED', 'WORK_STARTED', 'PAYMENT_INITIATED', 'PAYMENT_CONFIRMED', 'JOB_CANCELLED')),
            performed_by TEXT NOT NULL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            FOREIGN KEY (job_id) REFERENCES jobs(id) ON DELETE CASCADE
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create job_logs table");

    sqlx::query("CREATE INDEX idx_job_logs_job ON job_logs(job_id)")
        .execute(pool)
        .await
        .ok();
}
