use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{Session, User};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};

/// Hash password using Argon2id with parameters:
/// - m_cost = 19456 KiB (19 MiB)
/// - t_cost = 2 iterations
/// - p_cost = 1 thread
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(19456) // 19 MiB
        .t_cost(2) // 2 iterations
        .p_cost(1) // 1 thread
        .build()
        .map_err(|_| ApiError::Internal("Failed to build Argon2 params".to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify password against Argon2id hash
pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;

    let argon2 = Argon2::default();

    Ok(argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate secure random token for sessions (32 bytes = 64 hex characters)
pub fn generate_session_token() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// Result of a successful authentication
#[derive(Debug)]
pub struct AuthResult {
    pub session: Session,
    pub user: User,
}

/// Authenticate a user with email and password and open a session.
pub async fn authenticate(
    db: &Database,
    email: &str,
    password: &str,
    session_duration_hours: i64,
) -> ApiResult<AuthResult> {
    let email = email.trim().to_lowercase();

    let user = db
        .get_user_by_email(&email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!("Failed login attempt for {}", email);
        return Err(ApiError::Unauthorized);
    }

    let token = generate_session_token();
    let session = Session::new(user.id.clone(), token, session_duration_hours);
    db.create_session(&session).await?;

    tracing::info!("User {} logged in", user.id);

    Ok(AuthResult { session, user })
}
