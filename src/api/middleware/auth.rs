use crate::{
    api::middleware::error::ApiError, database::Database, events::EventBus, models::User,
    services::JobService,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub event_bus: EventBus,
    pub job_service: JobService,
    pub session_duration_hours: i64,
    pub payment_webhook_secret: String,
}

/// Resolved request identity. The resolved user is passed down explicitly as
/// a parameter; handlers and services never reach for ambient auth state.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

/// Extract and validate the bearer session token from the Authorization
/// header, resolving it to a user via the session store.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = if let Some(auth_value) = auth_header {
        if let Some(token) = auth_value.strip_prefix("Bearer ") {
            token
        } else {
            return Err(ApiError::Unauthorized);
        }
    } else {
        return Err(ApiError::Unauthorized);
    };

    // Validate session
    let session = state
        .db
        .get_session_by_token(token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if session.is_expired() {
        // Delete expired session
        state.db.delete_session(token).await.ok();
        return Err(ApiError::Unauthorized);
    }

    // Resolve the user behind the session
    let user = state
        .db
        .get_user_by_id(&session.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token_owned = token.to_string();

    request.extensions_mut().insert(AuthenticatedUser {
        user,
        token: token_owned,
    });

    Ok(next.run(request).await)
}
