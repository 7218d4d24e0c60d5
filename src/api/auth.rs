use crate::{
    api::middleware::{ApiResult, AppState, AuthenticatedUser},
    models::{LoginRequest, LoginResponse, UserResponse},
    services::auth,
};
use axum::{extract::State, http::StatusCode, Json};

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    // Delegate to auth service
    let auth_result = auth::authenticate(
        &state.db,
        &request.email,
        &request.password,
        state.session_duration_hours,
    )
    .await?;

    Ok(Json(LoginResponse {
        token: auth_result.session.token,
        expires_at: auth_result.session.expires_at,
        user: UserResponse::from(auth_result.user),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<StatusCode> {
    // Delete the session using the token from the authenticated user
    state.db.delete_session(&auth_user.token).await?;

    Ok(StatusCode::NO_CONTENT)
}
