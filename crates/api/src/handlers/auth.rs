//! Handlers for the `/auth` resource (login, logout, current user).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderName, StatusCode};
use axum::Json;
use renotracker_core::error::CoreError;
use renotracker_db::models::user::UserResponse;
use renotracker_db::repositories::{ProjectRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response. The same token is also set as the session cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Sets the `reno_session` cookie and
/// selects the newest open project if the user has no active project yet.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<([(HeaderName, String); 1], Json<DataResponse<LoginResponse>>)> {
    let mut user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    if user.active_project_id.is_none() {
        if let Some(project) = ProjectRepo::latest_active(&state.pool).await? {
            if let Some(updated) =
                UserRepo::set_active_project(&state.pool, user.id, Some(project.id)).await?
            {
                user = updated;
            }
        }
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let cookie = session_cookie(&access_token, jwt.expiry_secs(), state.config.cookie_secure);

    tracing::info!(user_id = user.id, "User logged in");

    Ok((
        [(SET_COOKIE, cookie)],
        Json(DataResponse {
            data: LoginResponse {
                access_token,
                expires_in: jwt.expiry_secs(),
                user: UserResponse::from(&user),
            },
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Clears the session cookie. Tokens are stateless, so a copied Bearer token
/// stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> ([(HeaderName, String); 1], StatusCode) {
    (
        [(SET_COOKIE, clear_session_cookie(state.config.cookie_secure))],
        StatusCode::NO_CONTENT,
    )
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
