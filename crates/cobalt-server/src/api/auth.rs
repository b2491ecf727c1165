//! Account registration and login.

use axum::{extract::State, http::StatusCode, Extension, Json};
use cobalt_core::validators::{
    hash_password, is_valid_email, is_valid_phone, validate_password, UserType,
};
use cobalt_db::UserRow;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Deserialize)]
pub(super) struct CredentialsRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default = "default_user_type")]
    user_type: String,
}

fn default_user_type() -> String {
    UserType::Client.as_str().to_string()
}

#[derive(Debug, Serialize)]
pub(super) struct AuthUser {
    id: i64,
    email: String,
    user_type: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AuthResponse {
    token: String,
    user: AuthUser,
}

impl AuthResponse {
    fn issue(user: UserRow) -> Self {
        Self {
            token: new_token(),
            user: AuthUser {
                id: user.id,
                email: user.email,
                user_type: user.user_type,
            },
        }
    }
}

/// Opaque session token: 32 random bytes, hex-encoded.
fn new_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// POST /api/auth/register
pub(super) async fn register(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let rid = &req_id.0;
    let identifier = body.email.trim();

    if identifier.is_empty() {
        return Err(ApiError::validation(rid, "Email or phone is required"));
    }
    if !(is_valid_email(identifier) || is_valid_phone(identifier)) {
        return Err(ApiError::validation(rid, "Invalid email or phone format"));
    }
    validate_password(&body.password).map_err(|msg| ApiError::validation(rid, msg))?;
    let Some(user_type) = UserType::parse(&body.user_type) else {
        return Err(ApiError::validation(rid, "Invalid user type"));
    };

    let existing = cobalt_db::get_user_by_email(&state.pool, identifier)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    if existing.is_some() {
        return Err(ApiError::validation(rid, "User already exists"));
    }

    let user = cobalt_db::create_user(
        &state.pool,
        identifier,
        &hash_password(&body.password),
        user_type.as_str(),
    )
    .await
    .map_err(|e| {
        // A concurrent registration can still lose the race on the unique index.
        if e.is_unique_violation() {
            ApiError::validation(rid, "User already exists")
        } else {
            map_db_error(rid, &e)
        }
    })?;

    if user_type == UserType::Company {
        if let Err(e) = cobalt_db::create_company(&state.pool, user.id, identifier).await {
            tracing::error!(error = %e, user_id = user.id, "failed to create company row");
        }
    }

    tracing::info!(user_id = user.id, user_type = user_type.as_str(), "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse::issue(user))))
}

/// POST /api/auth/login
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let rid = &req_id.0;
    let identifier = body.email.trim();

    if identifier.is_empty() || body.password.is_empty() {
        return Err(ApiError::validation(rid, "Email and password are required"));
    }

    let user = cobalt_db::get_user_by_email(&state.pool, identifier)
        .await
        .map_err(|e| map_db_error(rid, &e))?
        .ok_or_else(|| ApiError::new(rid, "unauthorized", "Invalid email or password"))?;

    let supplied = hash_password(&body.password);
    if !bool::from(supplied.as_bytes().ct_eq(user.password_hash.as_bytes())) {
        return Err(ApiError::new(rid, "unauthorized", "Invalid email or password"));
    }
    if user.user_type != body.user_type {
        return Err(ApiError::new(rid, "unauthorized", "Invalid user type"));
    }

    Ok(Json(AuthResponse::issue(user)))
}
