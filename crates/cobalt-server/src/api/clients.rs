//! Client profile and company blacklist routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use cobalt_db::{BlacklistRow, UserRow, UserSettingsUpdate};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{default_id, map_db_error, ApiError, AppState, MessageBody, OrEmpty};

#[derive(Debug, Deserialize)]
pub(super) struct UserQuery {
    #[serde(default = "default_id")]
    user_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct ClientQuery {
    #[serde(default = "default_id")]
    client_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateSettingsRequest {
    #[serde(default = "default_id")]
    user_id: i64,
    full_name: Option<String>,
    email: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BlacklistRequest {
    #[serde(default = "default_id")]
    client_id: i64,
    company_id: Option<i64>,
}

/// GET /api/clients/settings?user_id=
pub(super) async fn get_settings(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Json<OrEmpty<UserRow>> {
    let user = cobalt_db::get_user(&state.pool, params.user_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, user_id = params.user_id, "client settings lookup failed");
            None
        });
    Json(user.into())
}

/// PUT /api/clients/settings
pub(super) async fn update_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<UserRow>, ApiError> {
    let update = UserSettingsUpdate {
        full_name: body.full_name.as_deref(),
        email: body.email.as_deref(),
        address: body.address.as_deref(),
    };
    let user = cobalt_db::update_user_settings(&state.pool, body.user_id, update)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(user))
}

/// POST /api/clients/blacklist
pub(super) async fn add_to_blacklist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<BlacklistRequest>,
) -> Result<(StatusCode, Json<BlacklistRow>), ApiError> {
    let rid = &req_id.0;
    let Some(company_id) = body.company_id else {
        return Err(ApiError::validation(rid, "company_id is required"));
    };
    let row = cobalt_db::add_to_blacklist(&state.pool, body.client_id, company_id)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// DELETE /api/clients/blacklist/{company_id}?client_id=
pub(super) async fn remove_from_blacklist(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(company_id): Path<i64>,
    Query(params): Query<ClientQuery>,
) -> Result<Json<MessageBody>, ApiError> {
    cobalt_db::remove_from_blacklist(&state.pool, params.client_id, company_id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(MessageBody {
        message: "Removed from blacklist",
    }))
}
