//! Favorite services of a client.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use cobalt_db::FavoriteRow;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{default_id, map_db_error, rows_or_empty, ApiError, AppState, MessageBody};

#[derive(Debug, Deserialize)]
pub(super) struct ClientQuery {
    #[serde(default = "default_id")]
    client_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddFavoriteRequest {
    #[serde(default = "default_id")]
    client_id: i64,
    service_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoritesBody {
    favorites: Vec<FavoriteRow>,
}

/// GET /api/favorites?client_id=
pub(super) async fn list_favorites(
    State(state): State<AppState>,
    Query(params): Query<ClientQuery>,
) -> Json<FavoritesBody> {
    let favorites = rows_or_empty(
        cobalt_db::list_favorites(&state.pool, params.client_id).await,
        "favorites",
    );
    Json(FavoritesBody { favorites })
}

/// POST /api/favorites
///
/// Adding the same service twice is a 409.
pub(super) async fn add_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteRow>), ApiError> {
    let rid = &req_id.0;
    let Some(service_id) = body.service_id.filter(|id| *id != 0) else {
        return Err(ApiError::validation(rid, "service_id is required"));
    };
    let favorite = cobalt_db::add_favorite(&state.pool, body.client_id, service_id)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

/// DELETE /api/favorites/{service_id}?client_id=
pub(super) async fn remove_favorite(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(service_id): Path<i64>,
    Query(params): Query<ClientQuery>,
) -> Result<Json<MessageBody>, ApiError> {
    cobalt_db::remove_favorite(&state.pool, params.client_id, service_id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(MessageBody {
        message: "Removed from favorites",
    }))
}
