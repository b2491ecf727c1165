//! Company self-management: profile and booking policy, staff, promotions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use cobalt_db::{
    CompanyRow, CompanyUpdate, MasterRow, MasterUpdate, NewMaster, NewPromotion, PromotionRow,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{default_id, map_db_error, rows_or_empty, ApiError, AppState, MessageBody, OrEmpty};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CompanyQuery {
    #[serde(default = "default_id")]
    company_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateCompanyRequest {
    #[serde(default = "default_id")]
    company_id: i64,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    description: Option<String>,
    settings: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateMasterRequest {
    #[serde(default = "default_id")]
    company_id: i64,
    service_id: Option<i64>,
    name: Option<String>,
    photo: Option<String>,
    specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateMasterRequest {
    service_id: Option<i64>,
    name: Option<String>,
    photo: Option<String>,
    specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatePromotionRequest {
    #[serde(default = "default_id")]
    company_id: i64,
    #[serde(rename = "type")]
    promo_type: Option<String>,
    description: Option<String>,
    discount: Option<f64>,
    conditions: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct MastersBody {
    masters: Vec<MasterRow>,
}

#[derive(Debug, Serialize)]
pub(super) struct PromotionsBody {
    promotions: Vec<PromotionRow>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// GET /api/companies/settings?company_id=
pub(super) async fn get_settings(
    State(state): State<AppState>,
    Query(params): Query<CompanyQuery>,
) -> Json<OrEmpty<CompanyRow>> {
    let company = cobalt_db::get_company(&state.pool, params.company_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, company_id = params.company_id, "company lookup failed");
            None
        });
    Json(company.into())
}

/// PUT /api/companies/settings
///
/// `settings` keys are merged into the stored policy object.
pub(super) async fn update_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyRow>, ApiError> {
    let rid = &req_id.0;
    if body.settings.as_ref().is_some_and(|s| !s.is_object()) {
        return Err(ApiError::validation(rid, "settings must be a JSON object"));
    }

    let update = CompanyUpdate {
        name: body.name.as_deref(),
        email: body.email.as_deref(),
        phone: body.phone.as_deref(),
        address: body.address.as_deref(),
        description: body.description.as_deref(),
        settings: body.settings,
    };
    let company = cobalt_db::update_company_settings(&state.pool, body.company_id, update)
        .await
        .map_err(|e| map_db_error(rid, &e))?;
    Ok(Json(company))
}

// ---------------------------------------------------------------------------
// Masters
// ---------------------------------------------------------------------------

/// GET /api/companies/masters?company_id=
pub(super) async fn list_masters(
    State(state): State<AppState>,
    Query(params): Query<CompanyQuery>,
) -> Json<MastersBody> {
    let masters = rows_or_empty(
        cobalt_db::list_company_masters(&state.pool, params.company_id).await,
        "company masters",
    );
    Json(MastersBody { masters })
}

/// POST /api/companies/masters
pub(super) async fn create_master(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateMasterRequest>,
) -> Result<(StatusCode, Json<MasterRow>), ApiError> {
    let rid = &req_id.0;
    let Some(name) = non_blank(body.name.as_deref()) else {
        return Err(ApiError::validation(rid, "name is required"));
    };

    let master = cobalt_db::create_master(
        &state.pool,
        NewMaster {
            company_id: body.company_id,
            service_id: body.service_id,
            name,
            photo: body.photo.as_deref(),
            specialization: body.specialization.as_deref(),
        },
    )
    .await
    .map_err(|e| map_db_error(rid, &e))?;
    Ok((StatusCode::CREATED, Json(master)))
}

/// PUT /api/companies/masters/{id}
pub(super) async fn update_master(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(master_id): Path<i64>,
    Json(body): Json<UpdateMasterRequest>,
) -> Result<Json<MasterRow>, ApiError> {
    let update = MasterUpdate {
        service_id: body.service_id,
        name: non_blank(body.name.as_deref()),
        photo: body.photo.as_deref(),
        specialization: body.specialization.as_deref(),
    };
    let master = cobalt_db::update_master(&state.pool, master_id, update)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(master))
}

/// DELETE /api/companies/masters/{id}
pub(super) async fn delete_master(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(master_id): Path<i64>,
) -> Result<Json<MessageBody>, ApiError> {
    cobalt_db::delete_master(&state.pool, master_id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(MessageBody {
        message: "Master deleted",
    }))
}

// ---------------------------------------------------------------------------
// Promotions
// ---------------------------------------------------------------------------

/// GET /api/companies/promotions?company_id=
pub(super) async fn list_promotions(
    State(state): State<AppState>,
    Query(params): Query<CompanyQuery>,
) -> Json<PromotionsBody> {
    let promotions = rows_or_empty(
        cobalt_db::list_company_promotions(&state.pool, params.company_id).await,
        "promotions",
    );
    Json(PromotionsBody { promotions })
}

/// POST /api/companies/promotions
pub(super) async fn create_promotion(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreatePromotionRequest>,
) -> Result<(StatusCode, Json<PromotionRow>), ApiError> {
    let rid = &req_id.0;
    let Some(promo_type) = non_blank(body.promo_type.as_deref()) else {
        return Err(ApiError::validation(rid, "type is required"));
    };
    let conditions = body
        .conditions
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

    let promotion = cobalt_db::create_promotion(
        &state.pool,
        NewPromotion {
            company_id: body.company_id,
            promo_type,
            description: body.description.as_deref(),
            discount: body.discount,
            conditions,
        },
    )
    .await
    .map_err(|e| map_db_error(rid, &e))?;
    Ok((StatusCode::CREATED, Json(promotion)))
}

/// DELETE /api/companies/promotions/{id}
pub(super) async fn delete_promotion(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(promotion_id): Path<i64>,
) -> Result<Json<MessageBody>, ApiError> {
    cobalt_db::delete_promotion(&state.pool, promotion_id)
        .await
        .map_err(|e| map_db_error(&req_id.0, &e))?;
    Ok(Json(MessageBody {
        message: "Promotion deleted",
    }))
}
