//! Hospital and vaccination center HTTP handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use deadpool_postgres::Pool;
use hospital_core::{
    ApiResponse, Empty, ErrorBody, HOSPITAL_FIELDS, Hospital, HospitalPayload, ListQuery,
    Pagination, VacCenter,
};
use serde_json::Value as JsonValue;

use super::parse_id;
use crate::db::{HospitalRepository, VacCenterRepository};
use crate::error::{AppError, json_body};

/// Newest first unless the client asks otherwise
const DEFAULT_SORT: &str = "-createdAt";

fn not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("Hospital not found with id of {}", id))
}

/// GET /api/v1/hospitals - Filter, sort, project and paginate hospitals
#[utoipa::path(
    get,
    path = "/api/v1/hospitals",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated fields, `-` prefix for descending"),
        ("page" = Option<u32>, Query, description = "1-based page number (default 1)"),
        ("limit" = Option<u32>, Query, description = "Page size, 1-100 (default 25)"),
        ("province" = Option<String>, Query, description = "Example filter; any field accepts `field[gt|gte|lt|lte|in]=value`"),
    ),
    responses(
        (status = 200, description = "Page of hospitals in the success envelope", body = Vec<Hospital>),
        (status = 400, description = "Unknown field, operator or value", body = ErrorBody),
    ),
    tag = "Hospitals"
)]
pub async fn list(State(pool): State<Pool>, uri: Uri) -> Result<impl IntoResponse, AppError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let query = ListQuery::parse(pairs, HOSPITAL_FIELDS, DEFAULT_SORT)?;

    let (hospitals, total) = HospitalRepository::new(pool).find_many(&query).await?;

    let data = hospitals
        .into_iter()
        .map(|hospital| serde_json::to_value(hospital).map(|item| query.project(item)))
        .collect::<Result<Vec<JsonValue>, _>>()
        .map_err(|e| AppError::Internal(format!("Failed to serialize hospital: {}", e)))?;

    let pagination = Pagination::new(query.page, total);
    Ok(Json(ApiResponse::page(data, total, pagination)))
}

/// GET /api/v1/hospitals/{id} - Fetch one hospital
#[utoipa::path(
    get,
    path = "/api/v1/hospitals/{id}",
    params(("id" = uuid::Uuid, Path, description = "Hospital ID")),
    responses(
        (status = 200, description = "The hospital", body = Hospital),
        (status = 404, description = "The hospital was not found", body = ErrorBody),
    ),
    tag = "Hospitals"
)]
pub async fn read(
    State(pool): State<Pool>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Hospital>>, AppError> {
    let id = parse_id(&id, "Hospital")?;

    match HospitalRepository::new(pool).find_by_id(id).await? {
        Some(hospital) => Ok(Json(ApiResponse::data(hospital))),
        None => Err(not_found(id)),
    }
}

/// POST /api/v1/hospitals - Create a hospital (admin)
#[utoipa::path(
    post,
    path = "/api/v1/hospitals",
    request_body = HospitalPayload,
    responses(
        (status = 201, description = "The hospital was created", body = Hospital),
        (status = 400, description = "Validation failed or duplicate name", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Caller is not an admin", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Hospitals"
)]
pub async fn create(
    State(pool): State<Pool>,
    body: Result<Json<HospitalPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let payload = json_body(body)?;
    let hospital = HospitalRepository::new(pool).create(payload).await?;

    tracing::info!(hospital_id = %hospital.id, name = %hospital.name, "Hospital created");
    Ok((StatusCode::CREATED, Json(ApiResponse::data(hospital))))
}

/// PUT /api/v1/hospitals/{id} - Update a hospital (admin)
#[utoipa::path(
    put,
    path = "/api/v1/hospitals/{id}",
    params(("id" = uuid::Uuid, Path, description = "Hospital ID")),
    request_body = HospitalPayload,
    responses(
        (status = 200, description = "The hospital was updated", body = Hospital),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "The hospital was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Hospitals"
)]
pub async fn update(
    State(pool): State<Pool>,
    Path(id): Path<String>,
    body: Result<Json<HospitalPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<Hospital>>, AppError> {
    let id = parse_id(&id, "Hospital")?;
    let payload = json_body(body)?;

    match HospitalRepository::new(pool).update_by_id(id, payload).await? {
        Some(hospital) => Ok(Json(ApiResponse::data(hospital))),
        None => Err(not_found(id)),
    }
}

/// DELETE /api/v1/hospitals/{id} - Delete a hospital and its appointments (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/hospitals/{id}",
    params(("id" = uuid::Uuid, Path, description = "Hospital ID")),
    responses(
        (status = 200, description = "The hospital was deleted", body = Empty),
        (status = 404, description = "The hospital was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Hospitals"
)]
pub async fn delete(
    State(pool): State<Pool>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    let id = parse_id(&id, "Hospital")?;

    if HospitalRepository::new(pool).delete_by_id(id).await? {
        Ok(Json(ApiResponse::data(Empty {})))
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/hospitals/vacCenters - List vaccination centers
#[utoipa::path(
    get,
    path = "/api/v1/hospitals/vacCenters",
    responses(
        (status = 200, description = "All vaccination centers", body = Vec<VacCenter>),
    ),
    tag = "Hospitals"
)]
pub async fn vac_centers(
    State(pool): State<Pool>,
) -> Result<Json<ApiResponse<Vec<VacCenter>>>, AppError> {
    let centers = VacCenterRepository::new(pool).list().await?;
    Ok(Json(ApiResponse::list(centers)))
}
