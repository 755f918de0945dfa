//! Service banner at `/`

use axum::Json;
use hospital_core::ApiResponse;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

/// GET / - Name and version of the running service
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service name and version", body = ServiceInfo)),
    tag = "Service"
)]
pub async fn get() -> Json<ApiResponse<ServiceInfo>> {
    Json(ApiResponse::data(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
