//! OpenAPI document for every documented route, served at `/api-docs/openapi.json`

use axum::{Json, Router, routing::get};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;
use crate::routes::root::ServiceInfo;

/// Registers the JWT bearer scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from /api/v1/auth/login, sent as `Authorization: Bearer <token>` or the `token` cookie.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hospital API",
        description = "Hospitals, vaccination centers, appointments and user accounts.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::root::get,
        crate::routes::hospitals::list,
        crate::routes::hospitals::read,
        crate::routes::hospitals::create,
        crate::routes::hospitals::update,
        crate::routes::hospitals::delete,
        crate::routes::hospitals::vac_centers,
        crate::routes::appointments::list,
        crate::routes::appointments::list_for_hospital,
        crate::routes::appointments::create,
        crate::routes::appointments::read,
        crate::routes::appointments::update,
        crate::routes::appointments::delete,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::logout,
    ),
    components(schemas(
        hospital_core::Hospital,
        hospital_core::HospitalPayload,
        hospital_core::VacCenter,
        hospital_core::Appointment,
        hospital_core::AppointmentDetail,
        hospital_core::AppointmentPayload,
        hospital_core::HospitalSummary,
        hospital_core::User,
        hospital_core::Role,
        hospital_core::RegisterPayload,
        hospital_core::LoginPayload,
        hospital_core::TokenResponse,
        hospital_core::Pagination,
        hospital_core::PageRef,
        hospital_core::ErrorBody,
        hospital_core::FieldIssue,
        hospital_core::Empty,
        ServiceInfo,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Hospitals", description = "Hospital directory and vaccination centers"),
        (name = "Appointments", description = "Booking and managing appointments"),
        (name = "Auth", description = "Registration, login and session"),
        (name = "Service", description = "Service information"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_resource() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/v1/hospitals",
            "/api/v1/hospitals/{id}",
            "/api/v1/hospitals/vacCenters",
            "/api/v1/hospitals/{id}/appointments",
            "/api/v1/appointments",
            "/api/v1/appointments/{id}",
            "/api/v1/auth/login",
            "/api/v1/auth/me",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
