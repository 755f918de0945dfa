pub mod appointments;
pub mod auth;
pub mod health;
pub mod hospitals;
pub mod metrics;
pub mod root;

use axum::{
    Router, middleware as axum_mw,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::{ADMIN_ONLY, authorize, protect};

/// Parse a path id. Anything that is not a UUID cannot name a record, so it is
/// reported as not found rather than as a malformed request.
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::NotFound(format!("{} not found with id of {}", resource, raw)))
}

/// Build the `/api/v1` routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/hospitals", get(hospitals::list))
        .route("/hospitals/vacCenters", get(hospitals::vac_centers))
        .route("/hospitals/{id}", get(hospitals::read))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", get(auth::logout));

    // route_layer runs the last-added layer first: protect, then authorize
    let admin = Router::new()
        .route("/hospitals", post(hospitals::create))
        .route(
            "/hospitals/{id}",
            put(hospitals::update).delete(hospitals::delete),
        )
        .route_layer(axum_mw::from_fn_with_state(ADMIN_ONLY, authorize))
        .route_layer(axum_mw::from_fn_with_state(state.clone(), protect));

    let signed_in = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/hospitals/{id}/appointments",
            get(appointments::list_for_hospital).post(appointments::create),
        )
        .route("/appointments", get(appointments::list))
        .route(
            "/appointments/{id}",
            get(appointments::read)
                .put(appointments::update)
                .delete(appointments::delete),
        )
        .route_layer(axum_mw::from_fn_with_state(state, protect));

    Router::new().merge(public).merge(admin).merge(signed_in)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_uuid_ids_are_not_found() {
        let err = parse_id("abc", "Hospital").unwrap_err();
        assert!(matches!(
            err,
            AppError::NotFound(ref m) if m == "Hospital not found with id of abc"
        ));
    }

    #[test]
    fn uuid_ids_parse() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Hospital").unwrap(), id);
    }
}
