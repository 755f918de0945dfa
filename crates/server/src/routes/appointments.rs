//! Appointment HTTP handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use deadpool_postgres::Pool;
use hospital_core::{
    ApiResponse, Appointment, AppointmentDetail, AppointmentPayload, Empty, ErrorBody,
};
use uuid::Uuid;

use super::parse_id;
use crate::db::{AppointmentRepository, AppointmentScope, HospitalRepository};
use crate::error::{AppError, json_body};
use crate::middleware::CurrentUser;

fn not_found(id: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("No appointment with the id of {}", id))
}

/// Admins may touch any appointment, everyone else only their own
fn ensure_owner(caller: &CurrentUser, appointment: &AppointmentDetail) -> Result<(), AppError> {
    if caller.is_admin() || caller.id == appointment.user {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "User {} is not authorized to access appointment {}",
            caller.id, appointment.id
        )))
    }
}

/// Non-admins only ever see their own appointments
fn scope_for(caller: &CurrentUser, hospital: Option<Uuid>) -> AppointmentScope {
    AppointmentScope {
        user: (!caller.is_admin()).then_some(caller.id),
        hospital,
    }
}

/// GET /api/v1/appointments - List the caller's appointments (all of them for admins)
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    responses(
        (status = 200, description = "Appointments with their hospital", body = Vec<AppointmentDetail>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Appointments"
)]
pub async fn list(
    State(pool): State<Pool>,
    caller: CurrentUser,
) -> Result<Json<ApiResponse<Vec<AppointmentDetail>>>, AppError> {
    let appointments = AppointmentRepository::new(pool)
        .list(scope_for(&caller, None))
        .await?;
    Ok(Json(ApiResponse::list(appointments)))
}

/// GET /api/v1/hospitals/{id}/appointments - List appointments at one hospital
#[utoipa::path(
    get,
    path = "/api/v1/hospitals/{id}/appointments",
    params(("id" = uuid::Uuid, Path, description = "Hospital ID")),
    responses(
        (status = 200, description = "Appointments at the hospital", body = Vec<AppointmentDetail>),
        (status = 404, description = "The hospital was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Appointments"
)]
pub async fn list_for_hospital(
    State(pool): State<Pool>,
    caller: CurrentUser,
    Path(hospital_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AppointmentDetail>>>, AppError> {
    let hospital_id = parse_id(&hospital_id, "Hospital")?;
    if !HospitalRepository::new(pool.clone()).exists(hospital_id).await? {
        return Err(AppError::NotFound(format!(
            "No hospital with the id of {}",
            hospital_id
        )));
    }

    let appointments = AppointmentRepository::new(pool)
        .list(scope_for(&caller, Some(hospital_id)))
        .await?;
    Ok(Json(ApiResponse::list(appointments)))
}

/// POST /api/v1/hospitals/{id}/appointments - Book an appointment
#[utoipa::path(
    post,
    path = "/api/v1/hospitals/{id}/appointments",
    params(("id" = uuid::Uuid, Path, description = "Hospital ID")),
    request_body = AppointmentPayload,
    responses(
        (status = 201, description = "The appointment was booked", body = Appointment),
        (status = 400, description = "Missing date or the user already holds an appointment", body = ErrorBody),
        (status = 404, description = "The hospital or user was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Appointments"
)]
pub async fn create(
    State(pool): State<Pool>,
    caller: CurrentUser,
    Path(hospital_id): Path<String>,
    body: Result<Json<AppointmentPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let hospital_id = parse_id(&hospital_id, "Hospital")?;
    let payload = json_body(body)?;

    // Only admins book on behalf of someone else
    let user = match payload.user {
        Some(user) if caller.is_admin() => user,
        _ => caller.id,
    };

    let appointment = AppointmentRepository::new(pool)
        .create(hospital_id, user, payload)
        .await?;

    tracing::info!(
        appointment_id = %appointment.id,
        hospital_id = %hospital_id,
        user_id = %user,
        "Appointment booked"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::data(appointment))))
}

/// GET /api/v1/appointments/{id} - Fetch one appointment (owner or admin)
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    params(("id" = uuid::Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "The appointment", body = AppointmentDetail),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "The appointment was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Appointments"
)]
pub async fn read(
    State(pool): State<Pool>,
    caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AppointmentDetail>>, AppError> {
    let id = parse_id(&id, "Appointment")?;

    let appointment = AppointmentRepository::new(pool)
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_owner(&caller, &appointment)?;

    Ok(Json(ApiResponse::data(appointment)))
}

/// PUT /api/v1/appointments/{id} - Reschedule an appointment (owner or admin)
#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    params(("id" = uuid::Uuid, Path, description = "Appointment ID")),
    request_body = AppointmentPayload,
    responses(
        (status = 200, description = "The appointment was updated", body = Appointment),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "The appointment was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Appointments"
)]
pub async fn update(
    State(pool): State<Pool>,
    caller: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<AppointmentPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let id = parse_id(&id, "Appointment")?;
    let payload = json_body(body)?;
    let repo = AppointmentRepository::new(pool);

    let current = repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    ensure_owner(&caller, &current)?;

    let appointment = repo
        .update_by_id(id, payload)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ApiResponse::data(appointment)))
}

/// DELETE /api/v1/appointments/{id} - Cancel an appointment (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/v1/appointments/{id}",
    params(("id" = uuid::Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "The appointment was deleted", body = Empty),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "The appointment was not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "Appointments"
)]
pub async fn delete(
    State(pool): State<Pool>,
    caller: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    let id = parse_id(&id, "Appointment")?;
    let repo = AppointmentRepository::new(pool);

    let current = repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    ensure_owner(&caller, &current)?;

    if !repo.delete_by_id(id).await? {
        return Err(not_found(id));
    }
    Ok(Json(ApiResponse::data(Empty {})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hospital_core::{HospitalSummary, Role};

    fn caller(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            role,
        }
    }

    fn appointment_of(user: Uuid) -> AppointmentDetail {
        AppointmentDetail {
            id: Uuid::new_v4(),
            appt_date: Utc::now(),
            user,
            hospital: HospitalSummary {
                id: Uuid::new_v4(),
                name: "H".into(),
                province: None,
                tel: None,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owners_and_admins_pass() {
        let owner = caller(Role::User);
        let admin = caller(Role::Admin);
        let stranger = caller(Role::HospitalAdmin);
        let appointment = appointment_of(owner.id);

        assert!(ensure_owner(&owner, &appointment).is_ok());
        assert!(ensure_owner(&admin, &appointment).is_ok());
        assert!(matches!(
            ensure_owner(&stranger, &appointment),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn list_scope_depends_on_role() {
        let user = caller(Role::User);
        let hospital = Uuid::new_v4();
        assert_eq!(scope_for(&user, Some(hospital)).user, Some(user.id));
        assert_eq!(scope_for(&user, Some(hospital)).hospital, Some(hospital));
        assert_eq!(scope_for(&caller(Role::Admin), None), AppointmentScope::default());
    }
}
