use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use hospital_core::{
    Appointment, AppointmentDetail, AppointmentPayload, HospitalSummary, Validate, ValidationError,
};
use tokio_postgres::Row;
use uuid::Uuid;

use super::filter::Params;
use crate::error::AppError;

const COLUMNS: &str = "id, appt_date, user_id, hospital_id, created_at";

const DETAIL_SELECT: &str = "SELECT a.id, a.appt_date, a.user_id, a.hospital_id, a.created_at, \
     h.name AS hospital_name, h.province AS hospital_province, h.tel AS hospital_tel \
     FROM appointments a JOIN hospitals h ON h.id = a.hospital_id";

/// Which appointments a list request may see
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppointmentScope {
    /// Restrict to one user's appointments
    pub user: Option<Uuid>,
    /// Restrict to one hospital's appointments
    pub hospital: Option<Uuid>,
}

/// Repository for Appointment CRUD operations
#[derive(Clone)]
pub struct AppointmentRepository {
    pool: Pool,
}

impl AppointmentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// List appointments with their hospital, soonest first
    pub async fn list(&self, scope: AppointmentScope) -> Result<Vec<AppointmentDetail>, AppError> {
        let mut params = Params::default();
        let mut conditions = Vec::new();
        if let Some(user) = scope.user {
            conditions.push(format!("a.user_id = {}", params.push(user)));
        }
        if let Some(hospital) = scope.hospital {
            conditions.push(format!("a.hospital_id = {}", params.push(hospital)));
        }
        let filter = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!("{}{} ORDER BY a.appt_date ASC, a.id ASC", DETAIL_SELECT, filter),
                &params.as_refs(),
            )
            .await?;
        Ok(rows.iter().map(detail_from_row).collect())
    }

    /// Get an appointment and its hospital by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<AppointmentDetail>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(&format!("{} WHERE a.id = $1", DETAIL_SELECT), &[&id])
            .await?;
        Ok(row.as_ref().map(detail_from_row))
    }

    /// Book an appointment for `user` at `hospital`.
    ///
    /// Both references must exist and the user must not already hold an
    /// appointment.
    pub async fn create(
        &self,
        hospital: Uuid,
        user: Uuid,
        payload: AppointmentPayload,
    ) -> Result<Appointment, AppError> {
        let appt_date = validated_date(&payload)?;

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        if tx
            .query_opt(
                "SELECT 1 FROM hospitals WHERE id = $1 FOR SHARE",
                &[&hospital],
            )
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "No hospital with the id of {}",
                hospital
            )));
        }
        if tx
            .query_opt("SELECT 1 FROM users WHERE id = $1", &[&user])
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("No user with the id of {}", user)));
        }

        let held: i64 = tx
            .query_one(
                "SELECT COUNT(*) FROM appointments WHERE user_id = $1",
                &[&user],
            )
            .await?
            .get(0);
        if held > 0 {
            return Err(already_booked(user).into());
        }

        let row = tx
            .query_one(
                &format!(
                    "INSERT INTO appointments (id, appt_date, user_id, hospital_id) \
                     VALUES ($1, $2, $3, $4) RETURNING {}",
                    COLUMNS
                ),
                &[&Uuid::new_v4(), &appt_date, &user, &hospital],
            )
            .await
            .map_err(|err| match AppError::from(err) {
                // A concurrent booking won the unique index
                AppError::DuplicateKey(_) => AppError::from(already_booked(user)),
                other => other,
            })?;
        tx.commit().await?;

        Ok(from_row(&row))
    }

    /// Move an appointment to a new date
    pub async fn update_by_id(
        &self,
        id: Uuid,
        payload: AppointmentPayload,
    ) -> Result<Option<Appointment>, AppError> {
        let appt_date = validated_date(&payload)?;

        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                &format!(
                    "UPDATE appointments SET appt_date = $2 WHERE id = $1 RETURNING {}",
                    COLUMNS
                ),
                &[&id, &appt_date],
            )
            .await?;
        Ok(row.as_ref().map(from_row))
    }

    /// Delete an appointment. Returns false when it does not exist.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let deleted = client
            .execute("DELETE FROM appointments WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }
}

fn validated_date(payload: &AppointmentPayload) -> Result<DateTime<Utc>, ValidationError> {
    payload.validate()?;
    payload.appt_date.ok_or_else(ValidationError::new)
}

fn already_booked(user: Uuid) -> ValidationError {
    ValidationError::single(
        "user",
        format!("The user with ID {} has already made an appointment", user),
    )
}

fn from_row(row: &Row) -> Appointment {
    Appointment {
        id: row.get("id"),
        appt_date: row.get("appt_date"),
        user: row.get("user_id"),
        hospital: row.get("hospital_id"),
        created_at: row.get("created_at"),
    }
}

fn detail_from_row(row: &Row) -> AppointmentDetail {
    AppointmentDetail {
        id: row.get("id"),
        appt_date: row.get("appt_date"),
        user: row.get("user_id"),
        hospital: HospitalSummary {
            id: row.get("hospital_id"),
            name: row.get("hospital_name"),
            province: row.get("hospital_province"),
            tel: row.get("hospital_tel"),
        },
        created_at: row.get("created_at"),
    }
}
