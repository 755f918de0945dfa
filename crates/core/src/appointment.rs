use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::{Validate, ValidationError};

/// Appointment as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub appt_date: DateTime<Utc>,
    /// Id of the user holding the appointment
    pub user: Uuid,
    /// Id of the hospital the appointment is booked at
    pub hospital: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Hospital fields embedded in appointment reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HospitalSummary {
    pub id: Uuid,
    pub name: String,
    pub province: Option<String>,
    pub tel: Option<String>,
}

/// Appointment with its hospital resolved, returned by read endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    pub id: Uuid,
    pub appt_date: DateTime<Utc>,
    pub user: Uuid,
    pub hospital: HospitalSummary,
    pub created_at: DateTime<Utc>,
}

/// Create or update body
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub appt_date: Option<DateTime<Utc>>,
    /// Only honoured for admins booking on behalf of another user
    pub user: Option<Uuid>,
}

impl Validate for AppointmentPayload {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.appt_date.is_none() {
            return Err(ValidationError::single(
                "apptDate",
                "Please add an appointment date",
            ));
        }
        Ok(())
    }
}
