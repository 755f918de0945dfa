use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::query::{FieldKind, FieldSpec};
use crate::validation::{Validate, ValidationError, is_phone, is_postal_code, require};

/// Longest hospital name accepted
pub const MAX_NAME_LEN: usize = 50;

/// Hospital record as stored and returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,
    /// Display number
    pub ordinal: Option<i32>,
    pub name: String,
    /// House number, street and road
    pub address: String,
    pub district: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    /// 5-digit postal code
    pub postalcode: Option<String>,
    pub tel: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields clients may filter, sort and select hospitals by
pub const HOSPITAL_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "name", FieldKind::Text),
    FieldSpec::new("address", "address", FieldKind::Text),
    FieldSpec::new("district", "district", FieldKind::Text),
    FieldSpec::new("province", "province", FieldKind::Text),
    FieldSpec::new("region", "region", FieldKind::Text),
    FieldSpec::new("postalcode", "postalcode", FieldKind::Text),
    FieldSpec::new("tel", "tel", FieldKind::Text),
    FieldSpec::new("ordinal", "ordinal", FieldKind::Integer),
    FieldSpec::new("createdAt", "created_at", FieldKind::Timestamp),
];

/// Create or update body. Every field is optional so the same type serves
/// partial updates; creation enforces the required ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HospitalPayload {
    pub ordinal: Option<i32>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub postalcode: Option<String>,
    pub tel: Option<String>,
}

impl HospitalPayload {
    /// Fill every absent field from the current record
    pub fn merged_over(self, current: &Hospital) -> Self {
        Self {
            ordinal: self.ordinal.or(current.ordinal),
            name: self.name.or_else(|| Some(current.name.clone())),
            address: self.address.or_else(|| Some(current.address.clone())),
            district: self.district.or_else(|| current.district.clone()),
            province: self.province.or_else(|| current.province.clone()),
            region: self.region.or_else(|| current.region.clone()),
            postalcode: self.postalcode.or_else(|| current.postalcode.clone()),
            tel: self.tel.or_else(|| current.tel.clone()),
        }
    }
}

impl Validate for HospitalPayload {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        require(&mut errors, "name", self.name.as_deref(), "a name");
        if let Some(name) = &self.name {
            if name.trim().chars().count() > MAX_NAME_LEN {
                errors.push(
                    "name",
                    format!("Name can not be more than {} characters", MAX_NAME_LEN),
                );
            }
        }
        require(&mut errors, "address", self.address.as_deref(), "an address");

        if let Some(code) = &self.postalcode {
            if !is_postal_code(code.trim()) {
                errors.push("postalcode", "Postal code must be exactly 5 digits");
            }
        }
        if let Some(tel) = &self.tel {
            if !is_phone(tel.trim()) {
                errors.push("tel", "Please add a valid telephone number");
            }
        }
        if let Some(ordinal) = self.ordinal {
            if ordinal < 0 {
                errors.push("ordinal", "Ordinal number can not be negative");
            }
        }

        errors.into_result()
    }
}

/// Validated, trimmed hospital columns ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct HospitalFields {
    pub ordinal: Option<i32>,
    pub name: String,
    pub address: String,
    pub district: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub postalcode: Option<String>,
    pub tel: Option<String>,
}

impl TryFrom<HospitalPayload> for HospitalFields {
    type Error = ValidationError;

    fn try_from(payload: HospitalPayload) -> Result<Self, Self::Error> {
        payload.validate()?;
        Ok(Self {
            ordinal: payload.ordinal,
            name: trimmed(payload.name).unwrap_or_default(),
            address: trimmed(payload.address).unwrap_or_default(),
            district: trimmed(payload.district),
            province: trimmed(payload.province),
            region: trimmed(payload.region),
            postalcode: trimmed(payload.postalcode),
            tel: trimmed(payload.tel),
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Vaccination center, a read-only projection of the hospitals table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VacCenter {
    pub id: Uuid,
    pub name: String,
    pub tel: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
}
