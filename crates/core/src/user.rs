use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::validation::{Validate, ValidationError, is_email, require};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[default]
    #[serde(rename = "user")]
    User,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "hospitalAdmin")]
    HospitalAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::HospitalAdmin => "hospitalAdmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "hospitalAdmin" => Ok(Self::HospitalAdmin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

/// Account record. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration body
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `user` (default), `admin` or `hospitalAdmin`
    pub role: Option<String>,
}

impl Validate for RegisterPayload {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        require(&mut errors, "name", self.name.as_deref(), "a name");
        require(&mut errors, "email", self.email.as_deref(), "an email");
        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !is_email(email.trim()) {
                errors.push("email", "Please add a valid email");
            }
        }
        require(&mut errors, "password", self.password.as_deref(), "a password");
        if let Some(password) = &self.password {
            if !password.is_empty() && password.chars().count() < MIN_PASSWORD_LEN {
                errors.push(
                    "password",
                    format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
                );
            }
        }
        if let Some(role) = &self.role {
            if let Err(message) = role.parse::<Role>() {
                errors.push("role", message);
            }
        }

        errors.into_result()
    }
}

/// Validated registration, password still in clear text
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl TryFrom<RegisterPayload> for NewUser {
    type Error = ValidationError;

    fn try_from(payload: RegisterPayload) -> Result<Self, Self::Error> {
        payload.validate()?;
        let role = match payload.role {
            Some(role) => role.parse().map_err(|m: String| ValidationError::single("role", m))?,
            None => Role::default(),
        };
        Ok(Self {
            name: payload.name.unwrap_or_default().trim().to_string(),
            email: payload.email.unwrap_or_default().trim().to_lowercase(),
            password: payload.password.unwrap_or_default(),
            role,
        })
    }
}

/// Login body
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::User, Role::Admin, Role::HospitalAdmin] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
            assert_eq!(
                serde_json::to_value(role).unwrap(),
                serde_json::json!(role.as_str())
            );
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn registration_normalizes_email_and_defaults_role() {
        let user = NewUser::try_from(RegisterPayload {
            name: Some("A".into()),
            email: Some(" A@X.com ".into()),
            password: Some("secret123".into()),
            role: None,
        })
        .unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn registration_reports_each_problem() {
        let err = NewUser::try_from(RegisterPayload {
            name: None,
            email: Some("nope".into()),
            password: Some("123".into()),
            role: Some("root".into()),
        })
        .unwrap_err();
        let fields: Vec<&str> = err.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "password", "role"]);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            name: "A".into(),
            email: "a@x.com".into(),
            password_hash: "$argon2id$...".into(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "admin");
    }
}
