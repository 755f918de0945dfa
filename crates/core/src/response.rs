//! JSON envelopes shared by every endpoint

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pagination::Pagination;
use crate::validation::{FieldIssue, ValidationError};

/// Success envelope: `{success: true, data, count?, total?, pagination?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            count: None,
            total: None,
            pagination: None,
            data,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Unpaged list
    pub fn list(data: Vec<T>) -> Self {
        Self {
            count: Some(data.len()),
            ..Self::data(data)
        }
    }

    /// One page of a larger result set
    pub fn page(data: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            total: Some(total),
            pagination: Some(pagination),
            ..Self::list(data)
        }
    }
}

/// Serializes as `{}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Empty {}

/// Body returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

impl TokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            success: true,
            token,
        }
    }
}

/// Failure envelope: `{success: false, error, errors?}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    /// Per-field problems, present for validation failures
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldIssue>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            errors: Vec::new(),
        }
    }
}

impl From<ValidationError> for ErrorBody {
    fn from(err: ValidationError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            errors: err.issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageRef;

    #[test]
    fn envelopes_skip_absent_metadata() {
        let json = serde_json::to_value(ApiResponse::data(Empty {})).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": {}}));

        let pagination = Pagination {
            next: Some(PageRef { page: 2, limit: 1 }),
            prev: None,
        };
        let json = serde_json::to_value(ApiResponse::page(vec![1], 3, pagination)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "count": 1,
                "total": 3,
                "pagination": {"next": {"page": 2, "limit": 1}},
                "data": [1]
            })
        );
    }

    #[test]
    fn validation_errors_list_fields() {
        let body = ErrorBody::from(ValidationError::single("name", "Please add a name"));
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Please add a name");
        assert_eq!(json["errors"][0]["field"], "name");
    }
}
