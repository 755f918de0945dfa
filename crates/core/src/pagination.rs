use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::ValidationError;

pub const DEFAULT_LIMIT: u32 = 25;
pub const MAX_LIMIT: u32 = 100;

/// Requested page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, ValidationError> {
        let mut errors = ValidationError::new();
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            errors.push("page", "'page' must be at least 1");
        }
        if limit == 0 || limit > MAX_LIMIT {
            errors.push("limit", format!("'limit' must be between 1 and {}", MAX_LIMIT));
        }

        errors.into_result()?;
        Ok(Self { page, limit })
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// Reference to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageRef {
    pub page: u32,
    pub limit: u32,
}

/// Previous and next page descriptors for a list response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let PageRequest { page, limit } = request;
        let end = u64::from(page) * u64::from(limit);

        Self {
            next: page
                .checked_add(1)
                .filter(|_| end < total)
                .map(|page| PageRef { page, limit }),
            prev: (page > 1).then(|| PageRef {
                page: page - 1,
                limit,
            }),
        }
    }
}
