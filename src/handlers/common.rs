use crate::errors::{ApiError, ServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard accepted response for fire-and-forget work
pub fn accepted_response<T: Serialize>(data: T) -> Response {
    (StatusCode::ACCEPTED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

impl PaginationParams {
    /// Values actually used for queries and echoed in the response meta:
    /// pages are 1-based and a zero page size is treated as 1.
    pub fn effective(&self) -> (u64, u64) {
        (self.page.max(1), self.per_page.max(1))
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        // a zero page size must not divide by zero on non-empty tables
        let per_page = per_page.max(1);
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_per_page_never_divides_by_zero() {
        let meta = PaginationMeta::new(1, 0, 5);
        assert_eq!(meta.per_page, 1);
        assert_eq!(meta.total_pages, 5);
    }

    #[test]
    fn effective_values_are_one_based_and_nonzero() {
        let params = PaginationParams {
            page: 0,
            per_page: 0,
        };
        assert_eq!(params.effective(), (1, 1));
    }

    #[test]
    fn total_pages_rounds_up() {
        let meta = PaginationMeta::new(2, 20, 41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
    }
}
