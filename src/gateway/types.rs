//! API response envelope, error codes, and pagination helpers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;
use crate::engine::EngineError;
use crate::evidence::EvidenceError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const NOT_FOUND: i32 = 1002;
    pub const FORBIDDEN: i32 = 1003;
    pub const STATE_CONFLICT: i32 = 1004;
    pub const CONCURRENCY_CONFLICT: i32 = 1005;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
}

// ============================================================================
// API Error
// ============================================================================

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, error_codes::FORBIDDEN, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn into_err<T>(self) -> ApiResult<T> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::Validation(msg) => ApiError::bad_request(msg.clone()),
            EngineError::NotFound(_) => ApiError::not_found(err.to_string()),
            EngineError::Forbidden(msg) => ApiError::forbidden(msg.clone()),
            EngineError::StateConflict(msg) => ApiError::new(
                StatusCode::CONFLICT,
                error_codes::STATE_CONFLICT,
                msg.clone(),
            ),
            EngineError::ConcurrencyConflict => ApiError::new(
                StatusCode::CONFLICT,
                error_codes::CONCURRENCY_CONFLICT,
                err.to_string(),
            ),
            EngineError::Database(e) => {
                tracing::error!("Storage failure: {}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                err.to_string(),
            ),
            AuthError::EmailTaken => ApiError::bad_request(err.to_string()),
            AuthError::Hashing(e) => {
                tracing::error!("Hashing failure: {}", e);
                ApiError::internal("Internal server error")
            }
            AuthError::Database(e) => {
                tracing::error!("Storage failure: {}", e);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Storage failure: {}", err);
        ApiError::internal("Internal server error")
    }
}

impl From<EvidenceError> for ApiError {
    fn from(err: EvidenceError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Create success response shorthand
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Pagination
// ============================================================================

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Page/limit query parameters with safe defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Resolve to (page, limit, offset), clamped to sane bounds.
    pub fn resolve(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit, (page - 1) * limit)
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: (total + limit - 1) / limit.max(1),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            data,
            meta: PageMeta::new(total, page, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.resolve(), (1, 10, 0));
    }

    #[test]
    fn test_page_query_clamps() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(query.resolve(), (1, 100, 0));

        let query = PageQuery {
            page: Some(3),
            limit: Some(20),
        };
        assert_eq!(query.resolve(), (3, 20, 40));
    }

    #[test]
    fn test_page_meta_rounds_up() {
        let meta = PageMeta::new(21, 1, 10);
        assert_eq!(meta.total_pages, 3);
        let meta = PageMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
    }
}
