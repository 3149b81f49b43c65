//! Login, profile, and vendor management handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, PageQuery, Paginated, ok};
use crate::auth::{AuthResponse, AuthenticatedUser};
use crate::domain::{BankDetails, User, WithdrawalLimitConfig};
use crate::money;
use crate::store::UserStore;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<AuthResponse> {
    body.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let response = state
        .auth
        .login(state.pool(), &body.email, &body.password)
        .await?;

    ok(response)
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<User> {
    let profile = UserStore::get_by_id(state.pool(), user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    ok(profile)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendorBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub password: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedVendor {
    pub user: User,
    /// Plaintext credential, returned exactly once at creation.
    pub password: String,
}

/// POST /api/v1/auth/vendors (admin)
pub async fn create_vendor(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(body): Json<CreateVendorBody>,
) -> ApiResult<CreatedVendor> {
    super::require_admin(&actor)?;
    body.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let (user, password) = state
        .auth
        .create_vendor(
            state.pool(),
            &body.email,
            &body.name,
            body.password,
            body.bank_details,
            body.upi_id,
        )
        .await?;

    ok(CreatedVendor { user, password })
}

#[derive(Debug, Deserialize)]
pub struct VendorListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/auth/vendors (admin)
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthenticatedUser>,
    Query(query): Query<VendorListQuery>,
) -> ApiResult<Paginated<User>> {
    super::require_admin(&actor)?;
    let (page, limit, offset) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve();

    let (vendors, total) =
        UserStore::list_vendors(state.pool(), query.search.as_deref(), limit, offset).await?;

    ok(Paginated::new(vendors, total, page, limit))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub qr_code: Option<String>,
}

/// PUT /api/v1/auth/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileBody>,
) -> ApiResult<User> {
    UserStore::update_profile(
        state.pool(),
        user.id,
        body.bank_details.as_ref(),
        body.upi_id.as_deref(),
        body.qr_code.as_deref(),
    )
    .await?;

    let profile = UserStore::get_by_id(state.pool(), user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    ok(profile)
}

#[derive(Debug, Deserialize)]
pub struct UpdateLimitBody {
    pub config: WithdrawalLimitConfig,
    pub max_limit: Option<String>,
}

/// PUT /api/v1/auth/vendors/{id}/limit (admin)
pub async fn update_withdrawal_limit(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(vendor_id): Path<Uuid>,
    Json(body): Json<UpdateLimitBody>,
) -> ApiResult<User> {
    super::require_admin(&actor)?;

    let max_limit = body
        .max_limit
        .as_deref()
        .map(money::parse_amount)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let updated = state
        .auth
        .set_withdrawal_limit(state.pool(), vendor_id, body.config, max_limit)
        .await?;

    if !updated {
        return ApiError::not_found("Vendor not found").into_err();
    }

    let vendor = UserStore::get_by_id(state.pool(), vendor_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Vendor not found"))?;

    ok(vendor)
}
