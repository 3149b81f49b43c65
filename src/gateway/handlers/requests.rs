//! Request lifecycle and query handlers.

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
use super::{UserSummary, parse_range, require_admin};
use crate::auth::AuthenticatedUser;
use crate::domain::{
    BankDetails, PaymentSlip, Request, RequestLog, RequestStatus, RequestType,
};
use crate::engine::{CreateRequest, RequestService};
use crate::evidence;
use crate::money;
use crate::store::requests::{AdminFilter, AvailableFilter, HistoryFilter};
use crate::store::{RequestStore, SlipStore, UserStore};

fn parse_amount_field(value: &str) -> Result<rust_decimal::Decimal, ApiError> {
    money::parse_amount(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

// ============================================================================
// Lifecycle operations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub amount: String,
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub qr_code: Option<String>,
}

/// POST /api/v1/requests
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<CreateBody>,
) -> ApiResult<Request> {
    let amount = parse_amount_field(&body.amount)?;

    let request = RequestService::create(
        state.pool(),
        user.id,
        CreateRequest {
            kind: body.kind,
            amount,
            bank_details: body.bank_details,
            upi_id: body.upi_id,
            qr_code: body.qr_code,
        },
    )
    .await?;

    ok(request)
}

#[derive(Debug, Deserialize)]
pub struct AdminWithdrawalBody {
    pub amount: String,
}

/// POST /api/v1/requests/admin-withdrawal (admin)
pub async fn create_admin_withdrawal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<AdminWithdrawalBody>,
) -> ApiResult<Request> {
    require_admin(&user)?;
    let amount = parse_amount_field(&body.amount)?;

    let request = RequestService::create_admin_withdrawal(state.pool(), amount).await?;
    ok(request)
}

#[derive(Debug, Deserialize)]
pub struct PickBody {
    pub amount: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PickResponse {
    pub request: Request,
    /// Sibling spawned for the unpicked remainder of a split.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_request: Option<Request>,
}

/// POST /api/v1/requests/{id}/pick
pub async fn pick(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    body: Option<Json<PickBody>>,
) -> ApiResult<PickResponse> {
    let amount = match body.and_then(|Json(b)| b.amount) {
        Some(raw) => Some(parse_amount_field(&raw)?),
        None => None,
    };

    let outcome = RequestService::pick(state.pool(), request_id, user.id, amount).await?;

    ok(PickResponse {
        request: outcome.request,
        new_request: outcome.spawned,
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct UploadSlipBody {
    pub amount: String,
    #[validate(length(min = 1))]
    pub content_type: String,
    /// Base64-encoded proof binary (image or PDF).
    #[validate(length(min = 1))]
    pub payload: String,
}

/// POST /api/v1/requests/{id}/slip
pub async fn upload_slip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<UploadSlipBody>,
) -> ApiResult<Request> {
    body.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let amount = parse_amount_field(&body.amount)?;

    let bytes = evidence::decode_payload(&body.payload)?;
    let evidence_ref = state.evidence.store(&body.content_type, &bytes).await?;

    let request =
        RequestService::upload_slip(state.pool(), request_id, user.id, amount, evidence_ref)
            .await?;

    ok(request)
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub approved: Option<bool>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub request: Request,
    /// Remainder (partial approval) or full reopen (rejection).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_request: Option<Request>,
}

/// POST /api/v1/requests/{id}/verify
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<VerifyBody>,
) -> ApiResult<VerifyResponse> {
    let approved = body
        .approved
        .ok_or_else(|| ApiError::bad_request("Approval status is required"))?;

    let outcome = RequestService::verify(
        state.pool(),
        request_id,
        user.id,
        approved,
        body.rejection_reason,
    )
    .await?;

    ok(VerifyResponse {
        request: outcome.request,
        new_request: outcome.spawned,
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct FailBody {
    #[validate(length(min = 1))]
    pub reason: String,
}

/// POST /api/v1/requests/{id}/fail
pub async fn report_failure(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<FailBody>,
) -> ApiResult<Request> {
    body.validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let request =
        RequestService::report_failure(state.pool(), request_id, user.id, body.reason).await?;

    ok(request)
}

#[derive(Debug, Deserialize)]
pub struct RevertBody {
    pub bank_details: Option<BankDetails>,
    pub upi_id: Option<String>,
    pub comment: Option<String>,
}

/// POST /api/v1/requests/{id}/revert
pub async fn revert(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    body: Option<Json<RevertBody>>,
) -> ApiResult<Request> {
    let body = body.map(|Json(b)| b).unwrap_or(RevertBody {
        bank_details: None,
        upi_id: None,
        comment: None,
    });

    let request = RequestService::revert(
        state.pool(),
        request_id,
        user.id,
        body.bank_details,
        body.upi_id,
        body.comment,
    )
    .await?;

    ok(request)
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub id: Uuid,
}

/// DELETE /api/v1/requests/{id}
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
    body: Option<Json<CancelBody>>,
) -> ApiResult<CancelResponse> {
    let reason = body.and_then(|Json(b)| b.reason);

    RequestService::cancel(state.pool(), request_id, user.id, reason).await?;

    ok(CancelResponse { id: request_id })
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    pub amount: Option<String>,
    pub min_amount: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<RequestType>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A pending request as seen by a prospective picker: the stored direction
/// plus the inverted one they would act on.
#[derive(Debug, Serialize)]
pub struct AvailableRequest {
    #[serde(flatten)]
    pub request: Request,
    pub display_type: RequestType,
    pub original_type: RequestType,
}

/// GET /api/v1/requests/available
pub async fn available(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<AvailableQuery>,
) -> ApiResult<Paginated<AvailableRequest>> {
    let (page, limit, offset) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve();

    let filter = AvailableFilter {
        amount: query
            .amount
            .as_deref()
            .map(parse_amount_field)
            .transpose()?,
        min_amount: query
            .min_amount
            .as_deref()
            .map(parse_amount_field)
            .transpose()?,
        kind: query.kind,
    };

    let (requests, total) =
        RequestStore::available(state.pool(), user.id, &filter, limit, offset).await?;

    let rows = requests
        .into_iter()
        .map(|request| AvailableRequest {
            display_type: request.kind.inverted(),
            original_type: request.kind,
            request,
        })
        .collect();

    ok(Paginated::new(rows, total, page, limit))
}

#[derive(Debug, Deserialize)]
pub struct MineQuery {
    pub status: Option<RequestStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_page: Option<i64>,
    pub picked_page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MineResponse {
    pub created_requests: Paginated<Request>,
    pub picked_requests: Paginated<Request>,
}

/// GET /api/v1/requests/mine
pub async fn mine(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MineQuery>,
) -> ApiResult<MineResponse> {
    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let filter = HistoryFilter {
        status: query.status,
        start,
        end,
    };

    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let created_page = query.created_page.unwrap_or(1).max(1);
    let picked_page = query.picked_page.unwrap_or(1).max(1);

    let (created, created_total) = RequestStore::created_by(
        state.pool(),
        user.id,
        &filter,
        limit,
        (created_page - 1) * limit,
    )
    .await?;

    let (picked, picked_total) = RequestStore::picked_by(
        state.pool(),
        user.id,
        &filter,
        limit,
        (picked_page - 1) * limit,
    )
    .await?;

    ok(MineResponse {
        created_requests: Paginated::new(created, created_total, created_page, limit),
        picked_requests: Paginated::new(picked, picked_total, picked_page, limit),
    })
}

#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub created_count: i64,
    pub picked_count: i64,
}

/// GET /api/v1/requests/mine/counts
pub async fn counts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<CountsResponse> {
    let (created_count, picked_count) = RequestStore::counts(state.pool(), user.id).await?;
    ok(CountsResponse {
        created_count,
        picked_count,
    })
}

#[derive(Debug, Serialize)]
pub struct RequestDetails {
    #[serde(flatten)]
    pub request: Request,
    pub created_by_user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picked_by_user: Option<UserSummary>,
    pub slips: Vec<PaymentSlip>,
}

/// GET /api/v1/requests/{id}
///
/// Visible to the creator, the picker, and the super admin only.
pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<RequestDetails> {
    let request = RequestStore::get(state.pool(), request_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    let is_party = request.created_by == user.id || request.picked_by == Some(user.id);
    if !user.is_super_admin() && !is_party {
        return ApiError::forbidden("You do not have permission to view this request").into_err();
    }

    let created_by_user = UserStore::get_by_id(state.pool(), request.created_by)
        .await?
        .map(UserSummary::from)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let picked_by_user = match request.picked_by {
        Some(picker_id) => UserStore::get_by_id(state.pool(), picker_id)
            .await?
            .map(UserSummary::from),
        None => None,
    };

    let slips = SlipStore::list_for_request(state.pool(), request_id).await?;

    ok(RequestDetails {
        request,
        created_by_user,
        picked_by_user,
        slips,
    })
}

/// GET /api/v1/requests/{id}/logs
pub async fn logs(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Vec<RequestLog>> {
    let trail = crate::audit::AuditLogger::trail(state.pool(), request_id).await?;
    ok(trail)
}

/// GET /api/v1/requests/{id}/slips
pub async fn slips(
    State(state): State<Arc<AppState>>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Vec<PaymentSlip>> {
    let slips = SlipStore::list_for_request(state.pool(), request_id).await?;
    ok(slips)
}

#[derive(Debug, Serialize)]
pub struct SlipEvidence {
    pub url: String,
}

/// GET /api/v1/requests/{id}/slips/{slip_id}/evidence
pub async fn slip_evidence(
    State(state): State<Arc<AppState>>,
    Path((request_id, slip_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<SlipEvidence> {
    let slip = SlipStore::get(state.pool(), request_id, slip_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Payment slip not found"))?;

    ok(SlipEvidence {
        url: slip.evidence_ref,
    })
}

#[derive(Debug, Deserialize)]
pub struct AdminAllQuery {
    pub status: Option<RequestStatus>,
    #[serde(rename = "type")]
    pub kind: Option<RequestType>,
    pub vendor_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/requests/admin/all (admin)
pub async fn admin_all(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<AdminAllQuery>,
) -> ApiResult<Paginated<Request>> {
    require_admin(&user)?;

    let (start, end) = parse_range(query.start_date.as_deref(), query.end_date.as_deref())?;
    let filter = AdminFilter {
        status: query.status,
        kind: query.kind,
        vendor_id: query.vendor_id,
        start,
        end,
    };

    let (page, limit, offset) = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve();
    let (requests, total) = RequestStore::admin_all(state.pool(), &filter, limit, offset).await?;

    ok(Paginated::new(requests, total, page, limit))
}
