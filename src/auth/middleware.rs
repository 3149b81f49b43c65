use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::UserRole;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiResponse, error_codes};

/// The authenticated actor injected into request extensions. The engine
/// trusts these ids and enforces authorization by comparing them against
/// request ownership.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}

type AuthRejection = (StatusCode, Json<ApiResponse<()>>);

fn unauthorized(code: i32, msg: &str) -> AuthRejection {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error(code, msg)),
    )
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized(error_codes::MISSING_AUTH, "Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized(error_codes::AUTH_FAILED, "Invalid token format"))?;

    let claims = state
        .auth
        .verify_token(token)
        .map_err(|_| unauthorized(error_codes::AUTH_FAILED, "Invalid or expired token"))?;

    let id: Uuid = claims
        .sub
        .parse()
        .map_err(|_| unauthorized(error_codes::AUTH_FAILED, "Invalid token subject"))?;

    let role = match claims.role.as_str() {
        "SUPER_ADMIN" => UserRole::SuperAdmin,
        "VENDOR" => UserRole::Vendor,
        _ => return Err(unauthorized(error_codes::AUTH_FAILED, "Invalid token role")),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { id, role });

    Ok(next.run(request).await)
}
