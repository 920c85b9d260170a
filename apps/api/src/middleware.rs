use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use rolewarden_core::AppError;
use subtle::ConstantTimeEq;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    verify_bearer(request.headers(), state.admin_api_token.as_str(), "admin")?;
    Ok(next.run(request).await)
}

pub async fn require_gateway_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    verify_bearer(
        request.headers(),
        state.gateway_bridge_secret.as_str(),
        "gateway bridge",
    )?;
    Ok(next.run(request).await)
}

fn verify_bearer(headers: &HeaderMap, expected: &str, scope: &str) -> Result<(), AppError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized(format!("{scope} bearer token required")))?;

    if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(AppError::Unauthorized(format!("invalid {scope} bearer token")));
    }

    Ok(())
}
