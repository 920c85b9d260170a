use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use rolewarden_domain::PlatformEvent;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn ingest_gateway_event_handler(
    State(state): State<AppState>,
    Json(event): Json<PlatformEvent>,
) -> ApiResult<StatusCode> {
    state.gateway_session.ingest(event).await?;

    Ok(StatusCode::ACCEPTED)
}
