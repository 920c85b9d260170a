use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use rolewarden_core::AppError;
use tower_http::cors::CorsLayer;

pub(super) fn build_cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(origin).map_err(|error| {
                AppError::Validation(format!("invalid ADMIN_CORS_ORIGIN: {error}"))
            })?,
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}
