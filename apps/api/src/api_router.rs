use axum::Router;
use axum::routing::get;
use rolewarden_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod admin;
mod cors;
mod gateway_internal;

pub fn build_router(app_state: AppState, cors_origin: Option<&str>) -> Result<Router, AppError> {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(admin::build_admin_routes(app_state.clone()))
        .merge(gateway_internal::build_gateway_internal_routes(
            app_state.clone(),
        ))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = cors_origin {
        router = router.layer(cors::build_cors_layer(origin)?);
    }

    Ok(router.with_state(app_state))
}
