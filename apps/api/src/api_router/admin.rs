use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_admin_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/communities/{community_id}/roles",
            get(handlers::protection::list_roles_handler),
        )
        .route(
            "/api/communities/{community_id}/grants",
            get(handlers::protection::list_grants_handler),
        )
        .route(
            "/api/roles/{role_id}/toggle",
            post(handlers::protection::toggle_role_protection_handler),
        )
        .route(
            "/api/grants/{user_id}/{community_id}/{role_id}",
            post(handlers::protection::add_authorization_handler)
                .delete(handlers::protection::remove_authorization_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_admin_token,
        ))
}
