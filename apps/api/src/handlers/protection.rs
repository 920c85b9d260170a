use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rolewarden_domain::{AuthorizationGrant, CommunityId, RoleId, UserId};

use crate::dto::{AuthorizationChangeResponse, GrantResponse, ProtectedRoleResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> ApiResult<Json<Vec<ProtectedRoleResponse>>> {
    let community_id = CommunityId::new(community_id)?;
    let roles = state
        .protection_admin_service
        .list_roles(&community_id)
        .await?
        .into_iter()
        .map(ProtectedRoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn list_grants_handler(
    State(state): State<AppState>,
    Path(community_id): Path<String>,
) -> ApiResult<Json<Vec<GrantResponse>>> {
    let community_id = CommunityId::new(community_id)?;
    let grants = state
        .protection_admin_service
        .list_grants(&community_id)
        .await?
        .into_iter()
        .map(GrantResponse::from)
        .collect();

    Ok(Json(grants))
}

pub async fn toggle_role_protection_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<ProtectedRoleResponse>> {
    let role_id = RoleId::new(role_id)?;
    let role = state
        .protection_admin_service
        .toggle_protection(&role_id)
        .await?;

    Ok(Json(ProtectedRoleResponse::from(role)))
}

pub async fn add_authorization_handler(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
) -> ApiResult<(StatusCode, Json<AuthorizationChangeResponse>)> {
    let change = state
        .protection_admin_service
        .add_authorization(parse_grant(path)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthorizationChangeResponse::from(change)),
    ))
}

pub async fn remove_authorization_handler(
    State(state): State<AppState>,
    Path(path): Path<(String, String, String)>,
) -> ApiResult<Json<AuthorizationChangeResponse>> {
    let change = state
        .protection_admin_service
        .remove_authorization(parse_grant(path)?)
        .await?;

    Ok(Json(AuthorizationChangeResponse::from(change)))
}

fn parse_grant(
    (user_id, community_id, role_id): (String, String, String),
) -> ApiResult<AuthorizationGrant> {
    Ok(AuthorizationGrant::new(
        UserId::new(user_id)?,
        CommunityId::new(community_id)?,
        RoleId::new(role_id)?,
    ))
}
