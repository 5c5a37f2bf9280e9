use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::users::{UpdateUserRolesRequest, UserList, UserRolesView},
    error::AppResult,
    listing::{ListQuery, UserSortField},
    middleware::auth::AdminUser,
    models::Role,
    response::ApiResponse,
    services::{role_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}/roles", get(user_roles).put(update_user_roles))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("search" = Option<String>, Query, description = "Matches name or email"),
        ("sort_field" = Option<UserSortField>, Query, description = "Current sort column, default id"),
        ("sort_direction" = Option<String>, Query, description = "asc or desc"),
        ("per_page" = Option<u64>, Query, description = "10, 25, 50 or 100; default 10"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("sort_by" = Option<UserSortField>, Query, description = "Column clicked"),
        ("new_search" = Option<String>, Query, description = "Replace the search term"),
        ("new_per_page" = Option<u64>, Query, description = "Replace the page size"),
    ),
    responses(
        (status = 200, description = "Users with their role names", body = ApiResponse<UserList>)
    ),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery<UserSortField>>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = user_service::list_users(&state.users(), &state.roles(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    responses(
        (status = 200, description = "All roles ordered by name", body = ApiResponse<Vec<Role>>)
    ),
    tag = "Users"
)]
pub async fn list_roles(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<Vec<Role>>>> {
    let resp = role_service::list_roles(&state.roles()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Role editor for the user", body = ApiResponse<UserRolesView>),
        (status = 404, description = "User not found")
    ),
    tag = "Users"
)]
pub async fn user_roles(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserRolesView>>> {
    let resp = role_service::user_roles(&state.users(), &state.roles(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/roles",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRolesRequest,
    responses(
        (status = 200, description = "Role names the user now holds", body = ApiResponse<Vec<String>>),
        (status = 404, description = "User not found"),
        (status = 422, description = "Unknown role name")
    ),
    tag = "Users"
)]
pub async fn update_user_roles(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRolesRequest>,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    tracing::debug!(admin_id = %admin.user_id, user_id = %id, "updating user roles");
    let resp = role_service::save_user_roles(&state.users(), &state.roles(), id, payload).await?;
    Ok(Json(resp))
}
