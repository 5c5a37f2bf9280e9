use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryForm, CategoryList, ParentOptionsQuery},
    error::AppResult,
    listing::{CategorySortField, ListQuery},
    middleware::auth::AdminUser,
    models::{Category, OptionItem},
    response::ApiResponse,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/parent-options", get(parent_options))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(
        ("search" = Option<String>, Query, description = "Current search term"),
        ("sort_field" = Option<CategorySortField>, Query, description = "Current sort column, default id"),
        ("sort_direction" = Option<String>, Query, description = "asc or desc"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("sort_by" = Option<CategorySortField>, Query, description = "Column clicked; toggles direction when already sorted by it"),
        ("new_search" = Option<String>, Query, description = "Replace the search term and go back to page 1"),
    ),
    responses(
        (status = 200, description = "Categories, ten per page", body = ApiResponse<CategoryList>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery<CategorySortField>>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state.categories(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/parent-options",
    params(ParentOptionsQuery),
    responses(
        (status = 200, description = "Possible parents ordered by name", body = ApiResponse<Vec<OptionItem>>)
    ),
    tag = "Categories"
)]
pub async fn parent_options(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ParentOptionsQuery>,
) -> AppResult<Json<ApiResponse<Vec<OptionItem>>>> {
    let resp = category_service::parent_options(&state.categories(), query.exclude).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state.categories(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CategoryForm,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 422, description = "Validation failed")
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(form): Json<CategoryForm>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::save_category(&state.categories(), None, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = CategoryForm,
    responses(
        (status = 200, description = "Updated category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(form): Json<CategoryForm>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::save_category(&state.categories(), Some(id), form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Deleted category along with its products"),
        (status = 404, description = "Category not found")
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(
        &state.categories(),
        &state.product_images(),
        &state.storage,
        id,
    )
    .await?;
    Ok(Json(resp))
}
