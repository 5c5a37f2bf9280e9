use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::brands::{BrandForm, BrandList, BrandUpload},
    error::AppResult,
    listing::{BrandSortField, ListQuery},
    middleware::auth::AdminUser,
    models::Brand,
    response::ApiResponse,
    services::brand_service,
    state::AppState,
    upload::MultipartForm,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_brands).post(create_brand))
        .route("/{id}", get(get_brand).put(update_brand).delete(delete_brand))
}

#[utoipa::path(
    get,
    path = "/api/admin/brands",
    params(
        ("search" = Option<String>, Query, description = "Current search term"),
        ("sort_field" = Option<BrandSortField>, Query, description = "Current sort column, default id"),
        ("sort_direction" = Option<String>, Query, description = "asc or desc"),
        ("per_page" = Option<u64>, Query, description = "10, 25, 50 or 100; default 10"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("sort_by" = Option<BrandSortField>, Query, description = "Column clicked"),
        ("new_search" = Option<String>, Query, description = "Replace the search term"),
        ("new_per_page" = Option<u64>, Query, description = "Replace the page size"),
    ),
    responses(
        (status = 200, description = "List brands", body = ApiResponse<BrandList>),
        (status = 400, description = "Page size not allowed")
    ),
    tag = "Brands"
)]
pub async fn list_brands(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery<BrandSortField>>,
) -> AppResult<Json<ApiResponse<BrandList>>> {
    let resp = brand_service::list_brands(&state.brands(), &state.storage, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Get brand", body = ApiResponse<Brand>),
        (status = 404, description = "Brand not found"),
    ),
    tag = "Brands"
)]
pub async fn get_brand(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Brand>>> {
    let resp = brand_service::get_brand(&state.brands(), &state.storage, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/brands",
    request_body(content = BrandUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Create brand", body = ApiResponse<Brand>),
        (status = 422, description = "Validation failed")
    ),
    tag = "Brands"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Brand>>)> {
    let form = BrandForm::from_multipart(&MultipartForm::read(multipart).await?);
    let resp = brand_service::save_brand(&state.brands(), &state.storage, None, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    request_body(content = BrandUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated brand", body = ApiResponse<Brand>),
        (status = 404, description = "Brand not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Brands"
)]
pub async fn update_brand(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Brand>>> {
    let form = BrandForm::from_multipart(&MultipartForm::read(multipart).await?);
    let resp = brand_service::save_brand(&state.brands(), &state.storage, Some(id), form).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/brands/{id}",
    params(
        ("id" = Uuid, Path, description = "Brand ID")
    ),
    responses(
        (status = 200, description = "Deleted brand; its products are kept"),
        (status = 404, description = "Brand not found")
    ),
    tag = "Brands"
)]
pub async fn delete_brand(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = brand_service::delete_brand(&state.brands(), &state.storage, id).await?;
    Ok(Json(resp))
}
