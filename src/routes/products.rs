use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductForm, ProductFormOptions, ProductList, ProductUpload},
    error::AppResult,
    listing::{ListQuery, ProductSortField},
    middleware::auth::AdminUser,
    models::ProductWithImages,
    response::ApiResponse,
    services::product_service,
    state::AppState,
    upload::MultipartForm,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/options", get(form_options))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(
        ("search" = Option<String>, Query, description = "Matches name, short description or SKU"),
        ("sort_field" = Option<ProductSortField>, Query, description = "Current sort column, default id"),
        ("sort_direction" = Option<String>, Query, description = "asc or desc"),
        ("per_page" = Option<u64>, Query, description = "10, 25, 50 or 100; default 10"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("sort_by" = Option<ProductSortField>, Query, description = "Column clicked"),
        ("new_search" = Option<String>, Query, description = "Replace the search term"),
        ("new_per_page" = Option<u64>, Query, description = "Replace the page size"),
    ),
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>),
        (status = 400, description = "Page size not allowed")
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery<ProductSortField>>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_products(&state.products(), query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/options",
    responses(
        (status = 200, description = "Categories and brands for the product form", body = ApiResponse<ProductFormOptions>)
    ),
    tag = "Products"
)]
pub async fn form_options(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<ProductFormOptions>>> {
    let resp = product_service::form_options(&state.categories(), &state.brands()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with its images", body = ApiResponse<ProductWithImages>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductWithImages>>> {
    let resp = product_service::get_product(
        &state.products(),
        &state.product_images(),
        &state.storage,
        id,
    )
    .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Create product", body = ApiResponse<ProductWithImages>),
        (status = 422, description = "Validation failed")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductWithImages>>)> {
    let form = ProductForm::from_multipart(&MultipartForm::read(multipart).await?)?;
    let resp = save(&state, None, form).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = ProductUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<ProductWithImages>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<ProductWithImages>>> {
    let form = ProductForm::from_multipart(&MultipartForm::read(multipart).await?)?;
    let resp = save(&state, Some(id), form).await?;
    Ok(Json(resp))
}

async fn save(
    state: &AppState,
    id: Option<Uuid>,
    form: ProductForm,
) -> AppResult<ApiResponse<ProductWithImages>> {
    product_service::save_product(
        &state.products(),
        &state.product_images(),
        &state.categories(),
        &state.brands(),
        &state.storage,
        id,
        form,
    )
    .await
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product and its image files"),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(
        &state.products(),
        &state.product_images(),
        &state.storage,
        id,
    )
    .await?;
    Ok(Json(resp))
}
