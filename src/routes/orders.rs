use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderFilter, OrderList},
    error::AppResult,
    listing::{ListQuery, OrderSortField},
    middleware::auth::AdminUser,
    models::OrderWithItems,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        OrderFilter,
        ("search" = Option<String>, Query, description = "Matches the order number"),
        ("sort_field" = Option<OrderSortField>, Query, description = "Current sort column, default id"),
        ("sort_direction" = Option<String>, Query, description = "asc or desc"),
        ("per_page" = Option<u64>, Query, description = "10, 25, 50 or 100; default 10"),
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("sort_by" = Option<OrderSortField>, Query, description = "Column clicked"),
        ("new_search" = Option<String>, Query, description = "Replace the search term"),
        ("new_per_page" = Option<u64>, Query, description = "Replace the page size"),
    ),
    responses(
        (status = 200, description = "List orders", body = ApiResponse<OrderList>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery<OrderSortField>>,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state.orders(), query, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Order not found")
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state.orders(), id).await?;
    Ok(Json(resp))
}
