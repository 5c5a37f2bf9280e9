use uuid::Uuid;

use crate::{
    dto::orders::{OrderFilter, OrderList},
    error::{AppError, AppResult},
    listing::{ListQuery, ListingState, OrderSortField, PageSize},
    models::OrderWithItems,
    repository::OrderRepository,
    response::{ApiResponse, Meta},
    validation::non_blank,
};

pub async fn list_orders<O: OrderRepository>(
    orders: &O,
    query: ListQuery<OrderSortField>,
    filter: OrderFilter,
) -> AppResult<ApiResponse<OrderList>> {
    let state = query.into_state(PageSize::Choice)?;
    let status = non_blank(filter.status.as_deref());
    let page = orders.list(&state, status.as_deref()).await?;

    let meta = Meta::new(state.page, state.per_page, page.total);
    let data = OrderList {
        items: page.items,
        listing: ListingState::from(&state),
    };
    Ok(ApiResponse::success("Orders", data, Some(meta)))
}

pub async fn get_order<O: OrderRepository>(
    orders: &O,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = match orders.find_with_items(id).await? {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Order found", order, Some(Meta::empty())))
}
