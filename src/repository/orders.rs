use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    entity::{
        order_items::{self, Entity as OrderItems},
        orders::{Column, Entity as Orders, Model as OrderModel},
    },
    error::AppResult,
    listing::{ListState, OrderSortField, Page},
    models::{Order, OrderItem, OrderWithItems},
    repository::OrderRepository,
};

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn list(
        &self,
        state: &ListState<OrderSortField>,
        status: Option<&str>,
    ) -> AppResult<Page<Order>> {
        let mut finder = Orders::find();
        if let Some(status) = status {
            finder = finder.filter(Column::Status.eq(status));
        }
        if let Some(pattern) = state.like_pattern() {
            finder = finder.filter(Expr::col(Column::OrderNumber).ilike(pattern));
        }
        let sort_col = match state.sort_field {
            OrderSortField::Id => Column::Id,
            OrderSortField::OrderNumber => Column::OrderNumber,
            OrderSortField::TotalAmount => Column::TotalAmount,
            OrderSortField::Status => Column::Status,
            OrderSortField::PaymentStatus => Column::PaymentStatus,
            OrderSortField::CreatedAt => Column::CreatedAt,
        };
        let finder = finder
            .order_by(sort_col, state.sort_direction.order())
            .order_by_asc(Column::Id);

        let total = finder.clone().count(&self.db).await?;
        let items = finder
            .limit(state.per_page)
            .offset(state.offset())
            .all(&self.db)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect();
        Ok(Page { items, total })
    }

    async fn find_with_items(&self, id: Uuid) -> AppResult<Option<OrderWithItems>> {
        let Some(order) = Orders::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let items = OrderItems::find()
            .filter(order_items::Column::OrderId.eq(id))
            .order_by_asc(order_items::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|item| OrderItem {
                id: item.id,
                order_id: item.order_id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                created_at: item.created_at.with_timezone(&Utc),
            })
            .collect();
        Ok(Some(OrderWithItems {
            order: order_from_entity(order),
            items,
        }))
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        order_number: model.order_number,
        total_amount: model.total_amount,
        status: model.status,
        shipping_address: model.shipping_address,
        billing_address: model.billing_address,
        payment_method: model.payment_method,
        payment_status: model.payment_status,
        shipped_at: model.shipped_at.map(|at| at.with_timezone(&Utc)),
        delivered_at: model.delivered_at.map(|at| at.with_timezone(&Utc)),
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
