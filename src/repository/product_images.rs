use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, sea_query::JoinType,
};
use uuid::Uuid;

use crate::{
    entity::{
        product_images::{Column, Entity as ProductImages, Model as ProductImageModel, Relation},
        products,
    },
    error::AppResult,
    models::ProductImage,
    repository::ProductImageRepository,
};

#[derive(Clone)]
pub struct DbProductImageRepository {
    pub db: DatabaseConnection,
}

impl ProductImageRepository for DbProductImageRepository {
    async fn for_product(&self, product_id: Uuid) -> AppResult<Vec<ProductImage>> {
        let images = ProductImages::find()
            .filter(Column::ProductId.eq(product_id))
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(image_from_entity)
            .collect();
        Ok(images)
    }

    async fn for_category(&self, category_id: Uuid) -> AppResult<Vec<ProductImage>> {
        let images = ProductImages::find()
            .join(JoinType::InnerJoin, Relation::Products.def())
            .filter(products::Column::CategoryId.eq(category_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(image_from_entity)
            .collect();
        Ok(images)
    }
}

pub(crate) fn image_from_entity(model: ProductImageModel) -> ProductImage {
    ProductImage {
        id: model.id,
        product_id: model.product_id,
        image_path: model.image_path,
        thumbnail_path: model.thumbnail_path,
        image_url: None,
        is_main: model.is_main,
        sort_order: model.sort_order,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
