use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    entity::{
        brands, categories, product_images,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    listing::{ListState, Page, ProductSortField},
    models::{Product, ProductImage, ProductListItem},
    repository::{
        ImageChanges, ProductDraft, ProductRepository, product_images::image_from_entity,
    },
};

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl DbProductRepository {
    async fn category_names(&self, ids: HashSet<Uuid>) -> AppResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    async fn brand_names(&self, ids: HashSet<Uuid>) -> AppResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = brands::Entity::find()
            .filter(brands::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    async fn taken(&self, column: Column, value: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut finder = Products::find().filter(column.eq(value));
        if let Some(id) = except {
            finder = finder.filter(Column::Id.ne(id));
        }
        Ok(finder.count(&self.db).await? > 0)
    }
}

impl ProductRepository for DbProductRepository {
    async fn list(&self, state: &ListState<ProductSortField>) -> AppResult<Page<ProductListItem>> {
        let mut finder = Products::find();
        if let Some(pattern) = state.like_pattern() {
            finder = finder.filter(
                Condition::any()
                    .add(Expr::col(Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(Column::ShortDescription).ilike(pattern.clone()))
                    .add(Expr::col(Column::Sku).ilike(pattern)),
            );
        }
        let finder = finder
            .order_by(sort_column(state.sort_field), state.sort_direction.order())
            .order_by_asc(Column::Id);

        let total = finder.clone().count(&self.db).await?;
        let rows = finder
            .limit(state.per_page)
            .offset(state.offset())
            .all(&self.db)
            .await?;

        let category_names = self
            .category_names(rows.iter().map(|row| row.category_id).collect())
            .await?;
        let brand_names = self
            .brand_names(rows.iter().filter_map(|row| row.brand_id).collect())
            .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let category_name = category_names.get(&row.category_id).cloned();
                let brand_name = row.brand_id.and_then(|id| brand_names.get(&id).cloned());
                ProductListItem {
                    product: product_from_entity(row),
                    category_name,
                    brand_name,
                }
            })
            .collect();
        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let found = Products::find_by_id(id).one(&self.db).await?;
        Ok(found.map(product_from_entity))
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        self.taken(Column::Name, name, except).await
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        self.taken(Column::Slug, slug, except).await
    }

    async fn sku_taken(&self, sku: &str, except: Option<Uuid>) -> AppResult<bool> {
        self.taken(Column::Sku, sku, except).await
    }

    async fn create(&self, draft: &ProductDraft) -> AppResult<Product> {
        insert_product(&self.db, draft).await
    }

    async fn save_with_images(
        &self,
        id: Option<Uuid>,
        draft: &ProductDraft,
        images: &ImageChanges,
    ) -> AppResult<(Product, Vec<ProductImage>)> {
        let txn = self.db.begin().await?;

        let product = match id {
            Some(id) => update_product(&txn, id, draft).await?,
            None => insert_product(&txn, draft).await?,
        };

        let mut removed = Vec::new();
        if !images.remove.is_empty() {
            removed = product_images::Entity::find()
                .filter(product_images::Column::ProductId.eq(product.id))
                .filter(product_images::Column::Id.is_in(images.remove.iter().copied()))
                .all(&txn)
                .await?;
            if !removed.is_empty() {
                product_images::Entity::delete_many()
                    .filter(product_images::Column::Id.is_in(removed.iter().map(|row| row.id)))
                    .exec(&txn)
                    .await?;
            }
        }

        if !images.add.is_empty() {
            let rows = images.add.iter().map(|path| product_images::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                image_path: Set(path.clone()),
                thumbnail_path: Set(None),
                is_main: Set(false),
                sort_order: Set(0),
                created_at: NotSet,
                updated_at: NotSet,
            });
            product_images::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        tracing::debug!(
            product_id = %product.id,
            removed = removed.len(),
            added = images.add.len(),
            "saved product with images"
        );
        Ok((product, removed.into_iter().map(image_from_entity).collect()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Products::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_product<C: ConnectionTrait>(db: &C, draft: &ProductDraft) -> AppResult<Product> {
    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(draft.name.clone()),
        slug: Set(draft.slug.clone()),
        description: Set(draft.description.clone()),
        short_description: Set(draft.short_description.clone()),
        price: Set(draft.price),
        old_price: Set(draft.old_price),
        sku: Set(draft.sku.clone()),
        stock: Set(draft.stock),
        category_id: Set(draft.category_id),
        brand_id: Set(draft.brand_id),
        is_active: Set(draft.is_active),
        is_featured: Set(draft.is_featured),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let model = active.insert(db).await?;
    Ok(product_from_entity(model))
}

async fn update_product<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    draft: &ProductDraft,
) -> AppResult<Product> {
    let existing = Products::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: ActiveModel = existing.into();
    active.name = Set(draft.name.clone());
    active.slug = Set(draft.slug.clone());
    active.description = Set(draft.description.clone());
    active.short_description = Set(draft.short_description.clone());
    active.price = Set(draft.price);
    active.old_price = Set(draft.old_price);
    active.sku = Set(draft.sku.clone());
    active.stock = Set(draft.stock);
    active.category_id = Set(draft.category_id);
    active.brand_id = Set(draft.brand_id);
    active.is_active = Set(draft.is_active);
    active.is_featured = Set(draft.is_featured);
    active.updated_at = Set(Utc::now().into());
    let model = active.update(db).await?;
    Ok(product_from_entity(model))
}

fn sort_column(field: ProductSortField) -> Column {
    match field {
        ProductSortField::Id => Column::Id,
        ProductSortField::Name => Column::Name,
        ProductSortField::Slug => Column::Slug,
        ProductSortField::Price => Column::Price,
        ProductSortField::OldPrice => Column::OldPrice,
        ProductSortField::Sku => Column::Sku,
        ProductSortField::Stock => Column::Stock,
        ProductSortField::CategoryId => Column::CategoryId,
        ProductSortField::BrandId => Column::BrandId,
        ProductSortField::IsActive => Column::IsActive,
        ProductSortField::IsFeatured => Column::IsFeatured,
        ProductSortField::CreatedAt => Column::CreatedAt,
        ProductSortField::UpdatedAt => Column::UpdatedAt,
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        short_description: model.short_description,
        price: model.price,
        old_price: model.old_price,
        sku: model.sku,
        stock: model.stock,
        category_id: model.category_id,
        brand_id: model.brand_id,
        is_active: model.is_active,
        is_featured: model.is_featured,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
