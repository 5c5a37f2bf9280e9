use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    entity::brands::{ActiveModel, Column, Entity as Brands, Model as BrandModel},
    error::{AppError, AppResult},
    listing::{BrandSortField, ListState, Page},
    models::{Brand, OptionItem},
    repository::{BrandDraft, BrandRepository},
};

#[derive(Clone)]
pub struct DbBrandRepository {
    pub db: DatabaseConnection,
}

impl BrandRepository for DbBrandRepository {
    async fn list(&self, state: &ListState<BrandSortField>) -> AppResult<Page<Brand>> {
        let mut finder = Brands::find();
        if let Some(pattern) = state.like_pattern() {
            finder = finder.filter(
                Condition::any()
                    .add(Expr::col(Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(Column::Description).ilike(pattern)),
            );
        }
        let sort_col = match state.sort_field {
            BrandSortField::Id => Column::Id,
            BrandSortField::Name => Column::Name,
            BrandSortField::Slug => Column::Slug,
            BrandSortField::IsActive => Column::IsActive,
            BrandSortField::CreatedAt => Column::CreatedAt,
            BrandSortField::UpdatedAt => Column::UpdatedAt,
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
            .map(brand_from_entity)
            .collect();
        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Brand>> {
        let found = Brands::find_by_id(id).one(&self.db).await?;
        Ok(found.map(brand_from_entity))
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count = Brands::find()
            .filter(Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut finder = Brands::find().filter(Column::Name.eq(name));
        if let Some(id) = except {
            finder = finder.filter(Column::Id.ne(id));
        }
        Ok(finder.count(&self.db).await? > 0)
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut finder = Brands::find().filter(Column::Slug.eq(slug));
        if let Some(id) = except {
            finder = finder.filter(Column::Id.ne(id));
        }
        Ok(finder.count(&self.db).await? > 0)
    }

    async fn options(&self) -> AppResult<Vec<OptionItem>> {
        let items = Brands::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| OptionItem {
                id: row.id,
                name: row.name,
            })
            .collect();
        Ok(items)
    }

    async fn create(&self, draft: &BrandDraft) -> AppResult<Brand> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name.clone()),
            slug: Set(draft.slug.clone()),
            description: Set(draft.description.clone()),
            logo_path: Set(draft.logo_path.clone()),
            is_active: Set(draft.is_active),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let model = active.insert(&self.db).await?;
        Ok(brand_from_entity(model))
    }

    async fn update(&self, id: Uuid, draft: &BrandDraft) -> AppResult<Brand> {
        let existing = Brands::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: ActiveModel = existing.into();
        active.name = Set(draft.name.clone());
        active.slug = Set(draft.slug.clone());
        active.description = Set(draft.description.clone());
        active.logo_path = Set(draft.logo_path.clone());
        active.is_active = Set(draft.is_active);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;
        Ok(brand_from_entity(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Brands::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

fn brand_from_entity(model: BrandModel) -> Brand {
    Brand {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        logo_path: model.logo_path,
        logo_url: None,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
