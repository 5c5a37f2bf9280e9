use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    listing::{CategorySortField, ListState, Page},
    models::{Category, CategoryWithParent, OptionItem},
    repository::{CategoryDraft, CategoryRepository},
};

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(
        &self,
        state: &ListState<CategorySortField>,
    ) -> AppResult<Page<CategoryWithParent>> {
        let mut finder = Categories::find();
        if let Some(pattern) = state.like_pattern() {
            finder = finder.filter(
                Condition::any()
                    .add(Expr::col(Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(Column::Description).ilike(pattern)),
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

        let parent_ids: Vec<Uuid> = rows.iter().filter_map(|row| row.parent_id).collect();
        let parents: HashMap<Uuid, String> = if parent_ids.is_empty() {
            HashMap::new()
        } else {
            Categories::find()
                .filter(Column::Id.is_in(parent_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|parent| (parent.id, parent.name))
                .collect()
        };

        let items = rows
            .into_iter()
            .map(|row| {
                let parent_name = row.parent_id.and_then(|id| parents.get(&id).cloned());
                CategoryWithParent {
                    category: category_from_entity(row),
                    parent_name,
                }
            })
            .collect();
        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let found = Categories::find_by_id(id).one(&self.db).await?;
        Ok(found.map(category_from_entity))
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let count = Categories::find()
            .filter(Column::Id.eq(id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut finder = Categories::find().filter(Column::Name.eq(name));
        if let Some(id) = except {
            finder = finder.filter(Column::Id.ne(id));
        }
        Ok(finder.count(&self.db).await? > 0)
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> AppResult<bool> {
        let mut finder = Categories::find().filter(Column::Slug.eq(slug));
        if let Some(id) = except {
            finder = finder.filter(Column::Id.ne(id));
        }
        Ok(finder.count(&self.db).await? > 0)
    }

    async fn options(&self, exclude: Option<Uuid>) -> AppResult<Vec<OptionItem>> {
        let mut finder = Categories::find();
        if let Some(id) = exclude {
            finder = finder.filter(Column::Id.ne(id));
        }
        let items = finder
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

    async fn create(&self, draft: &CategoryDraft) -> AppResult<Category> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name.clone()),
            slug: Set(draft.slug.clone()),
            description: Set(draft.description.clone()),
            parent_id: Set(draft.parent_id),
            is_active: Set(draft.is_active),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let model = active.insert(&self.db).await?;
        Ok(category_from_entity(model))
    }

    async fn update(&self, id: Uuid, draft: &CategoryDraft) -> AppResult<Category> {
        let existing = Categories::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: ActiveModel = existing.into();
        active.name = Set(draft.name.clone());
        active.slug = Set(draft.slug.clone());
        active.description = Set(draft.description.clone());
        active.parent_id = Set(draft.parent_id);
        active.is_active = Set(draft.is_active);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await?;
        Ok(category_from_entity(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = Categories::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

fn sort_column(field: CategorySortField) -> Column {
    match field {
        CategorySortField::Id => Column::Id,
        CategorySortField::Name => Column::Name,
        CategorySortField::Slug => Column::Slug,
        CategorySortField::Description => Column::Description,
        CategorySortField::ParentId => Column::ParentId,
        CategorySortField::IsActive => Column::IsActive,
        CategorySortField::CreatedAt => Column::CreatedAt,
        CategorySortField::UpdatedAt => Column::UpdatedAt,
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        parent_id: model.parent_id,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
