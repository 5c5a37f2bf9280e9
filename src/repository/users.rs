use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, extension::postgres::PgExpr},
};
use uuid::Uuid;

use crate::{
    entity::users::{ActiveModel, Column, Entity as Users, Model as UserModel},
    error::AppResult,
    listing::{ListState, Page, UserSortField},
    models::User,
    repository::{NewUser, UserAccount, UserRepository},
};

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn list(&self, state: &ListState<UserSortField>) -> AppResult<Page<User>> {
        let mut finder = Users::find();
        if let Some(pattern) = state.like_pattern() {
            finder = finder.filter(
                Condition::any()
                    .add(Expr::col(Column::Name).ilike(pattern.clone()))
                    .add(Expr::col(Column::Email).ilike(pattern)),
            );
        }
        let sort_col = match state.sort_field {
            UserSortField::Id => Column::Id,
            UserSortField::Name => Column::Name,
            UserSortField::Email => Column::Email,
            UserSortField::CreatedAt => Column::CreatedAt,
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
            .map(user_from_entity)
            .collect();
        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let found = Users::find_by_id(id).one(&self.db).await?;
        Ok(found.map(user_from_entity))
    }

    async fn find_account_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let found = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(found.map(|model| {
            let password_hash = model.password_hash.clone();
            UserAccount {
                user: user_from_entity(model),
                password_hash,
            }
        }))
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let count = Users::find()
            .filter(Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let active = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        };
        let model = active.insert(&self.db).await?;
        Ok(user_from_entity(model))
    }
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
