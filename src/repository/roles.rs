use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
    sea_query::{JoinType, OnConflict},
};
use uuid::Uuid;

use crate::{
    entity::{
        roles::{self, DEFAULT_GUARD, Entity as Roles},
        user_roles::{self, Entity as UserRoles},
    },
    error::AppResult,
    models::Role,
    repository::RoleRepository,
};

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn all(&self) -> AppResult<Vec<Role>> {
        let roles = Roles::find()
            .filter(roles::Column::GuardName.eq(DEFAULT_GUARD))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(role_from_entity)
            .collect();
        Ok(roles)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let found = Roles::find()
            .filter(roles::Column::Name.eq(name))
            .filter(roles::Column::GuardName.eq(DEFAULT_GUARD))
            .one(&self.db)
            .await?;
        Ok(found.map(role_from_entity))
    }

    async fn names_for_user(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let names = Roles::find()
            .join(JoinType::InnerJoin, roles::Relation::UserRoles.def())
            .filter(user_roles::Column::UserId.eq(user_id))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect();
        Ok(names)
    }

    async fn names_for_users(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let links = UserRoles::find()
            .filter(user_roles::Column::UserId.is_in(user_ids.iter().copied()))
            .find_also_related(Roles)
            .all(&self.db)
            .await?;

        let mut by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (link, role) in links {
            if let Some(role) = role {
                by_user.entry(link.user_id).or_default().push(role.name);
            }
        }
        for names in by_user.values_mut() {
            names.sort();
        }
        Ok(by_user)
    }

    async fn has_any_role(&self, user_id: Uuid) -> AppResult<bool> {
        let count = UserRoles::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        let link = user_roles::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
        };
        UserRoles::insert(link)
            .on_conflict(
                OnConflict::columns([user_roles::Column::UserId, user_roles::Column::RoleId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn sync(&self, user_id: Uuid, names: &[String]) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let role_ids: Vec<Uuid> = if names.is_empty() {
            Vec::new()
        } else {
            Roles::find()
                .filter(roles::Column::Name.is_in(names.iter().cloned()))
                .filter(roles::Column::GuardName.eq(DEFAULT_GUARD))
                .all(&txn)
                .await?
                .into_iter()
                .map(|role| role.id)
                .collect()
        };

        UserRoles::delete_many()
            .filter(user_roles::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        if !role_ids.is_empty() {
            let links = role_ids.into_iter().map(|role_id| user_roles::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(role_id),
            });
            UserRoles::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        tracing::debug!(user_id = %user_id, roles = ?names, "synced user roles");
        Ok(())
    }
}

fn role_from_entity(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        guard_name: model.guard_name,
    }
}
