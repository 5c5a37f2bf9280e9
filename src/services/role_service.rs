use uuid::Uuid;

use crate::{
    dto::users::{UpdateUserRolesRequest, UserRolesView},
    error::{AppError, AppResult},
    models::{Role, User},
    repository::{RoleRepository, UserRepository},
    response::{ApiResponse, Meta},
    validation::ValidationErrors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultRoleOutcome {
    Assigned,
    /// The user already held at least one role.
    AlreadyHasRole,
    /// No role by that name exists.
    RoleMissing,
}

/// Give a freshly registered user the default role, unless they already hold
/// one. A missing role is logged and otherwise ignored.
pub async fn assign_default_role<R: RoleRepository>(
    roles: &R,
    user: &User,
    role_name: &str,
) -> AppResult<DefaultRoleOutcome> {
    let Some(role) = roles.find_by_name(role_name).await? else {
        tracing::warn!(user_id = %user.id, role = %role_name, "default role not found");
        return Ok(DefaultRoleOutcome::RoleMissing);
    };

    if roles.has_any_role(user.id).await? {
        return Ok(DefaultRoleOutcome::AlreadyHasRole);
    }

    roles.assign(user.id, role.id).await?;
    tracing::info!(user_id = %user.id, role = %role.name, "default role assigned");
    Ok(DefaultRoleOutcome::Assigned)
}

pub async fn list_roles<R: RoleRepository>(roles: &R) -> AppResult<ApiResponse<Vec<Role>>> {
    let all = roles.all().await?;
    Ok(ApiResponse::success("Roles", all, None))
}

/// Every role plus the names the user currently holds.
pub async fn user_roles<U: UserRepository, R: RoleRepository>(
    users: &U,
    roles: &R,
    user_id: Uuid,
) -> AppResult<ApiResponse<UserRolesView>> {
    let user = users.find_by_id(user_id).await?.ok_or(AppError::NotFound)?;
    let available = roles.all().await?;
    let selected = roles.names_for_user(user_id).await?;
    Ok(ApiResponse::success(
        "User roles",
        UserRolesView {
            user,
            available,
            selected,
        },
        None,
    ))
}

/// Replace the user's role set with the submitted names.
pub async fn save_user_roles<U: UserRepository, R: RoleRepository>(
    users: &U,
    roles: &R,
    user_id: Uuid,
    payload: UpdateUserRolesRequest,
) -> AppResult<ApiResponse<Vec<String>>> {
    if users.find_by_id(user_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let known = roles.all_names().await?;
    let mut errors = ValidationErrors::new();
    let mut selected: Vec<String> = Vec::with_capacity(payload.roles.len());
    for (i, name) in payload.roles.iter().enumerate() {
        if !known.contains(name) {
            errors.add(format!("roles.{i}"), "The selected role is invalid.");
        } else if !selected.contains(name) {
            selected.push(name.clone());
        }
    }
    errors.into_result()?;

    roles
        .sync(user_id, &selected)
        .await
        .map_err(|e| AppError::failed("Error updating the user roles", e))?;
    let current = roles.names_for_user(user_id).await?;

    tracing::info!(user_id = %user_id, roles = ?current, "user roles updated");
    Ok(ApiResponse::success(
        "User roles updated successfully.",
        current,
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{NewUser, memory::MemoryStore};

    async fn user(store: &MemoryStore, email: &str) -> User {
        UserRepository::create(
            store,
            &NewUser {
                name: "Ann".into(),
                email: email.into(),
                password_hash: "hash".into(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn default_role_is_assigned_once() {
        let store = MemoryStore::with_roles(&["admin", "client"]);
        let ann = user(&store, "ann@example.com").await;

        let outcome = assign_default_role(&store, &ann, "client").await.unwrap();
        assert_eq!(outcome, DefaultRoleOutcome::Assigned);
        assert_eq!(store.names_for_user(ann.id).await.unwrap(), ["client"]);

        let again = assign_default_role(&store, &ann, "client").await.unwrap();
        assert_eq!(again, DefaultRoleOutcome::AlreadyHasRole);
        assert_eq!(store.names_for_user(ann.id).await.unwrap(), ["client"]);
    }

    #[tokio::test]
    async fn missing_default_role_assigns_nothing() {
        let store = MemoryStore::with_roles(&["admin"]);
        let ann = user(&store, "ann@example.com").await;
        let outcome = assign_default_role(&store, &ann, "client").await.unwrap();
        assert_eq!(outcome, DefaultRoleOutcome::RoleMissing);
        assert!(store.names_for_user(ann.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_role_set() {
        let store = MemoryStore::with_roles(&["admin", "client", "seller"]);
        let ann = user(&store, "ann@example.com").await;
        assign_default_role(&store, &ann, "client").await.unwrap();

        let payload = UpdateUserRolesRequest {
            roles: vec!["seller".into(), "admin".into(), "seller".into()],
        };
        let resp = save_user_roles(&store, &store, ann.id, payload).await.unwrap();
        assert_eq!(resp.message, "User roles updated successfully.");
        assert_eq!(resp.data.unwrap(), ["admin", "seller"]);

        let none = UpdateUserRolesRequest { roles: vec![] };
        let cleared = save_user_roles(&store, &store, ann.id, none).await.unwrap();
        assert!(cleared.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_role_is_rejected_and_nothing_changes() {
        let store = MemoryStore::with_roles(&["admin", "client"]);
        let ann = user(&store, "ann@example.com").await;
        assign_default_role(&store, &ann, "client").await.unwrap();

        let payload = UpdateUserRolesRequest {
            roles: vec!["admin".into(), "root".into()],
        };
        let err = save_user_roles(&store, &store, ann.id, payload).await.unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.messages("roles.1"), ["The selected role is invalid."]);
                assert!(!errors.has("roles.0"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.names_for_user(ann.id).await.unwrap(), ["client"]);
    }

    #[tokio::test]
    async fn editor_for_missing_user_is_not_found() {
        let store = MemoryStore::with_roles(&["admin"]);
        assert!(matches!(
            user_roles(&store, &store, Uuid::new_v4()).await,
            Err(AppError::NotFound)
        ));
        let payload = UpdateUserRolesRequest {
            roles: vec!["admin".into()],
        };
        assert!(matches!(
            save_user_roles(&store, &store, Uuid::new_v4(), payload).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn editor_lists_available_and_selected() {
        let store = MemoryStore::with_roles(&["seller", "admin", "client"]);
        let ann = user(&store, "ann@example.com").await;
        assign_default_role(&store, &ann, "client").await.unwrap();

        let view = user_roles(&store, &store, ann.id).await.unwrap().data.unwrap();
        let names: Vec<_> = view.available.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["admin", "client", "seller"]);
        assert_eq!(view.selected, ["client"]);
    }
}
