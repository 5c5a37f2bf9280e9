use crate::{
    dto::users::UserList,
    error::AppResult,
    listing::{ListQuery, ListingState, PageSize, UserSortField},
    models::UserWithRoles,
    repository::{RoleRepository, UserRepository},
    response::{ApiResponse, Meta},
};

pub async fn list_users<U: UserRepository, R: RoleRepository>(
    users: &U,
    roles: &R,
    query: ListQuery<UserSortField>,
) -> AppResult<ApiResponse<UserList>> {
    let state = query.into_state(PageSize::Choice)?;
    let page = users.list(&state).await?;

    let ids: Vec<_> = page.items.iter().map(|user| user.id).collect();
    let mut names = roles.names_for_users(&ids).await?;
    let items = page
        .items
        .into_iter()
        .map(|user| UserWithRoles {
            roles: names.remove(&user.id).unwrap_or_default(),
            user,
        })
        .collect();

    let meta = Meta::new(state.page, state.per_page, page.total);
    let data = UserList {
        items,
        listing: ListingState::from(&state),
    };
    Ok(ApiResponse::success("Users", data, Some(meta)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        listing::SortDirection,
        repository::{NewUser, memory::MemoryStore},
    };

    #[tokio::test]
    async fn filters_on_name_or_email_and_attaches_roles() {
        let store = MemoryStore::with_roles(&["admin", "client"]);
        for (name, email) in [
            ("Ann Admin", "ann@shop.test"),
            ("Bob", "bob@example.com"),
            ("Carla", "carla@shop.test"),
        ] {
            UserRepository::create(
                &store,
                &NewUser {
                    name: name.into(),
                    email: email.into(),
                    password_hash: "hash".into(),
                },
            )
            .await
            .unwrap();
        }
        let ann = store.find_account_by_email("ann@shop.test").await.unwrap().unwrap();
        let admin = store.find_by_name("admin").await.unwrap().unwrap();
        store.assign(ann.user.id, admin.id).await.unwrap();

        let query = ListQuery {
            new_search: Some("SHOP".into()),
            sort_by: Some(UserSortField::Name),
            ..Default::default()
        };
        let resp = list_users(&store, &store, query).await.unwrap();
        let data = resp.data.unwrap();
        let names: Vec<_> = data.items.iter().map(|u| u.user.name.as_str()).collect();
        assert_eq!(names, ["Ann Admin", "Carla"]);
        assert_eq!(data.items[0].roles, ["admin"]);
        assert!(data.items[1].roles.is_empty());
        assert_eq!(data.listing.sort_field, "name");
        assert_eq!(data.listing.sort_direction, SortDirection::Asc);
        assert_eq!(resp.meta.unwrap().total, Some(2));
    }

    #[tokio::test]
    async fn rejects_page_size_outside_allow_list() {
        let store = MemoryStore::new();
        let query = ListQuery::<UserSortField> {
            per_page: Some(7),
            ..Default::default()
        };
        assert!(list_users(&store, &store, query).await.is_err());
    }
}
