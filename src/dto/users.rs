use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    listing::ListingState,
    models::{Role, User, UserWithRoles},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<UserWithRoles>,
    pub listing: ListingState,
}

/// Role editor for one user: every role plus the ones the user holds.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserRolesView {
    pub user: User,
    pub available: Vec<Role>,
    pub selected: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRolesRequest {
    #[serde(default)]
    pub roles: Vec<String>,
}
